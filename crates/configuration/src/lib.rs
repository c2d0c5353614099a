use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    DataSettings, LoggingSettings, NetworkSettings, OutputFormat, RankingSettings,
    RiskAdjustedSettings, Settings,
};

/// The file read by `load_config` when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "stockgraph.toml";

/// Prefix of the environment variables that override file settings,
/// e.g. `STOCKGRAPH__NETWORK__THRESHOLD=0.8`.
pub const ENV_PREFIX: &str = "STOCKGRAPH";

/// Loads the application configuration from `stockgraph.toml`.
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from(Path::new(DEFAULT_CONFIG_FILE))
}

/// Loads the application configuration from the given TOML file.
///
/// The file is optional: any value it does not set comes from the environment
/// or from the defaults. The result is validated before it is returned.
pub fn load_config_from(path: &Path) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("ranking.periods")
                .try_parsing(true),
        );

    finish(builder)
}

/// Parses settings from an in-memory TOML document.
pub fn from_toml_str(toml: &str) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml));

    finish(builder)
}

fn finish(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<Settings, ConfigError> {
    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.build()?.try_deserialize::<Settings>()?;
    settings.validate()?;

    tracing::debug!(?settings, "Configuration loaded.");
    Ok(settings)
}
