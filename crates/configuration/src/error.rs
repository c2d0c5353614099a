use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load stockgraph settings: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Invalid setting: {0}")]
    ValidationError(String),
}
