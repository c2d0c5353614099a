use crate::error::ConfigError;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section is optional in the file; missing sections and fields fall back
/// to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub ranking: RankingSettings,
    pub risk_adjusted: RiskAdjustedSettings,
    pub network: NetworkSettings,
    pub logging: LoggingSettings,
    pub output: OutputFormat,
}

/// Where the exported price history and company metadata live.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// CSV with a `date` column followed by one adjusted-close column per ticker.
    pub prices_path: PathBuf,
    /// CSV with `ticker,market_cap,sector,industry,name` rows.
    pub metadata_path: Option<PathBuf>,
}

/// Parameters for momentum leader/laggard rankings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RankingSettings {
    /// Trailing number of return periods.
    pub window: usize,
    /// How many tickers to keep at each end of the ranking.
    pub k: usize,
    /// Windows reported by the multi-period analysis.
    pub periods: Vec<usize>,
}

/// The Sharpe-ratio convention.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RiskAdjustedSettings {
    /// Annual risk-free rate as a decimal (0.04 for 4%).
    pub risk_free_rate: f64,
    /// Return periods per year; 252 for daily trading data.
    pub annualization_factor: f64,
}

/// Parameters for the correlation network.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    /// Trailing number of return periods used for correlations.
    pub correlation_window: usize,
    /// Minimum absolute correlation for an edge, in [0, 1].
    pub threshold: f64,
    /// Neighbours reported per ticker by similarity queries.
    pub similar_count: usize,
    /// Degree at which a ticker counts as highly connected.
    pub min_connections: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

/// How the CLI prints its results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Settings {
    /// Rejects values the engines would refuse at run time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ranking.window == 0 {
            return Err(ConfigError::ValidationError(
                "ranking.window must be greater than 0".to_string(),
            ));
        }
        if self.ranking.k == 0 {
            return Err(ConfigError::ValidationError(
                "ranking.k must be greater than 0".to_string(),
            ));
        }
        if self.ranking.periods.contains(&0) {
            return Err(ConfigError::ValidationError(
                "ranking.periods must only contain positive windows".to_string(),
            ));
        }
        let factor = self.risk_adjusted.annualization_factor;
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ConfigError::ValidationError(
                "risk_adjusted.annualization_factor must be a positive number".to_string(),
            ));
        }
        if !self.risk_adjusted.risk_free_rate.is_finite() {
            return Err(ConfigError::ValidationError(
                "risk_adjusted.risk_free_rate must be finite".to_string(),
            ));
        }
        if self.network.correlation_window == 0 {
            return Err(ConfigError::ValidationError(
                "network.correlation_window must be greater than 0".to_string(),
            ));
        }
        if self.network.similar_count == 0 {
            return Err(ConfigError::ValidationError(
                "network.similar_count must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.network.threshold) {
            return Err(ConfigError::ValidationError(
                "network.threshold must be between 0 and 1".to_string(),
            ));
        }
        Ok(())
    }
}

// --- Default Implementations ---

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            prices_path: PathBuf::from("data/prices.csv"),
            metadata_path: None,
        }
    }
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            window: 30,
            k: 10,
            periods: vec![7, 30, 90, 365],
        }
    }
}

impl Default for RiskAdjustedSettings {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.0,
            annualization_factor: 252.0,
        }
    }
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            correlation_window: 90,
            threshold: 0.7,
            similar_count: 10,
            min_connections: 3,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}
