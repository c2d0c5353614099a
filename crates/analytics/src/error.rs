use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Not enough data to perform calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid window {window}: must be between 1 and {available}")]
    InvalidWindow { window: usize, available: usize },

    #[error("Metric '{metric}' is undefined for '{ticker}': {reason}")]
    UndefinedMetric {
        metric: &'static str,
        ticker: String,
        reason: String,
    },

    #[error("Ticker '{0}' not found")]
    UnknownTicker(String),

    #[error("Selection size must be at least 1, got {0}")]
    InvalidSelectionSize(usize),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Malformed correlation matrix: {0}")]
    MalformedMatrix(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}
