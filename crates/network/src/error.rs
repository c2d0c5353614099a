use analytics::AnalyticsError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    #[error("Correlation threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("Ticker '{0}' is not a node of the graph")]
    UnknownTicker(String),

    #[error("Selection size must be at least 1, got {0}")]
    InvalidSelectionSize(usize),

    #[error(transparent)]
    Analytics(#[from] AnalyticsError),
}
