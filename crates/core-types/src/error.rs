use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Table has no tickers")]
    EmptyUniverse,

    #[error("Ticker '{0}' appears more than once in the table header")]
    DuplicateTicker(String),

    #[error("Dates must be strictly increasing: {previous} is followed by {current}")]
    DatesNotIncreasing { previous: String, current: String },

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Non-finite value in row {row} for ticker '{ticker}'")]
    NonFiniteValue { row: usize, ticker: String },
}
