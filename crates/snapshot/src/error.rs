use core_types::CoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("The first column of the price file must be 'date', found '{0}'")]
    MissingDateColumn(String),

    #[error("Invalid date '{value}' on line {line}; expected YYYY-MM-DD")]
    InvalidDate { line: u64, value: String },

    #[error("Invalid price '{value}' for {ticker} on line {line}")]
    InvalidPrice {
        line: u64,
        ticker: String,
        value: String,
    },

    #[error("Malformed table: {0}")]
    Core(#[from] CoreError),
}
