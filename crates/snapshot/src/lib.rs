//! Reads the price-history and company-metadata exports into core types.
//!
//! This is the only crate that touches the filesystem on the data side; the
//! engines in `analytics` and `network` only ever see the resulting
//! `PriceTable` and `MetadataMap`.

pub mod error;
pub mod metadata;
pub mod prices;

pub use error::SnapshotError;
pub use metadata::{load_metadata, read_metadata};
pub use prices::{load_prices, read_prices};
