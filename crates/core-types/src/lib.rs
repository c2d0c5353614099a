pub mod enums;
pub mod error;
pub mod metadata;
pub mod structs;
pub mod table;

// Re-export the core types to provide a clean public API.
pub use enums::RankOrder;
pub use error::CoreError;
pub use metadata::{MetadataMap, compare_caps};
pub use structs::{CompanyInfo, RankedEntry, RankedList};
pub use table::{PriceTable, ReturnTable, TimeSeriesFrame};
