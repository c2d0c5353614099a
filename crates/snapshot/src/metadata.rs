use crate::error::SnapshotError;
use core_types::{CompanyInfo, MetadataMap};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One line of the company export: `ticker,market_cap,sector,industry,name`.
#[derive(Debug, Deserialize)]
struct CompanyRecord {
    ticker: String,
    market_cap: Option<Decimal>,
    sector: Option<String>,
    industry: Option<String>,
    name: Option<String>,
}

impl CompanyRecord {
    fn into_entry(self) -> (String, CompanyInfo) {
        (
            self.ticker,
            CompanyInfo {
                market_cap: self.market_cap,
                sector: self.sector,
                industry: self.industry,
                name: self.name,
            },
        )
    }
}

pub fn load_metadata(path: impl AsRef<Path>) -> Result<MetadataMap, SnapshotError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let metadata = read_metadata(file)?;
    tracing::info!(path = %path.display(), companies = metadata.len(), "Loaded company metadata.");
    Ok(metadata)
}

/// Reads company metadata. Empty fields are unknown; a repeated ticker keeps its last line.
pub fn read_metadata<R: Read>(reader: R) -> Result<MetadataMap, SnapshotError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut metadata = MetadataMap::new();
    for record in reader.deserialize::<CompanyRecord>() {
        let (ticker, info) = record?.into_entry();
        if metadata.insert(ticker.clone(), info).is_some() {
            tracing::warn!(ticker = %ticker, "Duplicate metadata row; keeping the later one.");
        }
    }
    Ok(metadata)
}
