use crate::error::SnapshotError;
use chrono::NaiveDate;
use core_types::PriceTable;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Loads a wide price export: a `date` column followed by one column per ticker.
///
/// An empty cell is a missing price. Rows must already be in increasing date
/// order; the table constructor rejects anything else.
pub fn load_prices(path: impl AsRef<Path>) -> Result<PriceTable, SnapshotError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = read_prices(file)?;
    tracing::info!(
        path = %path.display(),
        tickers = table.num_tickers(),
        rows = table.len(),
        "Loaded price history."
    );
    Ok(table)
}

pub fn read_prices<R: Read>(reader: R) -> Result<PriceTable, SnapshotError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let first = headers.get(0).unwrap_or_default();
    if !first.eq_ignore_ascii_case("date") {
        return Err(SnapshotError::MissingDateColumn(first.to_string()));
    }
    let tickers: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut dates = Vec::new();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());

        let raw_date = record.get(0).unwrap_or_default();
        let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT).map_err(|_| {
            SnapshotError::InvalidDate {
                line,
                value: raw_date.to_string(),
            }
        })?;

        let row = record
            .iter()
            .skip(1)
            .zip(&tickers)
            .map(|(cell, ticker)| parse_price(cell, ticker, line))
            .collect::<Result<Vec<_>, _>>()?;

        dates.push(date);
        rows.push(row);
    }

    Ok(PriceTable::new(tickers, dates, rows)?)
}

fn parse_price(cell: &str, ticker: &str, line: u64) -> Result<Option<f64>, SnapshotError> {
    if cell.is_empty() {
        return Ok(None);
    }
    cell.parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())
        .map(Some)
        .ok_or_else(|| SnapshotError::InvalidPrice {
            line,
            ticker: ticker.to_string(),
            value: cell.to_string(),
        })
}
