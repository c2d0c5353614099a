use crate::error::CoreError;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::ops::Deref;

/// A date-indexed grid of optional values with one column per ticker.
///
/// The ticker universe and the row dates are fixed at construction. Cells are
/// addressed by `(row, column)` index, and a missing observation is an explicit
/// `None`; it is never replaced with zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesFrame {
    tickers: Vec<String>,
    dates: Vec<NaiveDate>,
    rows: Vec<Vec<Option<f64>>>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl TimeSeriesFrame {
    /// Validates and assembles a frame.
    ///
    /// Fails when the universe is empty or repeats a ticker, when the number of
    /// rows and dates disagree, when a row is the wrong width, when dates are not
    /// strictly increasing, or when a cell holds NaN or infinity.
    pub fn new(
        tickers: Vec<String>,
        dates: Vec<NaiveDate>,
        rows: Vec<Vec<Option<f64>>>,
    ) -> Result<Self, CoreError> {
        if tickers.is_empty() {
            return Err(CoreError::EmptyUniverse);
        }

        let mut index = HashMap::with_capacity(tickers.len());
        for (i, ticker) in tickers.iter().enumerate() {
            if index.insert(ticker.clone(), i).is_some() {
                return Err(CoreError::DuplicateTicker(ticker.clone()));
            }
        }

        if rows.len() != dates.len() {
            return Err(CoreError::ShapeMismatch(format!(
                "{} dates but {} rows",
                dates.len(),
                rows.len()
            )));
        }

        for pair in dates.windows(2) {
            if pair[1] <= pair[0] {
                return Err(CoreError::DatesNotIncreasing {
                    previous: pair[0].to_string(),
                    current: pair[1].to_string(),
                });
            }
        }

        for (r, row) in rows.iter().enumerate() {
            if row.len() != tickers.len() {
                return Err(CoreError::ShapeMismatch(format!(
                    "row {} has {} values for {} tickers",
                    r,
                    row.len(),
                    tickers.len()
                )));
            }
            if let Some(c) = row.iter().position(|v| v.is_some_and(|x| !x.is_finite())) {
                return Err(CoreError::NonFiniteValue {
                    row: r,
                    ticker: tickers[c].clone(),
                });
            }
        }

        Ok(Self {
            tickers,
            dates,
            rows,
            index,
        })
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Number of dated rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn num_tickers(&self) -> usize {
        self.tickers.len()
    }

    pub fn ticker_index(&self, ticker: &str) -> Option<usize> {
        self.index.get(ticker).copied()
    }

    pub fn row(&self, row: usize) -> Option<&[Option<f64>]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    pub fn value(&self, row: usize, column: usize) -> Option<f64> {
        self.rows.get(row).and_then(|r| r.get(column)).copied().flatten()
    }

    /// The values of one column over the trailing `n` rows, oldest first.
    ///
    /// `n` larger than the frame yields the whole column; a column outside the
    /// frame yields nothing.
    pub fn column_tail(&self, column: usize, n: usize) -> impl Iterator<Item = Option<f64>> + '_ {
        let start = self.rows.len().saturating_sub(n);
        self.rows[start..].iter().filter_map(move |r| r.get(column).copied())
    }
}

/// Adjusted closing prices, one row per trading date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceTable(TimeSeriesFrame);

impl PriceTable {
    pub fn new(
        tickers: Vec<String>,
        dates: Vec<NaiveDate>,
        rows: Vec<Vec<Option<f64>>>,
    ) -> Result<Self, CoreError> {
        TimeSeriesFrame::new(tickers, dates, rows).map(Self)
    }

    /// The price on the most recent date, if the ticker is known and was quoted.
    pub fn latest_price(&self, ticker: &str) -> Option<f64> {
        let column = self.ticker_index(ticker)?;
        self.len().checked_sub(1).and_then(|last| self.value(last, column))
    }

    /// The last `n` dated prices of a ticker, oldest first.
    ///
    /// Returns `None` for a ticker outside the universe.
    pub fn price_history(&self, ticker: &str, n: usize) -> Option<Vec<(NaiveDate, Option<f64>)>> {
        let column = self.ticker_index(ticker)?;
        let start = self.len().saturating_sub(n);
        Some(
            self.dates()[start..]
                .iter()
                .copied()
                .zip(self.column_tail(column, n))
                .collect(),
        )
    }
}

impl Deref for PriceTable {
    type Target = TimeSeriesFrame;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Period-over-period simple returns.
///
/// Row `t` holds `price[t] / price[t-1] - 1` and carries the date of `price[t]`,
/// so a return table is one row shorter than the price table it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnTable(TimeSeriesFrame);

impl ReturnTable {
    pub fn new(
        tickers: Vec<String>,
        dates: Vec<NaiveDate>,
        rows: Vec<Vec<Option<f64>>>,
    ) -> Result<Self, CoreError> {
        TimeSeriesFrame::new(tickers, dates, rows).map(Self)
    }
}

impl Deref for ReturnTable {
    type Target = TimeSeriesFrame;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn tickers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rejects_non_increasing_dates() {
        let err = PriceTable::new(
            tickers(&["AAA"]),
            vec![day(2), day(2)],
            vec![vec![Some(1.0)], vec![Some(2.0)]],
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::DatesNotIncreasing { .. }));
    }

    #[test]
    fn rejects_ragged_rows_and_duplicates() {
        let ragged = PriceTable::new(tickers(&["AAA", "BBB"]), vec![day(1)], vec![vec![Some(1.0)]]);
        assert!(matches!(ragged, Err(CoreError::ShapeMismatch(_))));

        let dup = PriceTable::new(tickers(&["AAA", "AAA"]), vec![], vec![]);
        assert_eq!(dup.unwrap_err(), CoreError::DuplicateTicker("AAA".into()));
    }

    #[test]
    fn rejects_nan_cells() {
        let err = PriceTable::new(tickers(&["AAA"]), vec![day(1)], vec![vec![Some(f64::NAN)]]).unwrap_err();
        assert_eq!(
            err,
            CoreError::NonFiniteValue {
                row: 0,
                ticker: "AAA".into()
            }
        );
    }

    #[test]
    fn lookups_by_ticker() {
        let table = PriceTable::new(
            tickers(&["AAA", "BBB"]),
            vec![day(1), day(2), day(3)],
            vec![
                vec![Some(100.0), Some(50.0)],
                vec![Some(110.0), None],
                vec![Some(121.0), Some(60.5)],
            ],
        )
        .unwrap();

        assert_eq!(table.ticker_index("BBB"), Some(1));
        assert_eq!(table.latest_price("AAA"), Some(121.0));
        assert_eq!(table.latest_price("ZZZ"), None);
        assert_eq!(table.value(1, 1), None);

        let history = table.price_history("BBB", 2).unwrap();
        assert_eq!(history, vec![(day(2), None), (day(3), Some(60.5))]);
        assert_eq!(table.price_history("AAA", 10).unwrap().len(), 3);
        assert_eq!(
            table.column_tail(0, 2).collect::<Vec<_>>(),
            vec![Some(110.0), Some(121.0)]
        );

        assert_eq!(table.row(2), Some(&[Some(121.0), Some(60.5)][..]));
        assert_eq!(table.row(3), None);
        assert_eq!(table.value(0, 2), None);
        assert_eq!(table.column_tail(2, 3).count(), 0);
    }
}
