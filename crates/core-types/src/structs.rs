use crate::enums::RankOrder;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single `(ticker, metric)` pair inside a ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub ticker: String,
    pub value: f64,
}

impl RankedEntry {
    pub fn new(ticker: impl Into<String>, value: f64) -> Self {
        Self {
            ticker: ticker.into(),
            value,
        }
    }
}

/// An ordered selection of tickers by some metric.
///
/// Entries are sorted according to `order`, with equal values in ticker order.
/// A list requested with capacity `k` holds at most `k` entries; it may hold fewer
/// when fewer tickers qualify.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedList {
    pub order: RankOrder,
    pub entries: Vec<RankedEntry>,
}

impl RankedList {
    /// Builds a list from arbitrary entries, sorting them into rank order.
    pub fn from_unsorted(order: RankOrder, mut entries: Vec<RankedEntry>) -> Self {
        entries.sort_by(|a, b| order.compare(a, b));
        Self { order, entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RankedEntry> {
        self.entries.iter()
    }

    pub fn first(&self) -> Option<&RankedEntry> {
        self.entries.first()
    }

    /// The tickers in rank order.
    pub fn tickers(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.ticker.as_str()).collect()
    }

    /// Checks that every adjacent pair respects the list's ordering.
    pub fn is_ordered(&self) -> bool {
        self.entries
            .windows(2)
            .all(|w| self.order.compare(&w[0], &w[1]).is_le())
    }
}

impl<'a> IntoIterator for &'a RankedList {
    type Item = &'a RankedEntry;
    type IntoIter = std::slice::Iter<'a, RankedEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Descriptive attributes of a listed company.
///
/// Every field is optional: the metadata source may know a ticker but not its
/// capitalisation, or may not know the ticker at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub market_cap: Option<Decimal>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub name: Option<String>,
}

impl CompanyInfo {
    pub fn new(market_cap: Option<Decimal>, sector: Option<&str>) -> Self {
        Self {
            market_cap,
            sector: sector.map(str::to_string),
            industry: None,
            name: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_unsorted_orders_and_breaks_ties() {
        let list = RankedList::from_unsorted(
            RankOrder::Descending,
            vec![
                RankedEntry::new("MSFT", 0.10),
                RankedEntry::new("AAPL", 0.25),
                RankedEntry::new("AMZN", 0.10),
            ],
        );
        assert_eq!(list.tickers(), vec!["AAPL", "AMZN", "MSFT"]);
        assert!(list.is_ordered());
    }

    #[test]
    fn unsorted_list_is_detected() {
        let list = RankedList {
            order: RankOrder::Ascending,
            entries: vec![RankedEntry::new("A", 2.0), RankedEntry::new("B", 1.0)],
        };
        assert!(!list.is_ordered());
    }

    #[test]
    fn ranked_list_serializes_for_visualizers() {
        let list = RankedList::from_unsorted(RankOrder::Ascending, vec![RankedEntry::new("XOM", -0.04)]);
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json["order"], "Ascending");
        assert_eq!(json["entries"][0]["ticker"], "XOM");
    }
}
