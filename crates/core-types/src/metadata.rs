use crate::structs::CompanyInfo;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// Read-only company attributes keyed by ticker.
///
/// Built once by the metadata source and then only borrowed by the engines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataMap {
    companies: HashMap<String, CompanyInfo>,
}

impl MetadataMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ticker: impl Into<String>, info: CompanyInfo) -> Option<CompanyInfo> {
        self.companies.insert(ticker.into(), info)
    }

    pub fn get(&self, ticker: &str) -> Option<&CompanyInfo> {
        self.companies.get(ticker)
    }

    pub fn market_cap(&self, ticker: &str) -> Option<Decimal> {
        self.get(ticker).and_then(|c| c.market_cap)
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CompanyInfo)> {
        self.companies.iter()
    }

    /// Groups tickers by sector. Tickers without a sector are left out.
    pub fn sector_tickers(&self) -> BTreeMap<String, Vec<String>> {
        let mut sectors: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (ticker, info) in &self.companies {
            if let Some(sector) = &info.sector {
                sectors.entry(sector.clone()).or_default().push(ticker.clone());
            }
        }
        for tickers in sectors.values_mut() {
            tickers.sort();
        }
        sectors
    }

    /// All known tickers, largest market capitalisation first.
    ///
    /// Tickers without a capitalisation come last; ties are in ticker order.
    pub fn ordered_by_market_cap(&self) -> Vec<String> {
        let mut tickers: Vec<&String> = self.companies.keys().collect();
        tickers.sort_by(|a, b| {
            compare_caps(self.market_cap(a), self.market_cap(b))
                .reverse()
                .then_with(|| a.cmp(b))
        });
        tickers.into_iter().cloned().collect()
    }
}

/// Orders capitalisations with a known value above an unknown one.
pub fn compare_caps(a: Option<Decimal>, b: Option<Decimal>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

impl FromIterator<(String, CompanyInfo)> for MetadataMap {
    fn from_iter<I: IntoIterator<Item = (String, CompanyInfo)>>(iter: I) -> Self {
        Self {
            companies: iter.into_iter().collect(),
        }
    }
}
