use crate::correlation::validate_window;
use crate::error::AnalyticsError;
use crate::selection;
use crate::stats;
use core_types::{RankOrder, RankedEntry, RankedList, ReturnTable};
use std::collections::BTreeMap;

/// Per-window outcome of a multi-period analysis.
pub type PeriodReturns = BTreeMap<usize, Result<f64, AnalyticsError>>;

/// Ranks tickers by cumulative return over a trailing window.
///
/// The engine borrows an immutable `ReturnTable`; every call is a pure function
/// of that table and its arguments.
#[derive(Debug, Clone, Copy)]
pub struct RankingEngine<'a> {
    returns: &'a ReturnTable,
}

impl<'a> RankingEngine<'a> {
    pub fn new(returns: &'a ReturnTable) -> Self {
        Self { returns }
    }

    /// The `k` tickers with the highest cumulative return over the last `window` periods.
    ///
    /// Only tickers with at least one return in the window qualify; when fewer
    /// than `k` qualify, all of them are returned.
    pub fn top_k(&self, window: usize, k: usize) -> Result<RankedList, AnalyticsError> {
        let top = self.select(window, k, RankOrder::Descending)?;
        log_ranking("Top", window, &top);
        Ok(top)
    }

    /// The `k` tickers with the lowest cumulative return over the last `window` periods.
    pub fn bottom_k(&self, window: usize, k: usize) -> Result<RankedList, AnalyticsError> {
        let bottom = self.select(window, k, RankOrder::Ascending)?;
        log_ranking("Bottom", window, &bottom);
        Ok(bottom)
    }

    /// Cumulative return of every qualifying ticker, in universe order.
    pub fn cumulative_returns(&self, window: usize) -> Result<Vec<RankedEntry>, AnalyticsError> {
        validate_window(window, self.returns.len())?;
        Ok(self
            .returns
            .tickers()
            .iter()
            .enumerate()
            .filter_map(|(c, ticker)| {
                stats::compound_return(self.returns.column_tail(c, window))
                    .map(|value| RankedEntry::new(ticker.clone(), value))
            })
            .collect())
    }

    /// Cumulative return of one ticker over the last `window` periods.
    ///
    /// # Errors
    ///
    /// `UnknownTicker`, `InvalidWindow`, or `UndefinedMetric` when the ticker has
    /// no return at all inside the window.
    pub fn stock_performance(&self, ticker: &str, window: usize) -> Result<f64, AnalyticsError> {
        let column = self
            .returns
            .ticker_index(ticker)
            .ok_or_else(|| AnalyticsError::UnknownTicker(ticker.to_string()))?;
        validate_window(window, self.returns.len())?;

        let total = stats::compound_return(self.returns.column_tail(column, window)).ok_or_else(|| {
            AnalyticsError::UndefinedMetric {
                metric: "cumulative_return",
                ticker: ticker.to_string(),
                reason: format!("no returns in the last {window} periods"),
            }
        })?;

        tracing::debug!(ticker, window, total, "Stock performance.");
        Ok(total)
    }

    /// Cumulative return of one ticker for each requested window.
    ///
    /// A window that cannot be computed is reported in its own entry and does
    /// not affect the others. Only an unknown ticker fails the whole call.
    pub fn analyze_multiple_periods(
        &self,
        ticker: &str,
        windows: &[usize],
    ) -> Result<PeriodReturns, AnalyticsError> {
        if self.returns.ticker_index(ticker).is_none() {
            return Err(AnalyticsError::UnknownTicker(ticker.to_string()));
        }

        let mut results = BTreeMap::new();
        for &window in windows {
            let outcome = self.stock_performance(ticker, window);
            if let Err(e) = &outcome {
                tracing::warn!(ticker, window, "Period not computable: {}", e);
            }
            results.insert(window, outcome);
        }
        Ok(results)
    }

    fn select(&self, window: usize, k: usize, order: RankOrder) -> Result<RankedList, AnalyticsError> {
        if k == 0 {
            return Err(AnalyticsError::InvalidSelectionSize(k));
        }
        let candidates = self.cumulative_returns(window)?;
        selection::select(candidates, k, order)
    }
}

fn log_ranking(label: &str, window: usize, list: &RankedList) {
    tracing::info!("{} {} stocks over last {} periods:", label, list.len(), window);
    for (i, entry) in list.iter().enumerate() {
        tracing::info!("  {}. {}: {:.2}%", i + 1, entry.ticker, entry.value * 100.0);
    }
}
