use crate::error::AnalyticsError;
use crate::selection;
use crate::stats;
use core_types::{RankOrder, RankedEntry, RankedList, ReturnTable};
use serde::Serialize;
use std::collections::HashMap;

/// A symmetric ticker-by-ticker matrix of Pearson coefficients.
///
/// A cell is `None` when the coefficient could not be computed (too little
/// overlapping data or no variance), which is distinct from a computed `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    tickers: Vec<String>,
    window: usize,
    values: Vec<Vec<Option<f64>>>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl CorrelationMatrix {
    /// Builds a matrix from precomputed rows, e.g. one supplied by another system.
    ///
    /// The rows must be square, exactly symmetric and within [-1, 1].
    pub fn from_rows(
        tickers: Vec<String>,
        window: usize,
        values: Vec<Vec<Option<f64>>>,
    ) -> Result<Self, AnalyticsError> {
        let n = tickers.len();
        if values.len() != n || values.iter().any(|row| row.len() != n) {
            return Err(AnalyticsError::MalformedMatrix(format!(
                "expected a {n}x{n} matrix"
            )));
        }
        for i in 0..n {
            for j in i..n {
                if values[i][j] != values[j][i] {
                    return Err(AnalyticsError::MalformedMatrix(format!(
                        "cell ({}, {}) differs from its mirror",
                        tickers[i], tickers[j]
                    )));
                }
                if let Some(c) = values[i][j] {
                    if !(-1.0..=1.0).contains(&c) {
                        return Err(AnalyticsError::MalformedMatrix(format!(
                            "correlation {c} for ({}, {}) is outside [-1, 1]",
                            tickers[i], tickers[j]
                        )));
                    }
                }
            }
        }
        Ok(Self::assemble(tickers, window, values))
    }

    fn assemble(tickers: Vec<String>, window: usize, values: Vec<Vec<Option<f64>>>) -> Self {
        let index = tickers
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
        Self {
            tickers,
            window,
            values,
            index,
        }
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    /// Number of trailing return rows the coefficients were estimated over.
    pub fn window(&self) -> usize {
        self.window
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    pub fn ticker_index(&self, ticker: &str) -> Option<usize> {
        self.index.get(ticker).copied()
    }

    /// The coefficient at `(i, j)` by position; `None` when undefined or out of range.
    pub fn value(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get(i).and_then(|row| row.get(j)).copied().flatten()
    }

    /// The coefficient between two tickers; `Ok(None)` when undefined.
    pub fn correlation(&self, a: &str, b: &str) -> Result<Option<f64>, AnalyticsError> {
        let i = self.require(a)?;
        let j = self.require(b)?;
        Ok(self.values[i][j])
    }

    /// The `k` tickers most positively correlated with `ticker`.
    pub fn most_similar(&self, ticker: &str, k: usize) -> Result<RankedList, AnalyticsError> {
        let peers = self.peers(ticker)?;
        selection::select(peers, k, RankOrder::Descending)
    }

    /// The `k` tickers least (most negatively) correlated with `ticker`.
    pub fn least_similar(&self, ticker: &str, k: usize) -> Result<RankedList, AnalyticsError> {
        let peers = self.peers(ticker)?;
        selection::select(peers, k, RankOrder::Ascending)
    }

    /// Every ticker whose correlation with `ticker` is at least `threshold`, highest first.
    pub fn similar_above(&self, ticker: &str, threshold: f64) -> Result<RankedList, AnalyticsError> {
        let peers = self.peers(ticker)?.filter(|e| e.value >= threshold).collect();
        let list = RankedList::from_unsorted(RankOrder::Descending, peers);
        tracing::info!(ticker, threshold, found = list.len(), "Similar stocks above threshold.");
        Ok(list)
    }

    /// Every ticker whose correlation with `ticker` is at most `threshold`, lowest first.
    pub fn dissimilar_below(&self, ticker: &str, threshold: f64) -> Result<RankedList, AnalyticsError> {
        let peers = self.peers(ticker)?.filter(|e| e.value <= threshold).collect();
        let list = RankedList::from_unsorted(RankOrder::Ascending, peers);
        tracing::info!(ticker, threshold, found = list.len(), "Dissimilar stocks below threshold.");
        Ok(list)
    }

    /// Defined correlations between `ticker` and every other ticker.
    fn peers(&self, ticker: &str) -> Result<impl Iterator<Item = RankedEntry> + '_, AnalyticsError> {
        let i = self.require(ticker)?;
        Ok(self
            .tickers
            .iter()
            .enumerate()
            .filter(move |(j, _)| *j != i)
            .filter_map(move |(j, other)| self.values[i][j].map(|c| RankedEntry::new(other.clone(), c))))
    }

    fn require(&self, ticker: &str) -> Result<usize, AnalyticsError> {
        self.ticker_index(ticker)
            .ok_or_else(|| AnalyticsError::UnknownTicker(ticker.to_string()))
    }
}

/// Estimates correlation matrices over a trailing window of returns.
#[derive(Debug, Default)]
pub struct RollingCorrelationEngine {}

impl RollingCorrelationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the pairwise correlation matrix over the last `window` rows.
    ///
    /// Each pair uses only the rows where both tickers have a return, so a gap
    /// in one ticker never removes rows from unrelated pairs. Pairs with fewer
    /// than two overlapping rows are undefined. Only the upper triangle is
    /// computed; the lower triangle is a copy of it, so the result is exactly
    /// symmetric. The diagonal is 1.0 for every ticker with at least one return
    /// in the window.
    ///
    /// # Errors
    ///
    /// `InvalidWindow` unless `1 <= window <= returns.len()`.
    pub fn correlation_matrix(
        &self,
        returns: &ReturnTable,
        window: usize,
    ) -> Result<CorrelationMatrix, AnalyticsError> {
        validate_window(window, returns.len())?;

        let n = returns.num_tickers();
        let columns: Vec<Vec<Option<f64>>> = (0..n)
            .map(|c| returns.column_tail(c, window).collect())
            .collect();

        let mut values = vec![vec![None; n]; n];
        let mut undefined_pairs = 0usize;

        for i in 0..n {
            if columns[i].iter().any(Option::is_some) {
                values[i][i] = Some(1.0);
            }
            for j in (i + 1)..n {
                let (xs, ys): (Vec<f64>, Vec<f64>) = columns[i]
                    .iter()
                    .zip(&columns[j])
                    .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
                    .unzip();

                let corr = stats::pearson(&xs, &ys);
                if corr.is_none() {
                    undefined_pairs += 1;
                    tracing::debug!(
                        a = %returns.tickers()[i],
                        b = %returns.tickers()[j],
                        overlap = xs.len(),
                        "Correlation undefined for pair."
                    );
                }
                values[i][j] = corr;
                values[j][i] = corr;
            }
        }

        tracing::info!(
            tickers = n,
            window,
            undefined_pairs,
            "Calculated correlation matrix using return rows {} to {}.",
            returns.len() - window,
            returns.len() - 1
        );

        Ok(CorrelationMatrix::assemble(returns.tickers().to_vec(), window, values))
    }
}

/// Checks that `window` selects between one and `available` rows.
pub(crate) fn validate_window(window: usize, available: usize) -> Result<(), AnalyticsError> {
    if window == 0 || window > available {
        return Err(AnalyticsError::InvalidWindow { window, available });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn returns(tickers: &[&str], rows: Vec<Vec<Option<f64>>>) -> ReturnTable {
        let dates = (0..rows.len())
            .map(|d| NaiveDate::from_ymd_opt(2024, 5, 1).unwrap() + chrono::Days::new(d as u64))
            .collect();
        ReturnTable::new(tickers.iter().map(|t| t.to_string()).collect(), dates, rows).unwrap()
    }

    fn sample() -> ReturnTable {
        returns(
            &["AAA", "BBB", "CCC", "DDD"],
            vec![
                vec![Some(0.01), Some(0.02), Some(-0.01), None],
                vec![Some(0.03), Some(0.05), Some(-0.02), None],
                vec![Some(-0.02), Some(-0.03), Some(0.02), Some(0.01)],
                vec![Some(0.00), None, Some(0.01), None],
                vec![Some(0.02), Some(0.01), Some(-0.03), None],
            ],
        )
    }

    #[test]
    fn matrix_is_exactly_symmetric_with_unit_diagonal() {
        let m = RollingCorrelationEngine::new().correlation_matrix(&sample(), 5).unwrap();
        for i in 0..m.len() {
            assert_eq!(m.value(i, i), Some(1.0));
            for j in 0..m.len() {
                assert_eq!(m.value(i, j), m.value(j, i));
                if let Some(c) = m.value(i, j) {
                    assert!((-1.0..=1.0).contains(&c));
                }
            }
        }
    }

    #[test]
    fn uses_pairwise_complete_rows() {
        let m = RollingCorrelationEngine::new().correlation_matrix(&sample(), 5).unwrap();
        // BBB is missing on day 4 only; AAA-CCC still uses all five rows.
        let aaa = [0.01, 0.03, -0.02, 0.00, 0.02];
        let ccc = [-0.01, -0.02, 0.02, 0.01, -0.03];
        assert_relative_eq!(
            m.correlation("AAA", "CCC").unwrap().unwrap(),
            stats::pearson(&aaa, &ccc).unwrap(),
            epsilon = 1e-12
        );
        let aaa_bbb = stats::pearson(&[0.01, 0.03, -0.02, 0.02], &[0.02, 0.05, -0.03, 0.01]).unwrap();
        assert_relative_eq!(m.correlation("AAA", "BBB").unwrap().unwrap(), aaa_bbb, epsilon = 1e-12);
    }

    #[test]
    fn positions_outside_the_matrix_read_as_undefined() {
        let m = RollingCorrelationEngine::new().correlation_matrix(&sample(), 5).unwrap();
        assert_eq!(m.value(0, m.len()), None);
        assert_eq!(m.value(m.len(), 0), None);
        assert_eq!(m.value(usize::MAX, usize::MAX), None);
    }

    #[test]
    fn single_overlap_is_undefined_not_zero() {
        let m = RollingCorrelationEngine::new().correlation_matrix(&sample(), 5).unwrap();
        assert_eq!(m.correlation("AAA", "DDD").unwrap(), None);
        assert_eq!(m.correlation("DDD", "DDD").unwrap(), Some(1.0));
    }

    #[test]
    fn only_trailing_window_is_used() {
        let m = RollingCorrelationEngine::new().correlation_matrix(&sample(), 2).unwrap();
        assert_eq!(m.window(), 2);
        // Rows 4 and 5: BBB has a single return left, DDD none at all.
        assert_eq!(m.correlation("AAA", "BBB").unwrap(), None);
        assert_eq!(m.correlation("DDD", "DDD").unwrap(), None);
        assert_relative_eq!(m.correlation("AAA", "CCC").unwrap().unwrap(), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn identical_returns_correlate_exactly() {
        let table = returns(&["AAA", "BBB"], vec![vec![Some(0.1), Some(0.1)], vec![Some(0.1), Some(0.1)]]);
        let m = RollingCorrelationEngine::new().correlation_matrix(&table, 2).unwrap();
        assert_eq!(m.correlation("AAA", "BBB").unwrap(), Some(1.0));
    }

    #[test]
    fn rejects_invalid_windows() {
        let engine = RollingCorrelationEngine::new();
        assert_eq!(
            engine.correlation_matrix(&sample(), 0).unwrap_err(),
            AnalyticsError::InvalidWindow { window: 0, available: 5 }
        );
        assert!(engine.correlation_matrix(&sample(), 6).is_err());
    }

    #[test]
    fn similarity_queries_skip_self_and_undefined() {
        let m = RollingCorrelationEngine::new().correlation_matrix(&sample(), 5).unwrap();

        let most = m.most_similar("AAA", 5).unwrap();
        assert_eq!(most.tickers(), vec!["BBB", "CCC"]);

        let least = m.least_similar("AAA", 1).unwrap();
        assert_eq!(least.tickers(), vec!["CCC"]);

        let above = m.similar_above("AAA", 0.5).unwrap();
        assert_eq!(above.tickers(), vec!["BBB"]);

        let below = m.dissimilar_below("AAA", -0.3).unwrap();
        assert_eq!(below.tickers(), vec!["CCC"]);

        assert_eq!(
            m.most_similar("ZZZ", 1).unwrap_err(),
            AnalyticsError::UnknownTicker("ZZZ".into())
        );
    }

    #[test]
    fn from_rows_validates_shape_and_symmetry() {
        let tickers = vec!["AAA".to_string(), "BBB".to_string()];
        let ok = CorrelationMatrix::from_rows(
            tickers.clone(),
            10,
            vec![vec![Some(1.0), Some(0.9)], vec![Some(0.9), Some(1.0)]],
        )
        .unwrap();
        assert_eq!(ok.correlation("BBB", "AAA").unwrap(), Some(0.9));

        let asymmetric = CorrelationMatrix::from_rows(
            tickers.clone(),
            10,
            vec![vec![Some(1.0), Some(0.9)], vec![Some(0.8), Some(1.0)]],
        );
        assert!(matches!(asymmetric, Err(AnalyticsError::MalformedMatrix(_))));

        let out_of_range = CorrelationMatrix::from_rows(
            tickers,
            10,
            vec![vec![Some(1.0), Some(1.2)], vec![Some(1.2), Some(1.0)]],
        );
        assert!(out_of_range.is_err());
    }
}
