use crate::correlation::validate_window;
use crate::error::AnalyticsError;
use crate::selection;
use crate::stats;
use core_types::{RankOrder, RankedEntry, RankedList, ReturnTable};

/// How per-period returns are turned into an annualized Sharpe ratio.
///
/// `score = (mean - risk_free_rate / annualization_factor) / std_dev * sqrt(annualization_factor)`
/// where `mean` and `std_dev` (sample, n - 1) are taken over the per-period returns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SharpeConvention {
    /// Annual risk-free rate as a decimal.
    pub risk_free_rate: f64,
    /// Return periods per year.
    pub annualization_factor: f64,
}

impl Default for SharpeConvention {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.0,
            annualization_factor: 252.0,
        }
    }
}

impl SharpeConvention {
    pub fn new(risk_free_rate: f64, annualization_factor: f64) -> Result<Self, AnalyticsError> {
        if !annualization_factor.is_finite() || annualization_factor <= 0.0 {
            return Err(AnalyticsError::InvalidParameter(format!(
                "annualization factor must be positive, got {annualization_factor}"
            )));
        }
        if !risk_free_rate.is_finite() {
            return Err(AnalyticsError::InvalidParameter(format!(
                "risk-free rate must be finite, got {risk_free_rate}"
            )));
        }
        Ok(Self {
            risk_free_rate,
            annualization_factor,
        })
    }

    /// The risk-free rate for a single period.
    pub fn periodic_risk_free(&self) -> f64 {
        self.risk_free_rate / self.annualization_factor
    }

    /// Annualized Sharpe ratio of a return sample, or `None` when undefined.
    pub fn score(&self, returns: &[f64]) -> Option<f64> {
        if returns.len() < 2 || stats::is_constant(returns) {
            return None;
        }
        let mean = stats::mean(returns)?;
        let std_dev = stats::sample_std_dev(returns)?;
        if std_dev == 0.0 || !std_dev.is_finite() {
            return None;
        }
        Some((mean - self.periodic_risk_free()) / std_dev * self.annualization_factor.sqrt())
    }
}

/// Ranks tickers by annualized Sharpe ratio over a trailing window.
#[derive(Debug, Clone, Copy)]
pub struct RiskAdjustedRanker<'a> {
    returns: &'a ReturnTable,
    convention: SharpeConvention,
}

impl<'a> RiskAdjustedRanker<'a> {
    pub fn new(returns: &'a ReturnTable, convention: SharpeConvention) -> Self {
        Self { returns, convention }
    }

    pub fn convention(&self) -> SharpeConvention {
        self.convention
    }

    /// A copy of this ranker using a different annual risk-free rate.
    pub fn with_risk_free_rate(&self, risk_free_rate: f64) -> Result<Self, AnalyticsError> {
        let convention = SharpeConvention::new(risk_free_rate, self.convention.annualization_factor)?;
        Ok(Self { convention, ..*self })
    }

    /// Sharpe ratio of one ticker over the last `window` periods.
    ///
    /// # Errors
    ///
    /// `UnknownTicker`, `InvalidWindow`, or `UndefinedMetric` when the window has
    /// fewer than two returns or the returns are constant.
    pub fn sharpe_ratio(&self, ticker: &str, window: usize) -> Result<f64, AnalyticsError> {
        let column = self
            .returns
            .ticker_index(ticker)
            .ok_or_else(|| AnalyticsError::UnknownTicker(ticker.to_string()))?;
        validate_window(window, self.returns.len())?;

        let sample = self.sample(column, window);
        self.convention
            .score(&sample)
            .ok_or_else(|| AnalyticsError::UndefinedMetric {
                metric: "sharpe_ratio",
                ticker: ticker.to_string(),
                reason: if sample.len() < 2 {
                    format!("{} returns in window, need at least 2", sample.len())
                } else {
                    "returns have zero volatility".to_string()
                },
            })
    }

    /// The `k` tickers with the highest Sharpe ratio. Tickers whose ratio is
    /// undefined are left out rather than scored.
    pub fn top_sharpe(&self, window: usize, k: usize) -> Result<RankedList, AnalyticsError> {
        if k == 0 {
            return Err(AnalyticsError::InvalidSelectionSize(k));
        }
        let top = selection::select(self.scores(window)?, k, RankOrder::Descending)?;

        tracing::info!(
            window,
            risk_free_rate = self.convention.risk_free_rate,
            "Top {} stocks by Sharpe ratio.",
            top.len()
        );
        for (i, entry) in top.iter().enumerate() {
            tracing::info!("  {}. {}: {:.3}", i + 1, entry.ticker, entry.value);
        }
        Ok(top)
    }

    /// Every ticker with a defined Sharpe ratio, highest first.
    pub fn sharpe_ranking(&self, window: usize) -> Result<RankedList, AnalyticsError> {
        Ok(RankedList::from_unsorted(RankOrder::Descending, self.scores(window)?))
    }

    fn scores(&self, window: usize) -> Result<Vec<RankedEntry>, AnalyticsError> {
        validate_window(window, self.returns.len())?;

        let mut scores = Vec::with_capacity(self.returns.num_tickers());
        for (column, ticker) in self.returns.tickers().iter().enumerate() {
            match self.convention.score(&self.sample(column, window)) {
                Some(score) => scores.push(RankedEntry::new(ticker.clone(), score)),
                None => tracing::debug!(ticker = %ticker, window, "Sharpe ratio undefined; excluded."),
            }
        }

        tracing::info!(
            scored = scores.len(),
            tickers = self.returns.num_tickers(),
            "Calculated Sharpe ratios."
        );
        Ok(scores)
    }

    fn sample(&self, column: usize, window: usize) -> Vec<f64> {
        self.returns.column_tail(column, window).flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn table(tickers: &[&str], rows: Vec<Vec<Option<f64>>>) -> ReturnTable {
        let dates = (0..rows.len())
            .map(|d| NaiveDate::from_ymd_opt(2024, 6, 3).unwrap() + chrono::Days::new(d as u64))
            .collect();
        ReturnTable::new(tickers.iter().map(|t| t.to_string()).collect(), dates, rows).unwrap()
    }

    fn universe() -> ReturnTable {
        table(
            &["STEADY", "FLAT", "SWING", "SPARSE"],
            vec![
                vec![Some(0.010), Some(0.002), Some(0.05), Some(0.01)],
                vec![Some(0.012), Some(0.002), Some(-0.04), None],
                vec![Some(0.008), Some(0.002), Some(0.03), None],
                vec![Some(0.011), Some(0.002), Some(-0.02), None],
            ],
        )
    }

    #[test]
    fn score_matches_the_documented_convention() {
        let returns = [0.01, 0.02, -0.005, 0.015];
        let convention = SharpeConvention::new(0.04, 252.0).unwrap();
        let mean = 0.01;
        let std = stats::sample_std_dev(&returns).unwrap();
        let expected = (mean - 0.04 / 252.0) / std * 252f64.sqrt();
        assert_relative_eq!(convention.score(&returns).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn zero_volatility_is_undefined_not_infinite() {
        let returns = universe();
        let ranker = RiskAdjustedRanker::new(&returns, SharpeConvention::default());
        assert!(matches!(
            ranker.sharpe_ratio("FLAT", 4),
            Err(AnalyticsError::UndefinedMetric { metric: "sharpe_ratio", .. })
        ));
        assert!(matches!(
            ranker.sharpe_ratio("SPARSE", 4),
            Err(AnalyticsError::UndefinedMetric { .. })
        ));
    }

    #[test]
    fn constant_growth_on_any_price_scale_is_undefined() {
        // The same 10% growth, once exact and once with rounding noise.
        let returns = table(
            &["EXACT", "NOISY", "MOVER"],
            vec![
                vec![Some(0.1), Some(0.10000000000000009), Some(0.1)],
                vec![Some(0.1), Some(0.09999999999999987), Some(-0.045454545454545414)],
            ],
        );
        let ranker = RiskAdjustedRanker::new(&returns, SharpeConvention::default());
        for ticker in ["EXACT", "NOISY"] {
            assert!(matches!(
                ranker.sharpe_ratio(ticker, 2),
                Err(AnalyticsError::UndefinedMetric { metric: "sharpe_ratio", .. })
            ));
        }
        assert_eq!(ranker.top_sharpe(2, 3).unwrap().tickers(), vec!["MOVER"]);
    }

    #[test]
    fn top_sharpe_excludes_undefined_and_orders_descending() {
        let returns = universe();
        let ranker = RiskAdjustedRanker::new(&returns, SharpeConvention::default());
        let top = ranker.top_sharpe(4, 10).unwrap();
        assert_eq!(top.tickers(), vec!["STEADY", "SWING"]);
        assert!(top.is_ordered());
        assert!(top.iter().all(|e| e.value.is_finite()));

        let ranking = ranker.sharpe_ranking(4).unwrap();
        assert_eq!(ranking, top);
    }

    #[test]
    fn risk_free_rate_lowers_scores() {
        let returns = universe();
        let base = RiskAdjustedRanker::new(&returns, SharpeConvention::default());
        let with_rate = base.with_risk_free_rate(0.05).unwrap();
        assert!(with_rate.sharpe_ratio("STEADY", 4).unwrap() < base.sharpe_ratio("STEADY", 4).unwrap());
        assert_eq!(with_rate.convention().annualization_factor, 252.0);
    }

    #[test]
    fn rejects_bad_convention_and_arguments() {
        assert!(SharpeConvention::new(0.0, 0.0).is_err());
        assert!(SharpeConvention::new(f64::NAN, 252.0).is_err());

        let returns = universe();
        let ranker = RiskAdjustedRanker::new(&returns, SharpeConvention::default());
        assert_eq!(ranker.top_sharpe(4, 0).unwrap_err(), AnalyticsError::InvalidSelectionSize(0));
        assert!(matches!(ranker.top_sharpe(5, 1), Err(AnalyticsError::InvalidWindow { .. })));
        assert_eq!(
            ranker.sharpe_ratio("NOPE", 2).unwrap_err(),
            AnalyticsError::UnknownTicker("NOPE".into())
        );
    }
}
