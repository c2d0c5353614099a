use crate::error::AnalyticsError;
use core_types::{PriceTable, ReturnTable};

/// Converts a price history into period-over-period simple returns.
#[derive(Debug, Default)]
pub struct ReturnsEngine {}

impl ReturnsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes `price[t] / price[t-1] - 1` for every ticker column.
    ///
    /// The output has one row fewer than the input and each row carries the date
    /// of `price[t]`. A missing price at either end of a period, or a zero
    /// previous price, gives a missing return for that period.
    ///
    /// # Errors
    ///
    /// `InsufficientData` when the table has fewer than two rows.
    pub fn compute_returns(&self, prices: &PriceTable) -> Result<ReturnTable, AnalyticsError> {
        if prices.len() < 2 {
            return Err(AnalyticsError::InsufficientData(format!(
                "at least 2 price rows are required to compute returns, got {}",
                prices.len()
            )));
        }

        let rows: Vec<Vec<Option<f64>>> = (1..prices.len())
            .map(|t| {
                (0..prices.num_tickers())
                    .map(|c| simple_return(prices.value(t - 1, c), prices.value(t, c)))
                    .collect()
            })
            .collect();

        let missing = rows.iter().flatten().filter(|v| v.is_none()).count();
        let returns = ReturnTable::new(
            prices.tickers().to_vec(),
            prices.dates()[1..].to_vec(),
            rows,
        )?;

        tracing::info!(
            periods = returns.len(),
            tickers = returns.num_tickers(),
            missing,
            "Calculated returns from {} to {}.",
            prices.dates()[0],
            prices.dates()[prices.len() - 1]
        );

        Ok(returns)
    }
}

/// The simple return between two prices, if both exist and the first is non-zero.
pub fn simple_return(previous: Option<f64>, current: Option<f64>) -> Option<f64> {
    match (previous, current) {
        (Some(prev), Some(cur)) if prev != 0.0 => Some(cur / prev - 1.0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn dates(n: u32) -> Vec<NaiveDate> {
        (1..=n).map(|d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap()).collect()
    }

    #[test]
    fn returns_are_one_row_shorter_and_exact() {
        let prices = PriceTable::new(
            vec!["AAA".into(), "BBB".into()],
            dates(3),
            vec![
                vec![Some(100.0), Some(50.0)],
                vec![Some(110.0), Some(55.0)],
                vec![Some(121.0), Some(60.5)],
            ],
        )
        .unwrap();

        let returns = ReturnsEngine::new().compute_returns(&prices).unwrap();
        assert_eq!(returns.len(), prices.len() - 1);
        assert_eq!(returns.dates(), &prices.dates()[1..]);
        for t in 0..returns.len() {
            for c in 0..returns.num_tickers() {
                let expected = prices.value(t + 1, c).unwrap() / prices.value(t, c).unwrap() - 1.0;
                assert_eq!(returns.value(t, c), Some(expected));
                assert_relative_eq!(returns.value(t, c).unwrap(), 0.10, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn missing_prices_propagate_as_missing_returns() {
        let prices = PriceTable::new(
            vec!["AAA".into()],
            dates(4),
            vec![vec![Some(10.0)], vec![None], vec![Some(12.0)], vec![Some(15.0)]],
        )
        .unwrap();

        let returns = ReturnsEngine::new().compute_returns(&prices).unwrap();
        let column: Vec<_> = returns.column_tail(0, returns.len()).collect();
        assert_eq!(column[0], None);
        assert_eq!(column[1], None);
        assert_relative_eq!(column[2].unwrap(), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn zero_previous_price_is_not_a_return() {
        assert_eq!(simple_return(Some(0.0), Some(5.0)), None);
        assert_eq!(simple_return(Some(5.0), None), None);
    }

    #[test]
    fn single_row_is_insufficient() {
        let prices = PriceTable::new(vec!["AAA".into()], dates(1), vec![vec![Some(1.0)]]).unwrap();
        let err = ReturnsEngine::new().compute_returns(&prices).unwrap_err();
        assert!(matches!(err, AnalyticsError::InsufficientData(_)));
    }
}
