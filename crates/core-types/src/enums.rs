use crate::structs::RankedEntry;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// The direction in which a `RankedList` is ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankOrder {
    /// Highest metric first (top-k).
    Descending,
    /// Lowest metric first (bottom-k).
    Ascending,
}

impl RankOrder {
    /// Compares two entries by rank position.
    ///
    /// `Ordering::Less` means `a` is ranked ahead of `b`. Equal metric values are
    /// ordered by ticker symbol ascending in both directions, so a ranking never
    /// depends on the order in which tickers were supplied. `-0.0` and `0.0`
    /// count as equal.
    pub fn compare(&self, a: &RankedEntry, b: &RankedEntry) -> Ordering {
        // Adding +0.0 turns -0.0 into 0.0 and leaves every other value alone.
        let (x, y) = (a.value + 0.0, b.value + 0.0);
        let by_value = match self {
            RankOrder::Descending => y.total_cmp(&x),
            RankOrder::Ascending => x.total_cmp(&y),
        };
        by_value.then_with(|| a.ticker.cmp(&b.ticker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descending_ties_break_on_ticker() {
        let a = RankedEntry::new("AAA", 0.21);
        let b = RankedEntry::new("BBB", 0.21);
        assert_eq!(RankOrder::Descending.compare(&a, &b), Ordering::Less);
        assert_eq!(RankOrder::Ascending.compare(&a, &b), Ordering::Less);
    }

    #[test]
    fn value_dominates_ticker() {
        let low = RankedEntry::new("AAA", -0.05);
        let high = RankedEntry::new("ZZZ", 0.30);
        assert_eq!(RankOrder::Descending.compare(&high, &low), Ordering::Less);
        assert_eq!(RankOrder::Ascending.compare(&low, &high), Ordering::Less);
    }

    #[test]
    fn signed_zeros_tie_and_break_on_ticker() {
        let negative = RankedEntry::new("AAA", -0.0);
        let positive = RankedEntry::new("BBB", 0.0);
        for order in [RankOrder::Descending, RankOrder::Ascending] {
            assert_eq!(order.compare(&negative, &positive), Ordering::Less);
            assert_eq!(order.compare(&positive, &negative), Ordering::Greater);
        }
    }
}
