//! Bounded top-k selection.
//!
//! `BoundedSelection` keeps the best `k` entries seen so far in a binary heap whose
//! root is the currently worst kept entry. Each push is `O(log k)`, so selecting
//! from `n` candidates costs `O(n log k)` instead of a full sort.

use crate::error::AnalyticsError;
use core_types::{RankOrder, RankedEntry, RankedList};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A heap slot ordered by rank position: the greatest slot is the one ranked last.
#[derive(Debug)]
struct Slot {
    entry: RankedEntry,
    order: RankOrder,
}

impl Ord for Slot {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order.compare(&self.entry, &other.entry)
    }
}

impl PartialOrd for Slot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Slot {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Slot {}

/// A fixed-capacity priority structure retaining the `k` best-ranked entries.
///
/// For `RankOrder::Descending` it behaves as a size-`k` min-heap (top-k); for
/// `RankOrder::Ascending` as a size-`k` max-heap (bottom-k). Ties are resolved by
/// ticker symbol so the result does not depend on push order.
#[derive(Debug)]
pub struct BoundedSelection {
    capacity: usize,
    order: RankOrder,
    heap: BinaryHeap<Slot>,
}

impl BoundedSelection {
    pub fn new(capacity: usize, order: RankOrder) -> Result<Self, AnalyticsError> {
        if capacity == 0 {
            return Err(AnalyticsError::InvalidSelectionSize(capacity));
        }
        Ok(Self {
            capacity,
            order,
            heap: BinaryHeap::with_capacity(capacity + 1),
        })
    }

    /// Offers a candidate. Non-finite values are ignored.
    pub fn push(&mut self, entry: RankedEntry) {
        if !entry.value.is_finite() {
            return;
        }
        let slot = Slot {
            entry,
            order: self.order,
        };
        if self.heap.len() < self.capacity {
            self.heap.push(slot);
            return;
        }
        // The root is the worst kept entry; replace it only if the candidate ranks ahead.
        if let Some(mut worst) = self.heap.peek_mut() {
            if slot < *worst {
                *worst = slot;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Consumes the selection, returning the kept entries best-first.
    pub fn into_ranked_list(self) -> RankedList {
        let entries = self
            .heap
            .into_sorted_vec()
            .into_iter()
            .map(|slot| slot.entry)
            .collect();
        RankedList {
            order: self.order,
            entries,
        }
    }
}

/// Selects up to `k` entries from `candidates` in the given order.
pub fn select<I>(candidates: I, k: usize, order: RankOrder) -> Result<RankedList, AnalyticsError>
where
    I: IntoIterator<Item = RankedEntry>,
{
    let mut selection = BoundedSelection::new(k, order)?;
    for candidate in candidates {
        selection.push(candidate);
    }
    Ok(selection.into_ranked_list())
}
