//! Least Recently Used (LRU) Replacement Policy.
//!
//! This policy evicts the block that has not been accessed for the longest time.
//! It keeps no state of its own: recency is read from the set's queue, which the
//! cache controller reorders on every access. The front of the queue is the
//! Least Recently Used block.
//!
//! # Performance
//!
//! - **Time Complexity:** `find_victim()` is O(W) where W is the associativity
//! - **Space Complexity:** O(1)
//! - **Best Case:** Workloads with good temporal locality
//! - **Worst Case:** Scanning patterns larger than cache capacity (thrashing)

use super::{VictimFinder, first_free, first_unlocked, locked_fallback};
use crate::cache::block::Set;

/// LRU victim finder.
#[derive(Debug, Clone, Copy, Default)]
pub struct LruVictimFinder;

impl LruVictimFinder {
    /// Creates a new LRU victim finder.
    pub const fn new() -> Self {
        Self
    }

    /// Selects a victim without touching the set.
    ///
    /// Priority, scanning from least to most recently used:
    /// 1. the first free block,
    /// 2. the first unlocked block,
    /// 3. the front of the queue when everything is locked.
    pub fn select(set: &Set) -> Option<usize> {
        first_free(set)
            .or_else(|| first_unlocked(set))
            .or_else(|| locked_fallback(set))
    }
}

impl VictimFinder for LruVictimFinder {
    fn find_victim(&mut self, set: &mut Set) -> Option<usize> {
        Self::select(set)
    }
}
