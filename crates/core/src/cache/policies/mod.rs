//! Cache Replacement Policies.
//!
//! Implements algorithms for selecting the block of a set that receives the next fill.
//!
//! # Policies
//!
//! - `Lru`: Least Recently Used, driven by the set's recency queue.
//! - `Srrip`: Static Re-Reference Interval Prediction with 2-bit counters.
//!
//! Both prefer a free (invalid and unlocked) block over evicting live data, and both
//! fall back to the front of the recency queue when every block is locked. That
//! fallback may return a locked block; callers that must never evict a pinned line
//! check the lock flag of the result themselves.

/// Least Recently Used replacement policy.
pub mod lru;

/// Static Re-Reference Interval Prediction replacement policy.
pub mod srrip;

pub use lru::LruVictimFinder;
pub use srrip::SrripVictimFinder;

use tracing::debug;

use super::block::{Block, Set};

/// Trait for cache replacement policies.
///
/// The cache controller calls [`find_victim`](VictimFinder::find_victim) on every capacity
/// miss, [`on_fill`](VictimFinder::on_fill) right after installing a line in the chosen
/// block, and [`on_hit`](VictimFinder::on_hit) on every hit. Policies that keep no
/// per-block state ignore the hooks.
pub trait VictimFinder: Send + Sync {
    /// Selects the block of `set` to evict or fill.
    ///
    /// # Arguments
    ///
    /// * `set` - The set that missed. Only replacement metadata may be changed;
    ///   validity and lock flags are left untouched.
    ///
    /// # Returns
    ///
    /// The way index of the chosen block, or `None` if the set has no blocks.
    fn find_victim(&mut self, set: &mut Set) -> Option<usize>;

    /// Records a hit on `block`.
    fn on_hit(&mut self, _block: &mut Block) {}

    /// Records that new data was installed in `block`.
    fn on_fill(&mut self, _block: &mut Block) {}

    /// Forgets all replacement history.
    fn reset(&mut self) {}
}

/// First free block in recency order.
fn first_free(set: &Set) -> Option<usize> {
    set.iter_lru().find(|(_, b)| b.is_free()).map(|(way, _)| way)
}

/// First unlocked block in recency order.
fn first_unlocked(set: &Set) -> Option<usize> {
    set.iter_lru().find(|(_, b)| !b.is_locked).map(|(way, _)| way)
}

/// Victim used when no unlocked block exists: the front of the recency queue.
fn locked_fallback(set: &Set) -> Option<usize> {
    let way = set.recency_queue().first().copied();
    debug!(set = set.id(), ?way, "all blocks locked, falling back to LRU position");
    way
}
