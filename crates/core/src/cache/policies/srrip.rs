//! Static Re-Reference Interval Prediction (SRRIP) Replacement Policy.
//!
//! Each block carries a 2-bit re-reference prediction value (RRPV) estimating how
//! far in the future it will be referenced again. Fills insert at a long (but not
//! distant) interval, hits promote to near-immediate, and the victim is any block
//! predicted for the distant future (`RRPV_MAX`). When no block qualifies, every
//! unlocked valid block is aged by one and the search repeats.
//!
//! The counter lives in the block itself. The policy stamps each value with its
//! current epoch, so [`reset`](VictimFinder::reset) forgets every counter by moving
//! to a fresh epoch. Unstamped blocks read as `INSERT_RRPV`.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `on_hit()` / `on_fill()` / `reset()`: O(1)
//!   - `find_victim()`: O(W) per pass, at most `RRPV_MAX + 1` aging passes
//! - **Space Complexity:** One stamped counter per block
//! - **Best Case:** Mixed workloads where scans would flush an LRU cache
//! - **Worst Case:** Recency-friendly loops slightly larger than the cache

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace};

use super::{VictimFinder, first_free, locked_fallback};
use crate::cache::block::{Block, RrpvStamp, Set};

/// Largest RRPV (2-bit counter); a block at this value is evictable.
pub const RRPV_MAX: u8 = 3;

/// RRPV assigned on fill and to untracked blocks.
pub const INSERT_RRPV: u8 = 2;

/// RRPV assigned on hit.
pub const HIT_RRPV: u8 = 0;

/// Source of epochs; unique across every policy instance in the process.
static NEXT_EPOCH: AtomicU64 = AtomicU64::new(1);

fn next_epoch() -> u64 {
    NEXT_EPOCH.fetch_add(1, Ordering::Relaxed)
}

/// SRRIP victim finder.
#[derive(Debug)]
pub struct SrripVictimFinder {
    /// Stamps written under any other epoch are ignored.
    epoch: u64,
    /// Aging passes performed by the most recent `find_victim` call.
    last_aging_rounds: u32,
}

impl SrripVictimFinder {
    /// Creates a new SRRIP victim finder with no tracked blocks.
    pub fn new() -> Self {
        Self {
            epoch: next_epoch(),
            last_aging_rounds: 0,
        }
    }

    /// Effective RRPV of `block` as seen by this policy.
    #[inline]
    pub const fn rrpv(&self, block: &Block) -> u8 {
        match block.rrpv {
            Some(stamp) if stamp.epoch == self.epoch => stamp.value,
            _ => INSERT_RRPV,
        }
    }

    /// True if this policy has recorded a counter for `block` since its last reset.
    #[inline]
    pub const fn is_tracked(&self, block: &Block) -> bool {
        matches!(block.rrpv, Some(stamp) if stamp.epoch == self.epoch)
    }

    /// Number of aging passes the last [`find_victim`](VictimFinder::find_victim) needed.
    pub const fn last_aging_rounds(&self) -> u32 {
        self.last_aging_rounds
    }

    #[inline]
    const fn store(&self, block: &mut Block, value: u8) {
        block.rrpv = Some(RrpvStamp {
            value,
            epoch: self.epoch,
        });
    }

    /// Reads the counter, recording the insertion value for untracked blocks.
    const fn load(&self, block: &mut Block) -> u8 {
        let value = self.rrpv(block);
        if !self.is_tracked(block) {
            self.store(block, value);
        }
        value
    }

    /// First unlocked block in recency order whose counter is at `RRPV_MAX`.
    fn find_distant(&self, set: &mut Set) -> Option<usize> {
        for pos in 0..set.ways() {
            let way = set.recency_queue()[pos];
            let Some(block) = set.block_mut(way) else {
                continue;
            };
            if block.is_locked {
                continue;
            }
            if self.load(block) == RRPV_MAX {
                return Some(way);
            }
        }
        None
    }

    /// Increments the counter of every unlocked valid block, saturating at `RRPV_MAX`.
    fn age(&self, set: &mut Set) {
        for way in 0..set.ways() {
            let Some(block) = set.block_mut(way) else {
                continue;
            };
            if block.is_locked || !block.is_valid {
                continue;
            }
            let value = self.load(block);
            if value < RRPV_MAX {
                self.store(block, value + 1);
            }
        }
    }
}

impl Default for SrripVictimFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl VictimFinder for SrripVictimFinder {
    /// Selects a victim.
    ///
    /// Priority:
    /// 1. A free block, which is tracked at `INSERT_RRPV` if it was unseen.
    /// 2. The first unlocked block at `RRPV_MAX`.
    /// 3. Otherwise, age all unlocked valid blocks and retry (2) until it succeeds or
    ///    every block is locked.
    ///
    /// If everything is locked the front of the recency queue is returned.
    fn find_victim(&mut self, set: &mut Set) -> Option<usize> {
        self.last_aging_rounds = 0;

        if let Some(way) = first_free(set) {
            if let Some(block) = set.block_mut(way) {
                let _ = self.load(block);
            }
            trace!(set = set.id(), way, "srrip filling free block");
            return Some(way);
        }

        if let Some(way) = self.find_distant(set) {
            trace!(set = set.id(), way, "srrip immediate victim");
            return Some(way);
        }

        loop {
            self.age(set);
            self.last_aging_rounds += 1;
            trace!(set = set.id(), round = self.last_aging_rounds, "srrip aging");

            if let Some(way) = self.find_distant(set) {
                trace!(set = set.id(), way, rounds = self.last_aging_rounds, "srrip aged victim");
                return Some(way);
            }
            if set.blocks().iter().all(|b| b.is_locked) {
                break;
            }
        }

        locked_fallback(set)
    }

    fn on_hit(&mut self, block: &mut Block) {
        self.store(block, HIT_RRPV);
    }

    fn on_fill(&mut self, block: &mut Block) {
        self.store(block, INSERT_RRPV);
    }

    fn reset(&mut self) {
        self.epoch = next_epoch();
        self.last_aging_rounds = 0;
        debug!(epoch = self.epoch, "srrip counters reset");
    }
}
