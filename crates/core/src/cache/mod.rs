//! Set-Associative Cache Directory.
//!
//! This module implements the tag store of a set-associative cache and the
//! controller logic that drives a replacement policy:
//! 1. **Lookup:** Maps an address to its set and matches tags.
//! 2. **Hits:** Moves the block to the MRU end of the recency queue and notifies the policy.
//! 3. **Misses:** Asks the policy for a victim, rejects locked victims, installs the
//!    new tag and notifies the policy of the fill.
//!
//! Data storage, timing and statistics are left to the embedding simulator.

/// Cache blocks and sets.
pub mod block;
/// Cache replacement policy implementations (LRU, SRRIP).
pub mod policies;

pub use self::block::{Block, Set};

use tracing::debug;

use self::policies::VictimFinder;
use crate::common::CacheError;
use crate::config::{CacheConfig, validate_geometry};

/// Line displaced by a fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evicted {
    /// Tag of the displaced line.
    pub tag: u64,
    /// Whether the displaced line must be written back.
    pub dirty: bool,
}

/// Outcome of [`Directory::access`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// The address was resident.
    Hit {
        /// Set index.
        set: usize,
        /// Way holding the line.
        way: usize,
    },
    /// The address was installed into the chosen victim.
    Miss {
        /// Set index.
        set: usize,
        /// Way that received the fill.
        way: usize,
        /// The valid line that was replaced, if any.
        evicted: Option<Evicted>,
    },
}

impl Access {
    /// True for [`Access::Hit`].
    pub const fn is_hit(&self) -> bool {
        matches!(self, Self::Hit { .. })
    }

    /// Set and way that now hold the line.
    pub const fn location(&self) -> (usize, usize) {
        match *self {
            Self::Hit { set, way } | Self::Miss { set, way, .. } => (set, way),
        }
    }
}

/// Tag directory of a set-associative cache.
///
/// Owns every [`Set`] and one [`VictimFinder`] shared by all of them. Blocks are
/// identified by `(set, way)`, so the finder never sees blocks of two sets collide.
pub struct Directory {
    sets: Vec<Set>,
    ways: usize,
    block_size: u64,
    finder: Box<dyn VictimFinder>,
}

impl std::fmt::Debug for Directory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Directory")
            .field("num_sets", &self.sets.len())
            .field("ways", &self.ways)
            .field("block_size", &self.block_size)
            .finish_non_exhaustive()
    }
}

impl Directory {
    /// Creates a directory of empty sets.
    ///
    /// # Arguments
    ///
    /// * `num_sets` - Number of sets.
    /// * `ways` - Associativity.
    /// * `block_size` - Bytes per block; a power of two.
    /// * `finder` - Replacement policy consulted on misses.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidGeometry`] for zero sets, zero ways, or a block
    /// size that is not a non-zero power of two.
    pub fn new(
        num_sets: usize,
        ways: usize,
        block_size: u64,
        finder: Box<dyn VictimFinder>,
    ) -> Result<Self, CacheError> {
        validate_geometry(num_sets, ways, block_size)?;
        debug!(num_sets, ways, block_size, "directory created");
        Ok(Self {
            sets: (0..num_sets).map(|id| Set::new(id, ways)).collect(),
            ways,
            block_size,
            finder,
        })
    }

    /// Creates a directory from a configuration, building its policy.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidGeometry`] if the configuration does not validate.
    pub fn from_config(config: &CacheConfig) -> Result<Self, CacheError> {
        Self::new(
            config.num_sets,
            config.ways,
            config.block_size,
            config.policy.build(),
        )
    }

    /// Number of sets.
    pub fn num_sets(&self) -> usize {
        self.sets.len()
    }

    /// Associativity.
    pub const fn ways(&self) -> usize {
        self.ways
    }

    /// Bytes per block.
    pub const fn block_size(&self) -> u64 {
        self.block_size
    }

    /// Returns set `index`, if it exists.
    pub fn set(&self, index: usize) -> Option<&Set> {
        self.sets.get(index)
    }

    /// Splits an address into its set index and tag.
    pub fn decompose(&self, addr: u64) -> (usize, u64) {
        let block_addr = addr / self.block_size;
        let num_sets = self.sets.len() as u64;
        ((block_addr % num_sets) as usize, block_addr / num_sets)
    }

    /// Finds the block holding `addr` without changing any state.
    pub fn lookup(&self, addr: u64) -> Option<(usize, usize)> {
        let (set, tag) = self.decompose(addr);
        self.sets[set].find(tag).map(|way| (set, way))
    }

    /// Asks the policy which block of `addr`'s set should receive a fill.
    ///
    /// The result may be locked if every block of the set is locked.
    pub fn find_victim(&mut self, addr: u64) -> Option<(usize, usize)> {
        let (set, _) = self.decompose(addr);
        self.finder
            .find_victim(&mut self.sets[set])
            .map(|way| (set, way))
    }

    /// Records a hit: moves the block to the MRU position and notifies the policy.
    ///
    /// Out-of-range coordinates are ignored.
    pub fn visit(&mut self, set: usize, way: usize) {
        let Some(s) = self.sets.get_mut(set) else {
            return;
        };
        if let Some(block) = s.block_mut(way) {
            self.finder.on_hit(block);
            s.touch(way);
        }
    }

    /// Performs a lookup and, on a miss, a fill.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::SetLocked`] when the miss cannot be served because the
    /// policy could only offer a locked block, or [`CacheError::NoVictim`] when the
    /// policy named no block of the set. Tags, flags and recency order are left
    /// unchanged in both cases.
    pub fn access(&mut self, addr: u64, is_write: bool) -> Result<Access, CacheError> {
        let (set, tag) = self.decompose(addr);

        if let Some(way) = self.sets[set].find(tag) {
            self.visit(set, way);
            if is_write {
                if let Some(block) = self.sets[set].block_mut(way) {
                    block.is_dirty = true;
                }
            }
            return Ok(Access::Hit { set, way });
        }

        let s = &mut self.sets[set];
        let way = self
            .finder
            .find_victim(s)
            .ok_or(CacheError::NoVictim { set })?;
        let block = s.block_mut(way).ok_or(CacheError::NoVictim { set })?;
        if block.is_locked {
            debug!(set, way, "miss rejected, victim is locked");
            return Err(CacheError::SetLocked { set });
        }

        let evicted = block.is_valid.then_some(Evicted {
            tag: block.tag,
            dirty: block.is_dirty,
        });
        block.tag = tag;
        block.is_valid = true;
        block.is_dirty = is_write;
        self.finder.on_fill(block);
        s.touch(way);

        Ok(Access::Miss { set, way, evicted })
    }

    /// Drops the line holding `addr`. Returns whether a line was resident.
    pub fn invalidate(&mut self, addr: u64) -> bool {
        let Some((set, way)) = self.lookup(addr) else {
            return false;
        };
        if let Some(block) = self.sets[set].block_mut(way) {
            block.is_valid = false;
            block.is_dirty = false;
        }
        true
    }

    /// Pins or unpins the line holding `addr`. Returns whether a line was resident.
    pub fn set_locked(&mut self, addr: u64, locked: bool) -> bool {
        let Some((set, way)) = self.lookup(addr) else {
            return false;
        };
        if let Some(block) = self.sets[set].block_mut(way) {
            block.is_locked = locked;
        }
        true
    }

    /// Empties every set and clears the policy's history.
    pub fn reset(&mut self) {
        for set in &mut self.sets {
            set.clear();
        }
        self.finder.reset();
        debug!(num_sets = self.sets.len(), "directory reset");
    }
}
