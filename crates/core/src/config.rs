//! Configuration for a simulated cache.
//!
//! This module defines the structures used to parameterise a [`Directory`](crate::cache::Directory).
//! It provides:
//! 1. **Defaults:** Baseline geometry constants.
//! 2. **Structures:** [`CacheConfig`] describing sets, ways, block size and policy.
//! 3. **Enums:** [`ReplacementPolicy`] selecting the victim finder.
//!
//! Configuration is supplied as JSON (`CacheConfig::from_json`) or built with
//! `CacheConfig::default()`.

use serde::Deserialize;

use crate::cache::policies::{LruVictimFinder, SrripVictimFinder, VictimFinder};
use crate::common::CacheError;

/// Default configuration constants.
mod defaults {
    /// Default number of sets.
    pub const NUM_SETS: usize = 64;

    /// Default associativity (4-way).
    pub const WAYS: usize = 4;

    /// Default block size in bytes.
    ///
    /// Matches typical cache line sizes and DRAM burst length.
    pub const BLOCK_SIZE: u64 = 64;
}

/// Cache replacement policy.
///
/// Specifies the algorithm used to select which block to fill
/// when a new line must be installed in a full set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReplacementPolicy {
    /// Least Recently Used replacement policy.
    ///
    /// Fills a free block if one exists, otherwise evicts the block
    /// at the least recently used end of the recency queue.
    #[default]
    #[serde(alias = "Lru")]
    Lru,
    /// Static Re-Reference Interval Prediction.
    ///
    /// Tracks a 2-bit re-reference prediction value per block and evicts
    /// blocks predicted to be re-referenced in the distant future.
    #[serde(alias = "Srrip")]
    Srrip,
}

impl ReplacementPolicy {
    /// Creates a fresh victim finder implementing this policy.
    pub fn build(self) -> Box<dyn VictimFinder> {
        match self {
            Self::Lru => Box::new(LruVictimFinder::new()),
            Self::Srrip => Box::new(SrripVictimFinder::new()),
        }
    }
}

/// Geometry and policy of one cache.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    /// Number of sets
    #[serde(default = "CacheConfig::default_num_sets")]
    pub num_sets: usize,

    /// Associativity (number of ways)
    #[serde(default = "CacheConfig::default_ways")]
    pub ways: usize,

    /// Block size in bytes; must be a power of two
    #[serde(default = "CacheConfig::default_block_size")]
    pub block_size: u64,

    /// Replacement policy
    #[serde(default)]
    pub policy: ReplacementPolicy,
}

impl CacheConfig {
    /// Returns the default number of sets.
    const fn default_num_sets() -> usize {
        defaults::NUM_SETS
    }

    /// Returns the default associativity.
    const fn default_ways() -> usize {
        defaults::WAYS
    }

    /// Returns the default block size in bytes.
    const fn default_block_size() -> u64 {
        defaults::BLOCK_SIZE
    }

    /// Parses a configuration from a JSON document.
    ///
    /// Missing fields take their defaults. The result is validated before it is returned.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Config`] if the document is not valid JSON for this structure,
    /// or [`CacheError::InvalidGeometry`] if the described cache cannot be built.
    pub fn from_json(json: &str) -> Result<Self, CacheError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the geometry describes a buildable cache.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidGeometry`] when there are no sets, no ways,
    /// or the block size is not a non-zero power of two.
    pub fn validate(&self) -> Result<(), CacheError> {
        validate_geometry(self.num_sets, self.ways, self.block_size)
    }

    /// Total capacity in bytes.
    pub const fn capacity(&self) -> u64 {
        self.num_sets as u64 * self.ways as u64 * self.block_size
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            num_sets: defaults::NUM_SETS,
            ways: defaults::WAYS,
            block_size: defaults::BLOCK_SIZE,
            policy: ReplacementPolicy::default(),
        }
    }
}

/// Shared geometry rules for configurations and directly constructed directories.
pub(crate) fn validate_geometry(
    num_sets: usize,
    ways: usize,
    block_size: u64,
) -> Result<(), CacheError> {
    let reason = if num_sets == 0 {
        "no sets"
    } else if ways == 0 {
        "no ways"
    } else if !block_size.is_power_of_two() {
        "block size must be a non-zero power of two"
    } else {
        return Ok(());
    };
    Err(CacheError::InvalidGeometry {
        num_sets,
        ways,
        block_size,
        reason,
    })
}
