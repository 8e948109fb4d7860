//! Error definitions.
//!
//! Replacement policies never fail: an empty set yields `None` and a fully locked set
//! falls back to its least recently used entry. Errors only arise around them:
//! 1. **Geometry:** A directory or configuration describing an impossible cache.
//! 2. **Locking:** A miss whose chosen victim is pinned, which the controller must reject.
//! 3. **Victim:** A policy answer that names no block of the set.
//! 4. **Parsing:** Malformed JSON configuration.

use thiserror::Error;

/// Errors reported by [`Directory`](crate::cache::Directory) and
/// [`CacheConfig`](crate::config::CacheConfig).
#[derive(Debug, Error)]
pub enum CacheError {
    /// The requested cache shape cannot be built.
    #[error("invalid cache geometry: {num_sets} sets x {ways} ways x {block_size} B ({reason})")]
    InvalidGeometry {
        /// Number of sets requested.
        num_sets: usize,
        /// Associativity requested.
        ways: usize,
        /// Block size in bytes requested.
        block_size: u64,
        /// Which rule was violated.
        reason: &'static str,
    },

    /// Every block in the set is locked, so the fallback victim cannot be evicted.
    #[error("set {set} has no unlocked block to evict")]
    SetLocked {
        /// Index of the fully locked set.
        set: usize,
    },

    /// The policy named no block of the set: the set is empty or the way is out of range.
    #[error("policy returned no usable victim for set {set}")]
    NoVictim {
        /// Index of the set that missed.
        set: usize,
    },

    /// The configuration document could not be parsed.
    #[error("malformed cache configuration: {0}")]
    Config(#[from] serde_json::Error),
}
