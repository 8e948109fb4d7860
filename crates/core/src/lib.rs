//! Victim selection for set-associative cache simulators.
//!
//! This crate decides which block of a cache set receives the next fill. It provides:
//! 1. **Data model:** [`Block`] and [`Set`], with the set's recency queue kept by the caller.
//! 2. **Policies:** Least-Recently-Used and Static Re-Reference Interval Prediction (SRRIP)
//!    behind the [`VictimFinder`] trait.
//! 3. **Directory:** A tag directory that drives a policy the way a cache controller does.
//! 4. **Configuration:** JSON-deserialisable cache geometry and policy selection.

/// Common types shared across the crate (errors).
pub mod common;
/// Cache configuration (defaults, policy enum, geometry validation).
pub mod config;
/// Cache sets, blocks, the tag directory and the replacement policies.
pub mod cache;

pub use crate::cache::policies::{LruVictimFinder, SrripVictimFinder, VictimFinder};
pub use crate::cache::{Access, Block, Directory, Evicted, Set};
pub use crate::common::CacheError;
pub use crate::config::{CacheConfig, ReplacementPolicy};
