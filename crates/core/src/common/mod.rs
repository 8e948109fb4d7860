//! Common types used throughout the crate.

/// Error type for directory construction, configuration and access.
pub mod error;

pub use error::CacheError;
