//! Error types for the bounded LRU cache.
//!
//! Misses are not errors: `get`, `update` and `delete` report absence through
//! their return values. Only hard failures end up here.

use thiserror::Error;

/// The error type for cache construction and query building.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache configuration was rejected (for example a zero capacity).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A glob or regular expression could not be compiled.
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A specialized Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
