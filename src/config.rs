//! Configuration for the bounded LRU cache.
//!
//! This module provides a builder for the two things a cache needs at
//! construction: its capacity and the sink that receives diagnostic events.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::error::{CacheError, CacheResult};

/// Capacity used when none is configured.
pub const DEFAULT_CAPACITY: usize = 256;

/// Validated configuration for a cache instance.
///
/// Use the builder to construct one:
///
/// ```
/// use bounded_lru_cache::CacheConfig;
///
/// let config = CacheConfig::builder().capacity(10_000).build().unwrap();
/// assert_eq!(config.capacity(), 10_000);
/// ```
#[derive(Clone)]
pub struct CacheConfig {
    /// Maximum number of entries. Inserting a new key at this size evicts
    /// the least recently used entry first.
    pub(crate) capacity: NonZeroUsize,

    /// Where miss and eviction events are sent.
    pub(crate) diagnostics: Arc<dyn Diagnostics>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: NonZeroUsize::MIN.saturating_add(DEFAULT_CAPACITY - 1),
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }
}

impl fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheConfig")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl CacheConfig {
    /// Start building a configuration from the defaults.
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Get the configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Get the configured diagnostics sink.
    pub fn diagnostics(&self) -> Arc<dyn Diagnostics> {
        Arc::clone(&self.diagnostics)
    }
}

/// Builder for [`CacheConfig`]. Validation happens in [`build`](Self::build).
#[derive(Clone)]
pub struct CacheConfigBuilder {
    capacity: usize,
    diagnostics: Arc<dyn Diagnostics>,
}

impl Default for CacheConfigBuilder {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }
}

impl fmt::Debug for CacheConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheConfigBuilder")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl CacheConfigBuilder {
    /// Set the maximum number of entries. Must be at least 1.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the sink that receives diagnostic events.
    ///
    /// Defaults to [`TracingDiagnostics`].
    pub fn diagnostics(mut self, diagnostics: impl Diagnostics + 'static) -> Self {
        self.diagnostics = Arc::new(diagnostics);
        self
    }

    /// Validate and build the final configuration.
    ///
    /// Fails with [`CacheError::InvalidConfiguration`] for a zero capacity.
    pub fn build(self) -> CacheResult<CacheConfig> {
        let capacity = NonZeroUsize::new(self.capacity).ok_or_else(|| {
            CacheError::InvalidConfiguration("capacity must be at least 1".to_string())
        })?;

        Ok(CacheConfig {
            capacity,
            diagnostics: self.diagnostics,
        })
    }
}
