//! # Bounded LRU Cache
//!
//! A bounded, thread-safe, in-memory key-value cache with least-recently-used
//! eviction and a multi-mode filter facility.
//!
//! ## Features
//!
//! - **Thread-safe**: Share across threads with `Clone` (uses `Arc` internally)
//! - **LRU eviction**: The least recently used entry is evicted when a new key arrives at capacity
//! - **Filtering**: Select entries by exact key, key set, integer index, glob or regex
//! - **Pluggable diagnostics**: Misses and evictions go to a sink you choose
//! - **Zero unsafe code**: Built entirely with safe Rust
//!
//! ## Quick Start
//!
//! ```rust
//! use bounded_lru_cache::{Cache, CacheConfig, Selector};
//!
//! let config = CacheConfig::builder().capacity(3).build().unwrap();
//! let cache = Cache::new(config);
//!
//! cache.add("key1", "value1");
//! cache.add("key2", "value2");
//! cache.add("key3", "value3");
//!
//! // Reading key1 makes it most recently used...
//! assert_eq!(cache.get("key1"), Some("value1"));
//!
//! // ...so the next new key evicts key2 instead.
//! cache.add("key4", "value4");
//! assert_eq!(cache.keys(), vec!["key3", "key1", "key4"]);
//!
//! let matches = cache.filter(&Selector::glob("key[13]").unwrap());
//! assert_eq!(matches, vec![("key3", "value3"), ("key1", "value1")]);
//! ```
//!
//! ## Thread Safety
//!
//! The cache is safe to share across threads. Cloning a `Cache` creates a new
//! handle to the same underlying data:
//!
//! ```rust
//! use bounded_lru_cache::Cache;
//! use std::thread;
//!
//! let cache: Cache<String, String> = Cache::default();
//!
//! let handles: Vec<_> = (0..4).map(|i| {
//!     let cache = cache.clone();
//!     thread::spawn(move || {
//!         cache.add(format!("key_{}", i), format!("value_{}", i));
//!     })
//! }).collect();
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! assert_eq!(cache.len(), 4);
//! ```
//!
//! ## Diagnostics
//!
//! By default, events are forwarded to [`tracing`](https://docs.rs/tracing).
//! Install any subscriber to see them, or pass a different [`Diagnostics`]
//! sink to [`CacheConfigBuilder::diagnostics`].

pub mod cache;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod filter;
pub mod glob;

pub use cache::Cache;
pub use config::{CacheConfig, CacheConfigBuilder, DEFAULT_CAPACITY};
pub use diagnostics::{
    CacheEvent, Diagnostics, EventCounter, EventKind, NoopDiagnostics, TracingDiagnostics,
};
pub use error::{CacheError, CacheResult};
pub use filter::{FilterKey, Selector};
pub use glob::GlobPattern;

// Internal modules - not part of public API
pub(crate) mod storage;
