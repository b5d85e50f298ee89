//! The main cache interface.
//!
//! This module provides the primary `Cache` type that users interact with.
//! It wraps the internal storage and provides a clean, thread-safe API.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::config::CacheConfig;
use crate::error::CacheResult;
use crate::filter::{FilterKey, Selector};
use crate::storage::Db;

/// A thread-safe, bounded, in-memory cache with LRU eviction.
///
/// Entries are kept in recency order. Reading a key with [`get`](Self::get)
/// or writing it with [`add`](Self::add) / [`update`](Self::update) makes it
/// the most recently used. When a new key arrives at capacity, the least
/// recently used entry is evicted.
///
/// Cloning a `Cache` creates a new handle to the same underlying data.
///
/// # Example
/// ```
/// use bounded_lru_cache::{Cache, CacheConfig, Selector};
///
/// let config = CacheConfig::builder().capacity(1000).build().unwrap();
/// let cache: Cache<String, String> = Cache::new(config);
///
/// cache.add("user:123".to_string(), "Alice".to_string());
/// if let Some(value) = cache.get("user:123") {
///     println!("Found: {}", value);
/// }
///
/// let users = cache.filter(&Selector::glob("user:*").unwrap());
/// assert_eq!(users.len(), 1);
/// ```
pub struct Cache<K, V> {
    /// Internal storage.
    db: Arc<Db<K, V>>,
}

impl<K, V> Cache<K, V>
where
    K: Hash + Eq,
{
    /// Create a new cache with the given configuration.
    ///
    /// # Example
    /// ```
    /// use bounded_lru_cache::{Cache, CacheConfig};
    ///
    /// let cache: Cache<String, u64> = Cache::new(CacheConfig::default());
    /// assert_eq!(cache.capacity(), 256);
    /// ```
    pub fn new(config: CacheConfig) -> Self {
        Self {
            db: Arc::new(Db::new(config)),
        }
    }

    /// Create a cache holding at most `capacity` entries, with the default
    /// diagnostics sink.
    ///
    /// Fails with `CacheError::InvalidConfiguration` if `capacity` is zero.
    ///
    /// # Example
    /// ```
    /// use bounded_lru_cache::Cache;
    ///
    /// assert!(Cache::<String, String>::with_capacity(0).is_err());
    /// let cache = Cache::<String, String>::with_capacity(3).unwrap();
    /// assert_eq!(cache.capacity(), 3);
    /// ```
    pub fn with_capacity(capacity: usize) -> CacheResult<Self> {
        let config = CacheConfig::builder().capacity(capacity).build()?;
        Ok(Self::new(config))
    }

    /// Store `value` under `key`, making it the most recently used entry.
    ///
    /// If `key` is new and the cache is full, the least recently used entry
    /// is evicted first. An existing key is overwritten without eviction.
    ///
    /// # Example
    /// ```
    /// use bounded_lru_cache::Cache;
    ///
    /// let cache = Cache::with_capacity(2).unwrap();
    /// cache.add("a", 1);
    /// cache.add("b", 2);
    /// cache.add("c", 3); // evicts "a"
    /// assert_eq!(cache.keys(), vec!["b", "c"]);
    /// ```
    pub fn add(&self, key: K, value: V)
    where
        K: fmt::Debug,
    {
        self.db.add(key, value);
    }

    /// Get a copy of the value stored under `key`.
    ///
    /// Returns `None` if the key is not cached. A hit marks the key as most
    /// recently used; a miss is reported to the diagnostics sink.
    ///
    /// # Example
    /// ```
    /// use bounded_lru_cache::Cache;
    ///
    /// let cache = Cache::with_capacity(8).unwrap();
    /// cache.add("key".to_string(), "value".to_string());
    ///
    /// match cache.get("key") {
    ///     Some(value) => println!("Found: {}", value),
    ///     None => println!("Not found"),
    /// }
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
        V: Clone,
    {
        self.db.get(key)
    }

    /// Get a copy of the value stored under `key` without touching recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.db.peek(key)
    }

    /// Replace the value under `key` and make it the most recently used.
    ///
    /// If the key is absent, the event is reported and the pair is inserted
    /// as with [`add`](Self::add), eviction included.
    pub fn update(&self, key: K, value: V)
    where
        K: fmt::Debug,
    {
        self.db.update(key, value);
    }

    /// Delete a key from the cache.
    ///
    /// Returns the number of entries removed: 1 if the key existed, else 0.
    ///
    /// # Example
    /// ```
    /// use bounded_lru_cache::Cache;
    ///
    /// let cache = Cache::with_capacity(8).unwrap();
    /// cache.add("key".to_string(), "value");
    /// assert_eq!(cache.delete("key"), 1);
    /// assert_eq!(cache.delete("key"), 0); // Already deleted
    /// ```
    pub fn delete<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
    {
        self.db.delete(key)
    }

    /// Check if a key exists in the cache.
    ///
    /// Note: This does NOT update recency.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.db.contains(key)
    }

    /// Remove all entries from the cache.
    pub fn clear(&self) {
        self.db.clear();
    }

    /// All cached keys, least recently used first.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.db.keys()
    }

    /// All cached values, in the same order as [`keys`](Self::keys).
    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.db.values()
    }

    /// Key-value pairs chosen by `selector`, least recently used first.
    ///
    /// Filtering never changes recency.
    ///
    /// # Example
    /// ```
    /// use bounded_lru_cache::{Cache, Selector};
    ///
    /// let cache = Cache::with_capacity(8).unwrap();
    /// cache.add("apple", "fruit");
    /// cache.add("banana", "fruit");
    /// cache.add("carrot", "vegetable");
    ///
    /// let found = cache.filter(&Selector::regex_str("app|ban").unwrap());
    /// assert_eq!(found, vec![("apple", "fruit"), ("banana", "fruit")]);
    ///
    /// let found = cache.filter(&Selector::keys(["carrot"]));
    /// assert_eq!(found, vec![("carrot", "vegetable")]);
    /// ```
    pub fn filter(&self, selector: &Selector<K>) -> Vec<(K, V)>
    where
        K: FilterKey,
        V: Clone,
    {
        self.db.filter(selector)
    }

    /// Get the number of entries in the cache.
    pub fn len(&self) -> usize {
        self.db.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    /// Get the maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.db.capacity()
    }
}

impl<K, V> Clone for Cache<K, V> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
        }
    }
}

impl<K: Hash + Eq, V> Default for Cache<K, V> {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl<K, V> fmt::Debug for Cache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache").field("db", &self.db).finish()
    }
}
