//! Internal storage implementation for the cache.
//!
//! An `IndexMap` keeps entries in recency order: the first entry is the least
//! recently used, the last entry the most recently used. A single mutex guards
//! the map for reads and writes alike, since even `get` reorders it.
//!
//! Locking discipline: only the public methods of [`Db`] take the lock. The
//! private helpers receive the already-locked map, so nothing ever needs to
//! re-acquire it. Diagnostic events are emitted after the guard is dropped.

use indexmap::IndexMap;
use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::CacheConfig;
use crate::diagnostics::{CacheEvent, Diagnostics, EventKind};
use crate::filter::{self, FilterKey, Selector};

/// Thread-safe ordered store with LRU eviction.
///
/// This is the internal implementation; users should use `Cache` instead.
pub struct Db<K, V> {
    /// The entries, head = least recently used.
    entries: Mutex<IndexMap<K, V>>,

    /// Maximum number of entries.
    capacity: NonZeroUsize,

    /// Receives miss and eviction events.
    diagnostics: Arc<dyn Diagnostics>,
}

impl<K, V> Db<K, V>
where
    K: Hash + Eq,
{
    /// Create a new store with the given configuration.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: Mutex::new(IndexMap::new()),
            capacity: config.capacity,
            diagnostics: config.diagnostics,
        }
    }

    /// Insert or overwrite `key`, leaving it most recently used.
    ///
    /// A new key arriving at capacity evicts the least recently used entry.
    pub fn add(&self, key: K, value: V)
    where
        K: fmt::Debug,
    {
        let evicted = {
            let mut entries = self.lock();
            self.insert_most_recent(&mut entries, key, value)
        };

        if let Some((key, _)) = evicted {
            self.report(EventKind::Evicted, &key);
        }
    }

    /// Get a copy of the value for `key`, marking it most recently used.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
        V: Clone,
    {
        let found = {
            let mut entries = self.lock();
            Self::touch(&mut entries, key).map(|idx| entries[idx].clone())
        };

        if found.is_none() {
            self.report(EventKind::GetMiss, &key);
        }
        found
    }

    /// Get a copy of the value for `key` without changing recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.lock().get(key).cloned()
    }

    /// Replace the value for `key` and mark it most recently used.
    ///
    /// An absent key is reported and then inserted, with the same capacity
    /// check as [`add`](Self::add).
    pub fn update(&self, key: K, value: V)
    where
        K: fmt::Debug,
    {
        let mut absent = None;
        let evicted = {
            let mut entries = self.lock();
            if !entries.contains_key(&key) {
                absent = Some(format!("{:?}", key));
            }
            self.insert_most_recent(&mut entries, key, value)
        };

        if let Some(key) = absent {
            self.report(EventKind::UpdateAbsent, &DebugStr(&key));
        }
        if let Some((key, _)) = evicted {
            self.report(EventKind::Evicted, &key);
        }
    }

    /// Remove `key`. Returns the number of entries removed (0 or 1).
    pub fn delete<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
    {
        let removed = self.lock().shift_remove(key).is_some();
        if removed {
            1
        } else {
            self.report(EventKind::DeleteAbsent, &key);
            0
        }
    }

    /// Check if `key` is cached. Does not change recency.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lock().contains_key(key)
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// All keys, least recently used first.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.lock().keys().cloned().collect()
    }

    /// All values, in the same order as [`keys`](Self::keys).
    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.lock().values().cloned().collect()
    }

    /// Pairs chosen by `selector`, least recently used first.
    pub fn filter(&self, selector: &Selector<K>) -> Vec<(K, V)>
    where
        K: FilterKey,
        V: Clone,
    {
        let entries = self.lock();
        filter::select(&entries, selector)
    }

    /// Get the number of entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    // Private helper methods. All of them assume the lock is held.

    /// Acquire the lock.
    ///
    /// A panic in another thread while it held the guard poisons the mutex.
    /// No operation leaves the map half-written, so the guard is recovered
    /// rather than failing every later caller.
    fn lock(&self) -> MutexGuard<'_, IndexMap<K, V>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("cache lock was poisoned by a panicking thread, recovering");
            PoisonError::into_inner(poisoned)
        })
    }

    /// Move `key` to the tail, returning its new index.
    fn touch<Q>(entries: &mut IndexMap<K, V>, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = entries.get_index_of(key)?;
        let last = entries.len() - 1;
        entries.move_index(idx, last);
        Some(last)
    }

    /// Insert `key` at the tail, evicting the head first if a new key would
    /// exceed capacity. Returns the evicted pair, if any.
    fn insert_most_recent(
        &self,
        entries: &mut IndexMap<K, V>,
        key: K,
        value: V,
    ) -> Option<(K, V)> {
        if let Some(last) = Self::touch(entries, &key) {
            entries[last] = value;
            return None;
        }

        let evicted = self.evict_if_full(entries);
        entries.insert(key, value);
        evicted
    }

    /// Evict the least recently used entry if the map is at capacity.
    fn evict_if_full(&self, entries: &mut IndexMap<K, V>) -> Option<(K, V)> {
        if entries.len() >= self.capacity.get() {
            entries.shift_remove_index(0)
        } else {
            None
        }
    }

    fn report(&self, kind: EventKind, key: &dyn fmt::Debug) {
        self.diagnostics.record(&CacheEvent::new(kind, key));
    }
}

/// Renders a preformatted key without extra quoting.
struct DebugStr<'a>(&'a str);

impl fmt::Debug for DebugStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl<K, V> fmt::Debug for Db<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self
            .entries
            .lock()
            .map(|entries| entries.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len());
        f.debug_struct("Db")
            .field("len", &len)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::EventCounter;

    fn db_with(capacity: usize) -> (Db<String, String>, Arc<EventCounter>) {
        let counter = Arc::new(EventCounter::new());
        let config = CacheConfig::builder()
            .capacity(capacity)
            .diagnostics(counter.clone())
            .build()
            .unwrap();
        (Db::new(config), counter)
    }

    fn s(v: &str) -> String {
        v.to_string()
    }

    #[test]
    fn test_basic_add_get() {
        let (db, _) = db_with(3);

        db.add(s("key1"), s("value1"));
        db.add(s("key2"), s("value2"));

        assert_eq!(db.get("key1"), Some(s("value1")));
        assert_eq!(db.get("key2"), Some(s("value2")));
        assert_eq!(db.get("key3"), None);
    }

    #[test]
    fn test_get_miss_is_reported() {
        let (db, counter) = db_with(3);
        assert_eq!(db.get("missing"), None);
        assert_eq!(counter.get_misses(), 1);
    }

    #[test]
    fn test_get_moves_to_tail() {
        let (db, _) = db_with(3);
        db.add(s("a"), s("1"));
        db.add(s("b"), s("2"));
        db.add(s("c"), s("3"));

        let _ = db.get("a");
        assert_eq!(db.keys(), vec![s("b"), s("c"), s("a")]);
    }

    #[test]
    fn test_peek_and_contains_do_not_reorder() {
        let (db, counter) = db_with(3);
        db.add(s("a"), s("1"));
        db.add(s("b"), s("2"));

        assert_eq!(db.peek("a"), Some(s("1")));
        assert!(db.contains("a"));
        assert_eq!(db.peek("zzz"), None);
        assert_eq!(db.keys(), vec![s("a"), s("b")]);
        assert_eq!(counter.get_misses(), 0);
    }

    #[test]
    fn test_add_existing_refreshes_recency() {
        let (db, counter) = db_with(3);
        db.add(s("a"), s("1"));
        db.add(s("b"), s("2"));
        db.add(s("c"), s("3"));

        db.add(s("a"), s("updated"));
        assert_eq!(db.len(), 3);
        assert_eq!(db.keys(), vec![s("b"), s("c"), s("a")]);
        assert_eq!(db.peek("a"), Some(s("updated")));
        assert_eq!(counter.evictions(), 0);
    }

    #[test]
    fn test_capacity_eviction() {
        let (db, counter) = db_with(3);

        db.add(s("key1"), s("value1"));
        db.add(s("key2"), s("value2"));
        db.add(s("key3"), s("value3"));
        assert_eq!(db.len(), 3);

        // This should evict key1 (oldest)
        db.add(s("key4"), s("value4"));
        assert_eq!(db.len(), 3);
        assert!(!db.contains("key1"));
        assert!(db.contains("key4"));
        assert_eq!(counter.evictions(), 1);
    }

    #[test]
    fn test_lru_eviction_order() {
        let (db, _) = db_with(3);

        db.add(s("key1"), s("value1"));
        db.add(s("key2"), s("value2"));
        db.add(s("key3"), s("value3"));

        // Access key1, making it recently used
        let _ = db.get("key1");

        // Now key2 should be the LRU
        db.add(s("key4"), s("value4"));

        assert!(db.contains("key1"));
        assert!(!db.contains("key2"));
        assert!(db.contains("key3"));
        assert!(db.contains("key4"));
    }

    #[test]
    fn test_update_existing() {
        let (db, counter) = db_with(3);
        db.add(s("key1"), s("value1"));
        db.add(s("key2"), s("value2"));

        db.update(s("key1"), s("new_value"));

        assert_eq!(db.peek("key1"), Some(s("new_value")));
        assert_eq!(db.keys(), vec![s("key2"), s("key1")]);
        assert_eq!(counter.update_absent(), 0);
    }

    #[test]
    fn test_update_absent_inserts_and_reports() {
        let (db, counter) = db_with(3);

        db.update(s("key1"), s("value1"));

        assert_eq!(db.peek("key1"), Some(s("value1")));
        assert_eq!(counter.update_absent(), 1);
    }

    #[test]
    fn test_update_absent_respects_capacity() {
        let (db, counter) = db_with(2);
        db.add(s("a"), s("1"));
        db.add(s("b"), s("2"));

        db.update(s("c"), s("3"));

        assert_eq!(db.len(), 2);
        assert!(!db.contains("a"));
        assert_eq!(counter.evictions(), 1);
    }

    #[test]
    fn test_delete() {
        let (db, counter) = db_with(3);

        db.add(s("key1"), s("value1"));
        assert_eq!(db.delete("key1"), 1);
        assert!(!db.contains("key1"));
        assert_eq!(db.delete("key1"), 0);
        assert_eq!(counter.delete_absent(), 1);
    }

    #[test]
    fn test_clear_keys_values() {
        let (db, _) = db_with(3);

        db.add(s("key1"), s("value1"));
        db.add(s("key2"), s("value2"));
        assert_eq!(db.keys(), vec![s("key1"), s("key2")]);
        assert_eq!(db.values(), vec![s("value1"), s("value2")]);

        db.clear();
        assert!(db.is_empty());
        assert!(db.keys().is_empty());
        assert!(db.values().is_empty());
    }

    #[test]
    fn test_filter_does_not_reorder() {
        let (db, _) = db_with(3);
        db.add(s("key1"), s("value1"));
        db.add(s("key2"), s("value2"));

        let result = db.filter(&Selector::glob("key*").unwrap());
        assert_eq!(result.len(), 2);
        assert_eq!(db.keys(), vec![s("key1"), s("key2")]);
    }

    #[test]
    fn test_capacity_one() {
        let (db, _) = db_with(1);
        db.add(s("a"), s("1"));
        db.add(s("b"), s("2"));
        assert_eq!(db.keys(), vec![s("b")]);
        assert_eq!(db.capacity(), 1);
    }

    #[test]
    fn test_sink_may_reenter_cache() {
        struct Reentrant(std::sync::OnceLock<Arc<Db<String, String>>>);

        impl Diagnostics for Reentrant {
            fn record(&self, _event: &CacheEvent<'_>) {
                if let Some(db) = self.0.get() {
                    // Would deadlock if events were emitted under the lock.
                    let _ = db.len();
                }
            }
        }

        let sink = Arc::new(Reentrant(std::sync::OnceLock::new()));
        let config = CacheConfig::builder()
            .capacity(2)
            .diagnostics(sink.clone())
            .build()
            .unwrap();
        let db = Arc::new(Db::new(config));
        let _ = sink.0.set(Arc::clone(&db));

        assert_eq!(db.get("missing"), None);
        assert_eq!(db.delete("missing"), 0);
        db.update(s("k"), s("v"));
    }

    #[test]
    fn test_recovers_from_poisoned_lock() {
        let (db, _) = db_with(3);
        let db = Arc::new(db);
        db.add(s("key1"), s("value1"));

        let poisoner = Arc::clone(&db);
        let result = std::thread::spawn(move || {
            let _guard = poisoner.lock();
            panic!("poison the lock");
        })
        .join();
        assert!(result.is_err());

        assert_eq!(db.get("key1"), Some(s("value1")));
        db.add(s("key2"), s("value2"));
        assert_eq!(db.len(), 2);
    }
}
