//! Diagnostic events emitted by the cache.
//!
//! The cache never logs through a global directly. Every noteworthy event is
//! handed to a [`Diagnostics`] sink chosen at construction time, so the host
//! application decides where events go and how loud they are.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// The kind of event being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `get` was called for a key that is not cached.
    GetMiss,
    /// `update` was called for a key that is not cached; it was inserted instead.
    UpdateAbsent,
    /// `delete` was called for a key that is not cached.
    DeleteAbsent,
    /// The least-recently-used entry was dropped to make room for a new key.
    Evicted,
}

impl EventKind {
    /// Get the string representation of this event kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::GetMiss => "get_miss",
            EventKind::UpdateAbsent => "update_absent",
            EventKind::DeleteAbsent => "delete_absent",
            EventKind::Evicted => "evicted",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single diagnostic event, borrowing the key it concerns.
#[derive(Clone, Copy)]
pub struct CacheEvent<'a> {
    /// What happened.
    pub kind: EventKind,
    /// The key the event is about.
    pub key: &'a dyn fmt::Debug,
}

impl<'a> CacheEvent<'a> {
    /// Create an event of `kind` for `key`.
    pub fn new(kind: EventKind, key: &'a dyn fmt::Debug) -> Self {
        Self { kind, key }
    }
}

impl fmt::Debug for CacheEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEvent")
            .field("kind", &self.kind)
            .field("key", self.key)
            .finish()
    }
}

impl fmt::Display for CacheEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EventKind::GetMiss => write!(f, "key {:?} not found in the cache", self.key),
            EventKind::UpdateAbsent => {
                write!(f, "key {:?} not present in the cache, inserting", self.key)
            }
            EventKind::DeleteAbsent => write!(
                f,
                "key {:?} trying to delete not present in the cache",
                self.key
            ),
            EventKind::Evicted => write!(f, "key {:?} evicted as least recently used", self.key),
        }
    }
}

/// A sink for cache events.
///
/// Events are delivered after the cache lock has been released, so an
/// implementation may call back into the cache that produced the event.
pub trait Diagnostics: Send + Sync {
    /// Record a single event.
    fn record(&self, event: &CacheEvent<'_>);
}

/// Forwards events to `tracing`. This is the default sink.
///
/// Misses and evictions are routine and go out at `debug`; updates and
/// deletes of absent keys usually point at a caller bug and go out at `warn`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn record(&self, event: &CacheEvent<'_>) {
        match event.kind {
            EventKind::GetMiss | EventKind::Evicted => {
                tracing::debug!(kind = %event.kind, key = ?event.key, "{}", event);
            }
            EventKind::UpdateAbsent | EventKind::DeleteAbsent => {
                tracing::warn!(kind = %event.kind, key = ?event.key, "{}", event);
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {
    fn record(&self, _event: &CacheEvent<'_>) {}
}

/// Counts events per kind.
///
/// All counters are atomic, so one counter can be shared by several caches
/// (wrap it in an `Arc` and hand a clone to each config).
///
/// # Example
/// ```
/// use bounded_lru_cache::{Cache, CacheConfig, EventCounter};
/// use std::sync::Arc;
///
/// let counter = Arc::new(EventCounter::new());
/// let config = CacheConfig::builder()
///     .capacity(8)
///     .diagnostics(counter.clone())
///     .build()
///     .unwrap();
/// let cache: Cache<String, u32> = Cache::new(config);
///
/// assert_eq!(cache.get("missing"), None);
/// assert_eq!(counter.get_misses(), 1);
/// ```
#[derive(Debug, Default)]
pub struct EventCounter {
    get_misses: AtomicU64,
    update_absent: AtomicU64,
    delete_absent: AtomicU64,
    evictions: AtomicU64,
}

impl EventCounter {
    /// Create a new counter with every count at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `get` calls that missed.
    pub fn get_misses(&self) -> u64 {
        self.get_misses.load(Ordering::Relaxed)
    }

    /// Number of `update` calls for absent keys.
    pub fn update_absent(&self) -> u64 {
        self.update_absent.load(Ordering::Relaxed)
    }

    /// Number of `delete` calls for absent keys.
    pub fn delete_absent(&self) -> u64 {
        self.delete_absent.load(Ordering::Relaxed)
    }

    /// Number of capacity evictions.
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Count for an arbitrary event kind.
    pub fn count(&self, kind: EventKind) -> u64 {
        self.slot(kind).load(Ordering::Relaxed)
    }

    fn slot(&self, kind: EventKind) -> &AtomicU64 {
        match kind {
            EventKind::GetMiss => &self.get_misses,
            EventKind::UpdateAbsent => &self.update_absent,
            EventKind::DeleteAbsent => &self.delete_absent,
            EventKind::Evicted => &self.evictions,
        }
    }
}

impl Diagnostics for EventCounter {
    fn record(&self, event: &CacheEvent<'_>) {
        self.slot(event.kind).fetch_add(1, Ordering::Relaxed);
    }
}

impl<D: Diagnostics + ?Sized> Diagnostics for std::sync::Arc<D> {
    fn record(&self, event: &CacheEvent<'_>) {
        (**self).record(event);
    }
}
