//! # Timed Entry Cache
//!
//! Generic keyed store whose entries remember when they were written.
//!
//! ## Expiry Model
//!
//! Expiry is lazy. A read at time `tp` returns the value only when
//! `tp - written_at <= timeout`; stale entries stay in memory until
//! `evict_older_than` runs. Writing a key again refreshes its clock.
//!
//! ```text
//! upsert(k) @ t0 ──── lookup(k) @ t0+5m ──→ Some   (age 5m <= 6m)
//!                └─── lookup(k) @ t0+7m ──→ None   (age 7m >  6m)
//! ```
//!
//! Ages saturate at zero, so an entry written "after" the read time
//! counts as fresh.

use parking_lot::Mutex;
use shared_types::{duration_ms, SystemTimeSource, TimeSource, Timestamp};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

/// A stored value and the time it was written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheEntry<V> {
    pub value: V,
    pub timestamp: Timestamp,
}

impl<V> CacheEntry<V> {
    pub fn new(value: V, timestamp: Timestamp) -> Self {
        Self { value, timestamp }
    }

    /// Age of the entry at `tp`, zero if `tp` precedes the write.
    #[inline]
    pub fn age_at(&self, tp: Timestamp) -> u64 {
        tp.saturating_sub(self.timestamp)
    }

    #[inline]
    pub fn is_fresh(&self, tp: Timestamp, timeout_ms: u64) -> bool {
        self.age_at(tp) <= timeout_ms
    }
}

/// Thread-safe keyed cache with a per-entry write timestamp.
///
/// All operations take `&self`; one mutex guards the map, so every call
/// is atomic with respect to the others.
pub struct TimedEntryCache<K, V> {
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
    timeout: Duration,
    clock: Arc<dyn TimeSource>,
}

impl<K, V> TimedEntryCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create a cache with the given freshness window and clock.
    pub fn new(timeout: Duration, clock: Arc<dyn TimeSource>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            timeout,
            clock,
        }
    }

    /// Create a cache reading the system clock.
    pub fn with_system_clock(timeout: Duration) -> Self {
        Self::new(timeout, Arc::new(SystemTimeSource))
    }

    /// Freshness window applied by `lookup`.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Current time according to the cache clock.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Insert or replace `key`, stamping it with the current time.
    pub fn upsert(&self, key: K, value: V) {
        let now = self.clock.now();
        self.entries.lock().insert(key, CacheEntry::new(value, now));
    }

    /// Insert or replace many entries under one lock and one timestamp.
    ///
    /// Returns the number of entries written.
    pub fn upsert_many<I>(&self, items: I) -> usize
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        let mut written = 0;

        for (key, value) in items {
            entries.insert(key, CacheEntry::new(value, now));
            written += 1;
        }

        written
    }

    /// Value for `key` if present and fresh at `tp`.
    pub fn lookup<Q>(&self, key: &Q, tp: Timestamp) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let timeout_ms = duration_ms(self.timeout);
        let entries = self.entries.lock();

        entries
            .get(key)
            .filter(|entry| entry.is_fresh(tp, timeout_ms))
            .map(|entry| entry.value.clone())
    }

    /// Whether `key` would be returned by `lookup` at `tp`.
    pub fn contains<Q>(&self, key: &Q, tp: Timestamp) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let timeout_ms = duration_ms(self.timeout);
        self.entries
            .lock()
            .get(key)
            .is_some_and(|entry| entry.is_fresh(tp, timeout_ms))
    }

    /// Remove `key`. Returns whether an entry was present.
    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.lock().remove(key).is_some()
    }

    /// Drop every entry whose age at `tp` exceeds `max_age`.
    ///
    /// Returns the number of entries removed.
    pub fn evict_older_than(&self, max_age: Duration, tp: Timestamp) -> usize {
        let max_age_ms = duration_ms(max_age);
        let mut entries = self.entries.lock();
        let before = entries.len();

        entries.retain(|_, entry| entry.is_fresh(tp, max_age_ms));

        before - entries.len()
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
