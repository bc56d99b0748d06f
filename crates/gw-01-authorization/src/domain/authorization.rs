//! # Authorization Cache
//!
//! The single decision point for "may this measurement proceed".
//!
//! Three [`TimedEntryCache`]s (sensors, users, API keys) are fed by an
//! external bulk refresher. A separate blacklist denies sensors outright
//! and carries no TTL.
//!
//! ## Decision
//!
//! ```text
//! can_process(m)
//!   ├── blacklisted(m.sensor_id)        → Unavailable
//!   ├── sensor missing or stale at tp   → Unknown
//!   └── otherwise                       → Available
//! ```
//!
//! The decision is recomputed on every call. There is no atomicity across
//! the three caches and the blacklist: a call may observe a partially
//! refreshed world.

use super::config::AuthorizationConfig;
use super::timed_cache::TimedEntryCache;
use parking_lot::RwLock;
use sensate_telemetry::metrics::{CACHED_SENSORS, CACHE_ENTRIES_EVICTED};
use serde::{Deserialize, Serialize};
use shared_types::{
    ApiKeyRecord, ObjectId, RawMeasurement, SensorRecord, SystemTimeSource, TimeSource, Timestamp,
    UserRecord,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace};
use uuid::Uuid;

/// Outcome of an admission decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorStatus {
    /// Sensor known and fresh: admit.
    Available,
    /// Sensor blacklisted: reject.
    Unavailable,
    /// Sensor not cached yet or stale: hold and retry.
    Unknown,
}

/// Entry counts of an [`AuthorizationCache`], stale entries included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub sensors: usize,
    pub users: usize,
    pub keys: usize,
    pub blacklisted: usize,
}

/// Sensor, user and API key caches plus the sensor blacklist.
pub struct AuthorizationCache {
    sensors: TimedEntryCache<ObjectId, SensorRecord>,
    users: TimedEntryCache<Uuid, UserRecord>,
    keys: TimedEntryCache<String, ApiKeyRecord>,
    blacklist: RwLock<HashSet<ObjectId>>,
    config: AuthorizationConfig,
    clock: Arc<dyn TimeSource>,
}

impl AuthorizationCache {
    /// Create a cache reading the system clock.
    pub fn new(config: AuthorizationConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemTimeSource))
    }

    /// Create a cache with an injected clock.
    pub fn with_clock(config: AuthorizationConfig, clock: Arc<dyn TimeSource>) -> Self {
        Self {
            sensors: TimedEntryCache::new(config.timeout, clock.clone()),
            users: TimedEntryCache::new(config.timeout, clock.clone()),
            keys: TimedEntryCache::new(config.timeout, clock.clone()),
            blacklist: RwLock::new(HashSet::new()),
            config,
            clock,
        }
    }

    pub fn config(&self) -> &AuthorizationConfig {
        &self.config
    }

    /// Current reference instant.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    // =========================================================================
    // BULK REFRESH
    // =========================================================================

    /// Upsert sensors keyed by id. Returns the number written.
    pub fn append_sensors<I>(&self, sensors: I) -> usize
    where
        I: IntoIterator<Item = SensorRecord>,
    {
        let count = self
            .sensors
            .upsert_many(sensors.into_iter().map(|sensor| (sensor.id, sensor)));

        CACHED_SENSORS.set(self.sensors.len() as f64);
        debug!(count, "Sensors appended to cache");
        count
    }

    /// Upsert users keyed by id. Suspended users are cached as they are.
    pub fn append_users<I>(&self, users: I) -> usize
    where
        I: IntoIterator<Item = UserRecord>,
    {
        let count = self
            .users
            .upsert_many(users.into_iter().map(|user| (user.id, user)));

        debug!(count, "Users appended to cache");
        count
    }

    /// Upsert API keys keyed by key string. Revoked keys are dropped.
    pub fn append_keys<I>(&self, keys: I) -> usize
    where
        I: IntoIterator<Item = ApiKeyRecord>,
    {
        let mut revoked = 0usize;
        let valid = keys.into_iter().filter(|key| {
            if key.revoked {
                revoked += 1;
            }
            !key.revoked
        });
        let count = self.keys.upsert_many(valid.map(|key| (key.key.clone(), key)));

        if revoked > 0 {
            debug!(revoked, "Revoked API keys skipped");
        }
        debug!(count, "API keys appended to cache");
        count
    }

    // =========================================================================
    // BLACKLIST
    // =========================================================================

    /// Deny a sensor. Idempotent.
    pub fn append_blacklist(&self, id: ObjectId) {
        if self.blacklist.write().insert(id) {
            info!(sensor_id = %id, "Sensor blacklisted");
        }
    }

    /// Deny many sensors. Returns how many were newly added.
    pub fn append_blacklist_many<I>(&self, ids: I) -> usize
    where
        I: IntoIterator<Item = ObjectId>,
    {
        let mut blacklist = self.blacklist.write();
        let added = ids.into_iter().filter(|id| blacklist.insert(*id)).count();
        drop(blacklist);

        if added > 0 {
            info!(added, "Sensors blacklisted");
        }
        added
    }

    /// Lift the denial of a sensor. Returns whether it was blacklisted.
    pub fn remove_from_blacklist(&self, id: &ObjectId) -> bool {
        let removed = self.blacklist.write().remove(id);
        if removed {
            info!(sensor_id = %id, "Sensor removed from blacklist");
        }
        removed
    }

    pub fn clear_blacklist(&self) {
        let mut blacklist = self.blacklist.write();
        let count = blacklist.len();
        blacklist.clear();
        drop(blacklist);

        info!(count, "Blacklist cleared");
    }

    /// Set membership only; the blacklist has no TTL.
    pub fn is_blacklisted(&self, id: &ObjectId) -> bool {
        self.blacklist.read().contains(id)
    }

    // =========================================================================
    // FLUSH & CLEANUP
    // =========================================================================

    pub fn flush_sensor(&self, id: &ObjectId) {
        if self.sensors.remove(id) {
            debug!(sensor_id = %id, "Sensor flushed from cache");
        }
    }

    pub fn flush_user(&self, id: &Uuid) {
        if self.users.remove(id) {
            debug!(user_id = %id, "User flushed from cache");
        }
    }

    pub fn flush_key(&self, key: &str) {
        if self.keys.remove(key) {
            debug!("API key flushed from cache");
        }
    }

    /// Sweep all three caches with the configured timeout.
    pub fn cleanup(&self) -> usize {
        self.cleanup_for(self.config.timeout)
    }

    /// Sweep all three caches, dropping entries older than `max_age`.
    ///
    /// Returns the total number of entries removed.
    pub fn cleanup_for(&self, max_age: Duration) -> usize {
        let tp = self.now();
        let sensors = self.sensors.evict_older_than(max_age, tp);
        let users = self.users.evict_older_than(max_age, tp);
        let keys = self.keys.evict_older_than(max_age, tp);
        let removed = sensors + users + keys;

        if removed > 0 {
            CACHE_ENTRIES_EVICTED.inc_by(removed as f64);
            CACHED_SENSORS.set(self.sensors.len() as f64);
            info!(sensors, users, keys, "Stale cache entries evicted");
        }
        removed
    }

    /// Empty the three record caches. The blacklist is kept.
    pub fn clear(&self) {
        self.sensors.clear();
        self.users.clear();
        self.keys.clear();

        CACHED_SENSORS.set(0.0);
        info!("Authorization caches cleared");
    }

    // =========================================================================
    // LOOKUPS
    // =========================================================================

    pub fn get_sensor(&self, id: &ObjectId, tp: Timestamp) -> Option<SensorRecord> {
        self.sensors.lookup(id, tp)
    }

    pub fn get_user(&self, id: &Uuid, tp: Timestamp) -> Option<UserRecord> {
        self.users.lookup(id, tp)
    }

    pub fn get_key(&self, key: &str, tp: Timestamp) -> Option<ApiKeyRecord> {
        self.keys.lookup(key, tp)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            sensors: self.sensors.len(),
            users: self.users.len(),
            keys: self.keys.len(),
            blacklisted: self.blacklist.read().len(),
        }
    }

    // =========================================================================
    // ADMISSION
    // =========================================================================

    /// Decide admission at the current instant.
    pub fn can_process(&self, measurement: &RawMeasurement) -> SensorStatus {
        self.can_process_at(measurement, self.now())
    }

    /// Decide admission against a caller-supplied reference instant.
    pub fn can_process_at(&self, measurement: &RawMeasurement, tp: Timestamp) -> SensorStatus {
        let id = &measurement.sensor_id;

        let status = if self.is_blacklisted(id) {
            SensorStatus::Unavailable
        } else if self.sensors.contains(id, tp) {
            SensorStatus::Available
        } else {
            SensorStatus::Unknown
        };

        trace!(sensor_id = %id, ?status, "Admission decided");
        status
    }
}
