//! # Cache Reloader
//!
//! Bulk refresher feeding the [`AuthorizationCache`] from the repositories.
//!
//! ## Flow
//!
//! ```text
//! reload_all():
//!   sensors  ← SensorRepository::get_all_sensors (paged until a short page)
//!   users    ← UserRepository::get_users(owners of sensors)
//!   keys     ← ApiKeyRepository::get_all_sensor_keys
//!   ──────── all fetched, nothing written yet ────────
//!   cache.append_sensors / append_users / append_keys
//! ```
//!
//! Every fetch completes before the first append, so a repository error
//! leaves the cache exactly as it was. Scheduling belongs to the caller:
//! poll [`CacheReloader::is_reload_due`] and [`CacheReloader::is_sweep_due`]
//! and run the matching operation. The due instants follow the intervals in
//! [`DataReloadSettings`].

use crate::domain::{AuthorizationCache, DataReloadSettings, ReloadError};
use crate::ports::{ApiKeyRepository, SensorRepository, UserRepository};
use parking_lot::Mutex;
use sensate_telemetry::metrics::CACHE_RELOADS;
use serde::{Deserialize, Serialize};
use shared_types::{duration_ms, ObjectId, SensorRecord, Timestamp};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Counts of one reload pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReloadSummary {
    pub sensors: usize,
    pub users: usize,
    pub keys: usize,
    /// Requested sensors the repository no longer knows; flushed from cache.
    pub flushed: usize,
}

/// Pulls records from the repositories into the cache.
///
/// Shares the cache and repositories by `Arc`; it never shuts them down.
pub struct CacheReloader {
    cache: Arc<AuthorizationCache>,
    sensors: Arc<dyn SensorRepository>,
    keys: Arc<dyn ApiKeyRepository>,
    users: Arc<dyn UserRepository>,
    settings: DataReloadSettings,
    /// Instant at which the next full reload becomes due.
    next_reload: Mutex<Timestamp>,
    next_sweep: Mutex<Timestamp>,
}

impl CacheReloader {
    /// The first reload becomes due `start_delay` after construction, the
    /// first sweep one `timeout_scan_interval` after it.
    pub fn new(
        cache: Arc<AuthorizationCache>,
        sensors: Arc<dyn SensorRepository>,
        keys: Arc<dyn ApiKeyRepository>,
        users: Arc<dyn UserRepository>,
        settings: DataReloadSettings,
    ) -> Self {
        let now = cache.now();
        let first_reload = now.saturating_add(duration_ms(settings.start_delay));
        let first_sweep = now.saturating_add(duration_ms(settings.timeout_scan_interval));

        Self {
            cache,
            sensors,
            keys,
            users,
            settings,
            next_reload: Mutex::new(first_reload),
            next_sweep: Mutex::new(first_sweep),
        }
    }

    pub fn cache(&self) -> &Arc<AuthorizationCache> {
        &self.cache
    }

    pub fn settings(&self) -> &DataReloadSettings {
        &self.settings
    }

    // =========================================================================
    // SCHEDULING
    // =========================================================================

    /// Whether a full reload is due at `now`.
    pub fn is_reload_due(&self, now: Timestamp) -> bool {
        now >= *self.next_reload.lock()
    }

    pub fn next_reload_at(&self) -> Timestamp {
        *self.next_reload.lock()
    }

    fn schedule_next(&self) {
        let next = self
            .cache
            .now()
            .saturating_add(duration_ms(self.settings.data_reload_interval));
        *self.next_reload.lock() = next;
    }

    /// Whether a stale-entry sweep is due at `now`.
    pub fn is_sweep_due(&self, now: Timestamp) -> bool {
        now >= *self.next_sweep.lock()
    }

    pub fn next_sweep_at(&self) -> Timestamp {
        *self.next_sweep.lock()
    }

    /// Evict stale entries with the cache's configured timeout and schedule
    /// the next sweep.
    pub fn sweep(&self) -> usize {
        let removed = self.cache.cleanup();
        let next = self
            .cache
            .now()
            .saturating_add(duration_ms(self.settings.timeout_scan_interval));
        *self.next_sweep.lock() = next;

        debug!(removed, next_sweep = next, "Timeout sweep finished");
        removed
    }

    // =========================================================================
    // RELOADS
    // =========================================================================

    /// Reload every sensor, their owners and all sensor keys.
    ///
    /// # Errors
    ///
    /// Any repository failure aborts the pass before the cache is touched.
    pub async fn reload_all(&self) -> Result<ReloadSummary, ReloadError> {
        let started = Instant::now();
        let page_size = self.settings.effective_page_size();

        let mut sensors = Vec::new();
        let mut skip = 0;
        loop {
            let page = self
                .sensors
                .get_all_sensors(skip, page_size)
                .await
                .map_err(|e| self.failed(ReloadError::Sensors(e)))?;
            let fetched = page.len();
            sensors.extend(page);

            if fetched < page_size {
                break;
            }
            skip += fetched;
        }

        let owners = owners_of(&sensors);
        let users = self
            .users
            .get_users(&owners)
            .await
            .map_err(|e| self.failed(ReloadError::Users(e)))?;
        let keys = self
            .keys
            .get_all_sensor_keys()
            .await
            .map_err(|e| self.failed(ReloadError::Keys(e)))?;

        let summary = ReloadSummary {
            sensors: self.cache.append_sensors(sensors),
            users: self.cache.append_users(users),
            keys: self.cache.append_keys(keys),
            flushed: 0,
        };

        self.schedule_next();
        CACHE_RELOADS.inc();
        info!(
            sensors = summary.sensors,
            users = summary.users,
            keys = summary.keys,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Authorization cache reloaded"
        );

        Ok(summary)
    }

    /// Reload a set of sensors with their owners and the owners' keys.
    ///
    /// Requested ids the repository does not return are flushed from the
    /// cache. Does not move the full-reload schedule.
    pub async fn reload_sensors(&self, ids: &[ObjectId]) -> Result<ReloadSummary, ReloadError> {
        if ids.is_empty() {
            return Ok(ReloadSummary::default());
        }

        let page_size = self.settings.effective_page_size();
        let mut sensors = Vec::new();
        let mut skip = 0;
        loop {
            let page = self
                .sensors
                .get_range(ids, skip, page_size)
                .await
                .map_err(|e| self.failed(ReloadError::Sensors(e)))?;
            let fetched = page.len();
            sensors.extend(page);

            if fetched < page_size {
                break;
            }
            skip += fetched;
        }

        let owners = owners_of(&sensors);
        let users = self
            .users
            .get_users(&owners)
            .await
            .map_err(|e| self.failed(ReloadError::Users(e)))?;
        let keys = self
            .keys
            .get_keys_by_owners(&owners)
            .await
            .map_err(|e| self.failed(ReloadError::Keys(e)))?;

        let found: HashSet<ObjectId> = sensors.iter().map(|s| s.id).collect();
        let missing: Vec<&ObjectId> = ids.iter().filter(|id| !found.contains(*id)).collect();
        for id in &missing {
            self.cache.flush_sensor(id);
        }

        let summary = ReloadSummary {
            sensors: self.cache.append_sensors(sensors),
            users: self.cache.append_users(users),
            keys: self.cache.append_keys(keys),
            flushed: missing.len(),
        };

        debug!(
            requested = ids.len(),
            sensors = summary.sensors,
            flushed = summary.flushed,
            "Sensors reloaded"
        );
        Ok(summary)
    }

    /// Reload one sensor. Returns whether it still exists.
    pub async fn reload_sensor(&self, id: &ObjectId) -> Result<bool, ReloadError> {
        let sensor = self
            .sensors
            .get_sensor_by_id(id)
            .await
            .map_err(|e| self.failed(ReloadError::Sensors(e)))?;

        match sensor {
            Some(sensor) => {
                let owners: HashSet<Uuid> = [sensor.owner].into_iter().collect();
                let users = self
                    .users
                    .get_users(&owners)
                    .await
                    .map_err(|e| self.failed(ReloadError::Users(e)))?;

                self.cache.append_sensors([sensor]);
                self.cache.append_users(users);
                Ok(true)
            }
            None => {
                self.cache.flush_sensor(id);
                Ok(false)
            }
        }
    }

    fn failed(&self, err: ReloadError) -> ReloadError {
        warn!(error = %err, "Cache reload aborted, cache left unchanged");
        err
    }
}

fn owners_of(sensors: &[SensorRecord]) -> HashSet<Uuid> {
    sensors.iter().map(|s| s.owner).collect()
}
