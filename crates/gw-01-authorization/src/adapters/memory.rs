//! # In-Memory Repositories
//!
//! Repository implementations backed by plain collections. Used by tests
//! and by deployments that seed the gateway from a fixture. Each one can be
//! switched into a failing mode to simulate a store outage.

use crate::domain::RepositoryError;
use crate::ports::{ApiKeyRepository, SensorRepository, UserRepository};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{ApiKeyRecord, ObjectId, SensorRecord, UserRecord};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use uuid::Uuid;

fn outage(failing: &AtomicBool) -> Result<(), RepositoryError> {
    if failing.load(Ordering::SeqCst) {
        return Err(RepositoryError::Unavailable("simulated outage".to_string()));
    }
    Ok(())
}

// =============================================================================
// SENSORS
// =============================================================================

/// Sensors kept in insertion order, so paging is stable.
#[derive(Debug, Default)]
pub struct InMemorySensorRepository {
    sensors: RwLock<Vec<SensorRecord>>,
    failing: AtomicBool,
    page_requests: AtomicUsize,
}

impl InMemorySensorRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a sensor, keeping its original position.
    pub fn upsert(&self, sensor: SensorRecord) {
        let mut sensors = self.sensors.write();
        match sensors.iter_mut().find(|s| s.id == sensor.id) {
            Some(existing) => *existing = sensor,
            None => sensors.push(sensor),
        }
    }

    pub fn delete(&self, id: &ObjectId) {
        self.sensors.write().retain(|s| s.id != *id);
    }

    pub fn len(&self) -> usize {
        self.sensors.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.read().is_empty()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of paged queries served so far.
    pub fn page_requests(&self) -> usize {
        self.page_requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SensorRepository for InMemorySensorRepository {
    async fn get_all_sensors(
        &self,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<SensorRecord>, RepositoryError> {
        outage(&self.failing)?;
        self.page_requests.fetch_add(1, Ordering::SeqCst);

        Ok(self
            .sensors
            .read()
            .iter()
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn get_sensor_by_id(
        &self,
        id: &ObjectId,
    ) -> Result<Option<SensorRecord>, RepositoryError> {
        outage(&self.failing)?;
        Ok(self.sensors.read().iter().find(|s| s.id == *id).cloned())
    }

    async fn get_range(
        &self,
        ids: &[ObjectId],
        skip: usize,
        limit: usize,
    ) -> Result<Vec<SensorRecord>, RepositoryError> {
        outage(&self.failing)?;
        self.page_requests.fetch_add(1, Ordering::SeqCst);

        let wanted: HashSet<ObjectId> = ids.iter().copied().collect();
        Ok(self
            .sensors
            .read()
            .iter()
            .filter(|s| wanted.contains(&s.id))
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }
}

// =============================================================================
// API KEYS
// =============================================================================

#[derive(Debug, Default)]
pub struct InMemoryApiKeyRepository {
    keys: RwLock<HashMap<String, ApiKeyRecord>>,
    failing: AtomicBool,
}

impl InMemoryApiKeyRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: ApiKeyRecord) {
        self.keys.write().insert(key.key.clone(), key);
    }

    /// Mark a key revoked. Returns whether it existed.
    pub fn revoke(&self, key: &str) -> bool {
        match self.keys.write().get_mut(key) {
            Some(record) => {
                record.revoked = true;
                true
            }
            None => false,
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn select(&self, predicate: impl Fn(&ApiKeyRecord) -> bool) -> Vec<ApiKeyRecord> {
        self.keys
            .read()
            .values()
            .filter(|k| !k.revoked && predicate(k))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ApiKeyRepository for InMemoryApiKeyRepository {
    async fn get_all_sensor_keys(&self) -> Result<Vec<ApiKeyRecord>, RepositoryError> {
        outage(&self.failing)?;
        Ok(self.select(|k| k.sensor.is_some()))
    }

    async fn get_keys(&self, keys: &[String]) -> Result<Vec<ApiKeyRecord>, RepositoryError> {
        outage(&self.failing)?;
        Ok(self.select(|k| keys.contains(&k.key)))
    }

    async fn get_keys_by_owners(
        &self,
        owners: &HashSet<Uuid>,
    ) -> Result<Vec<ApiKeyRecord>, RepositoryError> {
        outage(&self.failing)?;
        Ok(self.select(|k| owners.contains(&k.owner)))
    }
}

// =============================================================================
// USERS
// =============================================================================

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, UserRecord>>,
    failing: AtomicBool,
}

impl InMemoryUserRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user: UserRecord) {
        self.users.write().insert(user.id, user);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_users(&self, ids: &HashSet<Uuid>) -> Result<Vec<UserRecord>, RepositoryError> {
        outage(&self.failing)?;
        let users = self.users.read();
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sensor(n: u8) -> SensorRecord {
        let mut bytes = [0u8; ObjectId::LEN];
        bytes[0] = n;
        SensorRecord::new(ObjectId::new(bytes), Uuid::new_v4())
    }

    #[tokio::test]
    async fn test_sensor_paging_is_stable() {
        let repo = InMemorySensorRepository::new();
        for n in 0..5 {
            repo.upsert(sensor(n));
        }

        let first = repo.get_all_sensors(0, 2).await.unwrap();
        let last = repo.get_all_sensors(4, 2).await.unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(first[0].id, sensor(0).id);
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].id, sensor(4).id);
        assert_eq!(repo.page_requests(), 2);
    }

    #[tokio::test]
    async fn test_get_range_skips_unknown_ids() {
        let repo = InMemorySensorRepository::new();
        repo.upsert(sensor(1));
        repo.upsert(sensor(2));

        let ids = [sensor(2).id, sensor(9).id];
        let found = repo.get_range(&ids, 0, 10).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, sensor(2).id);
    }

    #[tokio::test]
    async fn test_failing_repository() {
        let repo = InMemorySensorRepository::new();
        repo.set_failing(true);

        let result = repo.get_sensor_by_id(&sensor(1).id).await;
        assert!(matches!(result, Err(RepositoryError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_revoked_keys_are_filtered() {
        let repo = InMemoryApiKeyRepository::new();
        let owner = Uuid::new_v4();
        let mut bound = ApiKeyRecord::new("bound", owner);
        bound.sensor = Some(sensor(1).id);
        repo.insert(bound);
        repo.insert(ApiKeyRecord::new("unbound", owner));

        assert_eq!(repo.get_all_sensor_keys().await.unwrap().len(), 1);
        assert!(repo.revoke("bound"));
        assert!(repo.get_all_sensor_keys().await.unwrap().is_empty());

        let owners: HashSet<Uuid> = [owner].into_iter().collect();
        assert_eq!(repo.get_keys_by_owners(&owners).await.unwrap().len(), 1);
        assert_eq!(
            repo.get_keys(&["unbound".to_string()]).await.unwrap()[0].key,
            "unbound"
        );
    }

    #[tokio::test]
    async fn test_get_users_returns_known_only() {
        let repo = InMemoryUserRepository::new();
        let user = UserRecord::new(Uuid::new_v4());
        repo.insert(user.clone());

        let ids: HashSet<Uuid> = [user.id, Uuid::new_v4()].into_iter().collect();
        let users = repo.get_users(&ids).await.unwrap();

        assert_eq!(users, vec![user]);
    }
}
