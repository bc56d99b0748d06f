//! Outbound Ports (Driven Ports)
//!
//! Durable stores the [`crate::CacheReloader`] pulls records from. The
//! cache itself never calls these; it is fed through the bulk append
//! operations.

use async_trait::async_trait;
use shared_types::{ApiKeyRecord, ObjectId, SensorRecord, UserRecord};
use std::collections::HashSet;
use uuid::Uuid;

use crate::domain::RepositoryError;

/// Sensor store.
#[async_trait]
pub trait SensorRepository: Send + Sync {
    /// One page of all sensors, in a stable order.
    async fn get_all_sensors(
        &self,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<SensorRecord>, RepositoryError>;

    async fn get_sensor_by_id(
        &self,
        id: &ObjectId,
    ) -> Result<Option<SensorRecord>, RepositoryError>;

    /// One page of the sensors whose id is in `ids`. Unknown ids are skipped.
    async fn get_range(
        &self,
        ids: &[ObjectId],
        skip: usize,
        limit: usize,
    ) -> Result<Vec<SensorRecord>, RepositoryError>;
}

/// API key store.
///
/// Every method returns only non-revoked keys.
#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    /// All keys bound to a sensor.
    async fn get_all_sensor_keys(&self) -> Result<Vec<ApiKeyRecord>, RepositoryError>;

    async fn get_keys(&self, keys: &[String]) -> Result<Vec<ApiKeyRecord>, RepositoryError>;

    async fn get_keys_by_owners(
        &self,
        owners: &HashSet<Uuid>,
    ) -> Result<Vec<ApiKeyRecord>, RepositoryError>;
}

/// Account store.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_users(&self, ids: &HashSet<Uuid>) -> Result<Vec<UserRecord>, RepositoryError>;
}
