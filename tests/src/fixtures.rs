//! Gateway assembly shared by the integration tests and benchmarks.

use gw_01_authorization::adapters::{
    InMemoryApiKeyRepository, InMemorySensorRepository, InMemoryUserRepository,
};
use gw_01_authorization::{
    AuthorizationCache, AuthorizationConfig, CacheReloader, DataReloadSettings,
};
use gw_02_ingestion::{AdmissionService, IngestionConfig, MeasurementBuffer};
use shared_bus::MeasurementPublisher;
use shared_types::{
    ApiKeyRecord, ManualTimeSource, ObjectId, RawMeasurement, SensorRecord, UserRecord,
};
use std::sync::Arc;
use uuid::Uuid;

/// Reference start instant of every fixture clock.
pub const T0: u64 = 1_700_000_000_000;

/// A fully wired gateway over in-memory repositories and a manual clock.
pub struct Gateway {
    pub clock: Arc<ManualTimeSource>,
    pub cache: Arc<AuthorizationCache>,
    pub sensors: Arc<InMemorySensorRepository>,
    pub keys: Arc<InMemoryApiKeyRepository>,
    pub users: Arc<InMemoryUserRepository>,
    pub reloader: CacheReloader,
    pub buffer: Arc<MeasurementBuffer>,
    pub service: AdmissionService,
}

impl Gateway {
    pub fn new(publisher: Arc<dyn MeasurementPublisher>, capacity: usize) -> Self {
        let clock = Arc::new(ManualTimeSource::new(T0));
        let cache = Arc::new(AuthorizationCache::with_clock(
            AuthorizationConfig::default(),
            clock.clone(),
        ));
        let sensors = Arc::new(InMemorySensorRepository::new());
        let keys = Arc::new(InMemoryApiKeyRepository::new());
        let users = Arc::new(InMemoryUserRepository::new());
        let reloader = CacheReloader::new(
            cache.clone(),
            sensors.clone(),
            keys.clone(),
            users.clone(),
            DataReloadSettings::default(),
        );
        let buffer = Arc::new(MeasurementBuffer::new(
            &IngestionConfig { capacity },
            publisher,
        ));
        let service = AdmissionService::new(cache.clone(), buffer.clone());

        Self {
            clock,
            cache,
            sensors,
            keys,
            users,
            reloader,
            buffer,
            service,
        }
    }

    /// Register a sensor, its owner and a bound key in the repositories.
    pub fn register_sensor(&self, n: u32) -> ObjectId {
        let id = sensor_id(n);
        let owner = Uuid::new_v4();
        self.users.insert(UserRecord::new(owner));
        self.sensors.upsert(SensorRecord::new(id, owner));

        let mut key = ApiKeyRecord::new(format!("key-{id}"), owner);
        key.sensor = Some(id);
        self.keys.insert(key);
        id
    }
}

/// Deterministic sensor id derived from `n`.
pub fn sensor_id(n: u32) -> ObjectId {
    let mut bytes = [0u8; ObjectId::LEN];
    bytes[ObjectId::LEN - 4..].copy_from_slice(&n.to_be_bytes());
    ObjectId::new(bytes)
}

/// JSON measurement as a sensor would send it.
pub fn measurement(id: ObjectId, seq: usize) -> RawMeasurement {
    RawMeasurement::new(
        id,
        format!(r#"{{"CreatedById":"{id}","seq":{seq},"value":21.5}}"#),
    )
}
