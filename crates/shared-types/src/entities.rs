//! # Core Domain Entities
//!
//! Defines the records the gateway caches and the measurement it admits.
//!
//! ## Clusters
//!
//! - **Identity**: `ObjectId` (sensor document id), `Uuid` (account id)
//! - **Cached Records**: `SensorRecord`, `UserRecord`, `ApiKeyRecord`
//! - **Ingestion**: `RawMeasurement`

use crate::errors::IdentityError;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// JSON field carrying the sensor id inside a measurement payload.
pub const SENSOR_ID_FIELD: &str = "CreatedById";

// =============================================================================
// IDENTITY
// =============================================================================

/// A 12-byte document identifier, rendered as 24 lowercase hex characters.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    SerializeDisplay,
    DeserializeFromStr,
)]
pub struct ObjectId([u8; ObjectId::LEN]);

impl ObjectId {
    /// Length of the raw id in bytes.
    pub const LEN: usize = 12;

    /// Wrap raw id bytes.
    #[must_use]
    pub const fn new(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    /// Raw id bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for ObjectId {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != Self::LEN * 2 {
            return Err(IdentityError::InvalidObjectId {
                value: s.to_string(),
                reason: format!("expected {} hex characters, got {}", Self::LEN * 2, s.len()),
            });
        }

        let mut bytes = [0u8; Self::LEN];
        hex::decode_to_slice(s, &mut bytes).map_err(|e| IdentityError::InvalidObjectId {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self(bytes))
    }
}

// =============================================================================
// CACHED RECORDS
// =============================================================================

/// A sensor as cached by the authorization subsystem.
///
/// Immutable snapshot; a refresh replaces the whole record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorRecord {
    /// Sensor identity (cache key).
    pub id: ObjectId,
    /// Owning account.
    pub owner: Uuid,
    /// Sensor secret used by upstream signature checks.
    pub secret: String,
    /// Display name.
    pub name: String,
    /// Whether admitted measurements are forwarded to storage.
    pub storage_enabled: bool,
    /// Live data handlers this sensor's measurements are routed to.
    pub live_data_targets: Vec<String>,
}

impl SensorRecord {
    /// Create a record with routing defaults (storage on, no live data).
    #[must_use]
    pub fn new(id: ObjectId, owner: Uuid) -> Self {
        Self {
            id,
            owner,
            secret: String::new(),
            name: String::new(),
            storage_enabled: true,
            live_data_targets: Vec::new(),
        }
    }
}

/// An account as cached by the authorization subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Account identity (cache key).
    pub id: Uuid,
    /// Contact address, informational only.
    pub email: String,
    /// Suspended accounts stay cached but are flagged.
    pub suspended: bool,
}

impl UserRecord {
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            email: String::new(),
            suspended: false,
        }
    }
}

/// A sensor API key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    /// The key string itself (cache key).
    pub key: String,
    /// Account that issued the key.
    pub owner: Uuid,
    /// Sensor the key is bound to, if any.
    pub sensor: Option<ObjectId>,
    /// Revoked keys must never be cached.
    pub revoked: bool,
}

impl ApiKeyRecord {
    #[must_use]
    pub fn new(key: impl Into<String>, owner: Uuid) -> Self {
        Self {
            key: key.into(),
            owner,
            sensor: None,
            revoked: false,
        }
    }
}

// =============================================================================
// INGESTION
// =============================================================================

/// An incoming measurement: opaque payload plus the sensor it claims to be from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMeasurement {
    /// Sensor identity used as the cache lookup key.
    pub sensor_id: ObjectId,
    /// Serialized payload, forwarded untouched once admitted.
    pub payload: String,
}

impl RawMeasurement {
    #[must_use]
    pub fn new(sensor_id: ObjectId, payload: impl Into<String>) -> Self {
        Self {
            sensor_id,
            payload: payload.into(),
        }
    }

    /// Parse a JSON payload, extracting the sensor id from [`SENSOR_ID_FIELD`].
    ///
    /// # Errors
    ///
    /// - `IdentityError::MalformedPayload` - payload is not valid JSON
    /// - `IdentityError::MissingSensorId` - no string sensor id field
    /// - `IdentityError::InvalidObjectId` - sensor id is not a valid id
    pub fn from_json(payload: impl Into<String>) -> Result<Self, IdentityError> {
        let payload = payload.into();
        let value: serde_json::Value = serde_json::from_str(&payload)
            .map_err(|e| IdentityError::MalformedPayload(e.to_string()))?;

        let sensor_id = value
            .get(SENSOR_ID_FIELD)
            .and_then(serde_json::Value::as_str)
            .ok_or(IdentityError::MissingSensorId)?
            .parse()?;

        Ok(Self { sensor_id, payload })
    }
}
