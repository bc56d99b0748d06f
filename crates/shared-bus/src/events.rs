//! # Bus Events
//!
//! Defines the unit that flows through the bus.

use serde::{Deserialize, Serialize};
use shared_types::Timestamp;
use uuid::Uuid;

/// A drained batch of admitted measurement payloads, in push order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementBatch {
    /// Unique batch id, for correlating downstream logs.
    pub id: Uuid,
    /// Topic the batch was published on.
    pub topic: String,
    /// Serialized payloads.
    pub payloads: Vec<String>,
    /// When the bus accepted the batch.
    pub published_at: Timestamp,
}

impl MeasurementBatch {
    #[must_use]
    pub fn new(topic: impl Into<String>, payloads: Vec<String>, published_at: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic: topic.into(),
            payloads,
            published_at,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }
}
