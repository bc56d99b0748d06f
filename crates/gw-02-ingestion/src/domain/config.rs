//! Ingestion subsystem configuration.

use serde::{Deserialize, Serialize};
use std::env;

/// Default bound of a [`crate::MeasurementBuffer`].
pub const DEFAULT_BUFFER_CAPACITY: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Maximum payloads held between drains. Pushes beyond it are refused.
    pub capacity: usize,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

impl IngestionConfig {
    /// Load from the environment.
    ///
    /// - `SG_BUFFER_CAPACITY`: buffer bound (default: 10000)
    pub fn from_env() -> Self {
        Self {
            capacity: env::var("SG_BUFFER_CAPACITY")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_BUFFER_CAPACITY),
        }
    }
}
