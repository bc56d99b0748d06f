//! # Inbound Port - AdmissionPolicy
//!
//! Driving port through which the ingestion subsystem asks whether a
//! measurement may proceed.
//!
//! | Method | Caller |
//! |--------|--------|
//! | `can_process` | Ingestion, one measurement at a time |
//! | `can_process_at` | Ingestion, a batch sharing one reference instant |

use crate::domain::{AuthorizationCache, SensorStatus};
use shared_types::{RawMeasurement, Timestamp};

/// Admission decision API.
///
/// # Example
///
/// ```rust,ignore
/// use gw_01_authorization::ports::AdmissionPolicy;
///
/// fn route(policy: &dyn AdmissionPolicy, batch: &[RawMeasurement]) {
///     let tp = policy.now();
///     for m in batch {
///         match policy.can_process_at(m, tp) {
///             SensorStatus::Available => { /* admit */ }
///             SensorStatus::Unavailable => { /* drop */ }
///             SensorStatus::Unknown => { /* retry later */ }
///         }
///     }
/// }
/// ```
pub trait AdmissionPolicy: Send + Sync {
    /// Reference instant used by `can_process`.
    fn now(&self) -> Timestamp;

    /// Decide against a caller-supplied reference instant.
    fn can_process_at(&self, measurement: &RawMeasurement, tp: Timestamp) -> SensorStatus;

    /// Decide at the current instant.
    fn can_process(&self, measurement: &RawMeasurement) -> SensorStatus {
        self.can_process_at(measurement, self.now())
    }
}

impl AdmissionPolicy for AuthorizationCache {
    fn now(&self) -> Timestamp {
        AuthorizationCache::now(self)
    }

    fn can_process_at(&self, measurement: &RawMeasurement, tp: Timestamp) -> SensorStatus {
        AuthorizationCache::can_process_at(self, measurement, tp)
    }
}
