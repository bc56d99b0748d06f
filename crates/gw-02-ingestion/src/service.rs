//! # Admission Service
//!
//! Hot path of the gateway: decide every incoming measurement against the
//! authorization cache and buffer the admitted ones.
//!
//! | `SensorStatus` | Action | `Admission` |
//! |----------------|--------|-------------|
//! | `Available` | push payload | `Admitted`, or `Overflow` when full |
//! | `Unavailable` | drop | `Rejected` |
//! | `Unknown` | hand back | `Deferred` |
//!
//! The service never touches a repository; `Unknown` sensors are resolved by
//! the cache reloader and retried by the caller.

use crate::domain::{Admission, BatchOutcome, BufferError, MeasurementBuffer};
use crate::ports::{AdmissionPolicy, IngestionApi, SensorStatus};
use sensate_telemetry::metrics::{
    MEASUREMENTS_ADMITTED, MEASUREMENTS_DEFERRED, MEASUREMENTS_REJECTED,
};
use shared_types::{RawMeasurement, Timestamp};
use std::sync::Arc;
use tracing::{debug, trace};

/// Admission decision plus buffering.
///
/// Shares the policy and the buffer by `Arc`; whoever assembled them owns
/// their lifetime.
pub struct AdmissionService {
    policy: Arc<dyn AdmissionPolicy>,
    buffer: Arc<MeasurementBuffer>,
}

impl AdmissionService {
    pub fn new(policy: Arc<dyn AdmissionPolicy>, buffer: Arc<MeasurementBuffer>) -> Self {
        Self { policy, buffer }
    }

    pub fn buffer(&self) -> &Arc<MeasurementBuffer> {
        &self.buffer
    }

    fn admit_at(&self, measurement: RawMeasurement, tp: Timestamp) -> Admission {
        match self.policy.can_process_at(&measurement, tp) {
            SensorStatus::Available => {
                let RawMeasurement { sensor_id, payload } = measurement;
                match self.buffer.push(payload) {
                    Ok(()) => {
                        MEASUREMENTS_ADMITTED.inc();
                        Admission::Admitted
                    }
                    Err(err) => Admission::Overflow(RawMeasurement {
                        sensor_id,
                        payload: err.into_payloads().pop().unwrap_or_default(),
                    }),
                }
            }
            SensorStatus::Unavailable => {
                MEASUREMENTS_REJECTED.inc();
                trace!(sensor_id = %measurement.sensor_id, "Measurement rejected");
                Admission::Rejected
            }
            SensorStatus::Unknown => {
                MEASUREMENTS_DEFERRED.inc();
                trace!(sensor_id = %measurement.sensor_id, "Measurement deferred");
                Admission::Deferred(measurement)
            }
        }
    }
}

impl IngestionApi for AdmissionService {
    fn submit(&self, measurement: RawMeasurement) -> Admission {
        self.admit_at(measurement, self.policy.now())
    }

    fn submit_json(&self, payload: String) -> Admission {
        match RawMeasurement::from_json(payload) {
            Ok(measurement) => self.submit(measurement),
            Err(err) => {
                MEASUREMENTS_REJECTED.inc();
                debug!(error = %err, "Malformed measurement rejected");
                Admission::Rejected
            }
        }
    }

    fn submit_batch(&self, measurements: Vec<RawMeasurement>) -> BatchOutcome {
        let tp = self.policy.now();
        let mut outcome = BatchOutcome::default();

        for measurement in measurements {
            outcome.record(self.admit_at(measurement, tp));
        }

        debug!(
            admitted = outcome.admitted,
            rejected = outcome.rejected,
            deferred = outcome.deferred.len(),
            overflowed = outcome.overflowed.len(),
            "Measurement batch classified"
        );
        outcome
    }

    fn flush(&self) -> Result<usize, BufferError> {
        self.buffer.process()
    }
}
