//! # Inbound Port - IngestionApi
//!
//! Driving port used by the transport layer (MQTT handler, HTTP endpoint)
//! for every raw measurement it receives.

use crate::domain::{Admission, BatchOutcome, BufferError};
use shared_types::RawMeasurement;

/// Measurement submission API.
pub trait IngestionApi: Send + Sync {
    /// Decide and, if admitted, buffer one measurement.
    fn submit(&self, measurement: RawMeasurement) -> Admission;

    /// Parse a JSON payload, then submit it. Unparsable payloads are
    /// rejected.
    fn submit_json(&self, payload: String) -> Admission;

    /// Decide a batch against one reference instant.
    fn submit_batch(&self, measurements: Vec<RawMeasurement>) -> BatchOutcome;

    /// Drain the buffer to the publisher. Returns the number published.
    fn flush(&self) -> Result<usize, BufferError>;
}
