//! Admission outcomes.

use shared_types::RawMeasurement;

/// Result of submitting one measurement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Buffered for the next drain.
    Admitted,
    /// Blacklisted sensor or unparsable payload. Dropped.
    Rejected,
    /// Sensor not cached yet. Handed back for a later retry.
    Deferred(RawMeasurement),
    /// Admitted by policy but the buffer was full. Handed back.
    Overflow(RawMeasurement),
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted)
    }
}

/// Result of submitting a batch against one reference instant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub admitted: usize,
    pub rejected: usize,
    /// Measurements of unknown sensors, in submission order.
    pub deferred: Vec<RawMeasurement>,
    /// Measurements refused by a full buffer, in submission order.
    pub overflowed: Vec<RawMeasurement>,
}

impl BatchOutcome {
    /// Number of measurements classified.
    pub fn total(&self) -> usize {
        self.admitted + self.rejected + self.deferred.len() + self.overflowed.len()
    }

    pub(crate) fn record(&mut self, admission: Admission) {
        match admission {
            Admission::Admitted => self.admitted += 1,
            Admission::Rejected => self.rejected += 1,
            Admission::Deferred(m) => self.deferred.push(m),
            Admission::Overflow(m) => self.overflowed.push(m),
        }
    }
}
