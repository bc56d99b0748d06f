//! Time sources.
//!
//! Cache ages are computed from millisecond timestamps read through a
//! [`TimeSource`], which lets tests drive the clock by hand.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// Convert a duration to whole milliseconds, saturating at `u64::MAX`.
#[must_use]
pub fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Time source for consistent timestamp handling.
///
/// Abstracted to allow testing with deterministic time.
pub trait TimeSource: Send + Sync {
    /// Returns the current timestamp in milliseconds.
    fn now(&self) -> Timestamp;
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(duration_ms)
            .unwrap_or_default()
    }
}

/// Hand-driven time source for tests and replays.
#[derive(Debug, Default)]
pub struct ManualTimeSource {
    time: AtomicU64,
}

impl ManualTimeSource {
    #[must_use]
    pub fn new(initial: Timestamp) -> Self {
        Self {
            time: AtomicU64::new(initial),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.time.fetch_add(duration_ms(by), Ordering::SeqCst);
    }

    pub fn set(&self, time: Timestamp) {
        self.time.store(time, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Timestamp {
        self.time.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_time_source() {
        let source = SystemTimeSource;
        let now = source.now();

        // Should be a reasonable timestamp (after year 2020)
        assert!(now > 1_577_836_800_000);
    }

    #[test]
    fn test_manual_time_source() {
        let source = ManualTimeSource::new(1000);
        assert_eq!(source.now(), 1000);

        source.advance(Duration::from_millis(500));
        assert_eq!(source.now(), 1500);

        source.set(3000);
        assert_eq!(source.now(), 3000);
    }

    #[test]
    fn test_duration_ms_saturates() {
        assert_eq!(duration_ms(Duration::from_secs(6 * 60)), 360_000);
        assert_eq!(duration_ms(Duration::MAX), u64::MAX);
    }
}
