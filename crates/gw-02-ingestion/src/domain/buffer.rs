//! # Measurement Buffer
//!
//! Bounded accumulator of admitted payloads, drained in batches to the
//! publisher.
//!
//! ## Lifecycle
//!
//! ```text
//! [Empty] ──push──→ [Accumulating] ──process: swap under lock──→ [Empty]
//!                                         │
//!                                         └── publish(batch), lock released
//! ```
//!
//! Pushes racing a drain land either in the swapped-out batch or in the
//! fresh one, never in both and never nowhere.
//!
//! ## Overflow
//!
//! At capacity, `push` refuses the new payload and returns it inside
//! [`BufferError::Full`]. Nothing already buffered is dropped.
//!
//! ## Merging
//!
//! `absorb` locks two buffers at once. Locks are always taken in ascending
//! buffer id order, so two opposite merges cannot deadlock.

use super::config::IngestionConfig;
use super::errors::BufferError;
use parking_lot::{Mutex, MutexGuard};
use sensate_telemetry::metrics::{
    BATCHES_PUBLISHED, BUFFER_OVERFLOWS, BUFFER_PENDING, PUBLISH_DURATION, PUBLISH_FAILURES,
};
use shared_bus::MeasurementPublisher;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Source of stable buffer ids, used for lock ordering.
static NEXT_BUFFER_ID: AtomicU64 = AtomicU64::new(1);

/// Thread-safe bounded payload buffer.
pub struct MeasurementBuffer {
    id: u64,
    capacity: usize,
    pending: Mutex<Vec<String>>,
    publisher: Arc<dyn MeasurementPublisher>,
}

impl MeasurementBuffer {
    /// Create a buffer handing its batches to `publisher`.
    pub fn new(config: &IngestionConfig, publisher: Arc<dyn MeasurementPublisher>) -> Self {
        Self {
            id: NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed),
            capacity: config.capacity,
            pending: Mutex::new(Vec::new()),
            publisher,
        }
    }

    /// Stable identity, unique per process.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Free slots before pushes start failing.
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.len())
    }

    /// Append a payload.
    ///
    /// # Errors
    ///
    /// `BufferError::Full` carrying the refused payload when at capacity.
    pub fn push(&self, payload: String) -> Result<(), BufferError> {
        let mut pending = self.pending.lock();
        if pending.len() >= self.capacity {
            drop(pending);
            BUFFER_OVERFLOWS.inc();
            debug!(
                buffer_id = self.id,
                capacity = self.capacity,
                "Measurement buffer full, payload refused"
            );
            return Err(BufferError::Full {
                capacity: self.capacity,
                payload,
            });
        }

        pending.push(payload);
        drop(pending);
        BUFFER_PENDING.inc();
        Ok(())
    }

    /// Drain everything buffered and hand it to the publisher.
    ///
    /// The publisher runs after the lock is released. An empty buffer
    /// publishes nothing. Returns the number of payloads published.
    ///
    /// # Errors
    ///
    /// `BufferError::PublishFailed` carrying the drained batch. The batch
    /// is not put back; retrying is the caller's decision.
    pub fn process(&self) -> Result<usize, BufferError> {
        let batch = self.take_snapshot();
        if batch.is_empty() {
            return Ok(0);
        }

        let timer = PUBLISH_DURATION.start_timer();
        let result = self.publisher.publish(&batch);
        timer.observe_duration();

        match result {
            Ok(receivers) => {
                BATCHES_PUBLISHED.inc();
                debug!(
                    buffer_id = self.id,
                    count = batch.len(),
                    receivers,
                    "Measurement batch published"
                );
                Ok(batch.len())
            }
            Err(source) => {
                PUBLISH_FAILURES.inc();
                warn!(
                    buffer_id = self.id,
                    count = batch.len(),
                    error = %source,
                    "Failed to publish measurement batch"
                );
                Err(BufferError::PublishFailed { source, batch })
            }
        }
    }

    /// Drain everything buffered without publishing.
    pub fn take_snapshot(&self) -> Vec<String> {
        let batch = std::mem::take(&mut *self.pending.lock());
        BUFFER_PENDING.sub(batch.len() as f64);
        batch
    }

    /// Move payloads from `other` into `self`, oldest first, until `self`
    /// is full. Payloads that do not fit stay in `other`.
    ///
    /// Returns the number moved. Absorbing a buffer into itself moves
    /// nothing.
    pub fn absorb(&self, other: &MeasurementBuffer) -> usize {
        if self.id == other.id {
            return 0;
        }

        let (mut mine, mut theirs) = lock_pair(self, other);
        let room = self.capacity.saturating_sub(mine.len());
        let moved = room.min(theirs.len());
        mine.extend(theirs.drain(..moved));
        let left = theirs.len();
        drop(theirs);
        drop(mine);

        debug!(
            buffer_id = self.id,
            from = other.id,
            moved,
            left,
            "Buffers merged"
        );
        moved
    }
}

/// Lock `a` and `b` in ascending id order. Returns the guards as `(a, b)`.
fn lock_pair<'a>(
    a: &'a MeasurementBuffer,
    b: &'a MeasurementBuffer,
) -> (MutexGuard<'a, Vec<String>>, MutexGuard<'a, Vec<String>>) {
    if a.id < b.id {
        let first = a.pending.lock();
        let second = b.pending.lock();
        (first, second)
    } else {
        let first = b.pending.lock();
        let second = a.pending.lock();
        (second, first)
    }
}
