//! # Measurement Publisher
//!
//! Defines the publishing side of the bus.

use crate::events::MeasurementBatch;
use crate::subscriber::Subscription;
use crate::{DEFAULT_CHANNEL_CAPACITY, MEASUREMENTS_TOPIC};
use parking_lot::Mutex;
use shared_types::{SystemTimeSource, TimeSource};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Errors from publish operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// Nobody is listening; the batch was not delivered.
    #[error("No subscribers on topic {topic}")]
    NoSubscribers { topic: String },

    /// The downstream client is not connected.
    #[error("Publisher not connected")]
    NotConnected,

    /// Any other downstream failure.
    #[error("Publish failed: {0}")]
    Internal(String),
}

/// Trait for handing drained measurement batches downstream.
///
/// Called by the measurement buffer outside of its lock. Implementations may
/// block on I/O; they must not call back into the buffer that invoked them.
pub trait MeasurementPublisher: Send + Sync {
    /// Publish one batch of serialized payloads, in order.
    ///
    /// # Returns
    ///
    /// The number of downstream receivers that accepted the batch.
    fn publish(&self, batch: &[String]) -> Result<usize, PublishError>;
}

/// In-memory implementation of the bus.
///
/// Uses `tokio::sync::broadcast` for multi-consumer fan-out. Sending is
/// synchronous, so no runtime is needed to publish.
pub struct InMemoryMeasurementBus {
    /// Broadcast sender for batches.
    sender: broadcast::Sender<MeasurementBatch>,

    /// Topic stamped on every batch.
    topic: String,

    /// Total publish attempts.
    batches_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,

    /// Source of `published_at` stamps.
    clock: Arc<dyn TimeSource>,
}

impl InMemoryMeasurementBus {
    /// Create a new in-memory bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new in-memory bus with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            topic: MEASUREMENTS_TOPIC.to_string(),
            batches_published: AtomicU64::new(0),
            capacity,
            clock: Arc::new(SystemTimeSource),
        }
    }

    /// Stamp batches from `clock` instead of the system time.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    /// Override the topic stamped on published batches.
    #[must_use]
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Subscribe to all batches published after this call.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        debug!(topic = %self.topic, "New subscription created");
        Subscription::new(self.sender.subscribe())
    }

    /// Get the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Get the total number of publish attempts.
    #[must_use]
    pub fn batches_published(&self) -> u64 {
        self.batches_published.load(Ordering::Relaxed)
    }
}

impl Default for InMemoryMeasurementBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementPublisher for InMemoryMeasurementBus {
    fn publish(&self, batch: &[String]) -> Result<usize, PublishError> {
        // Always increment counter (publish was attempted)
        self.batches_published.fetch_add(1, Ordering::Relaxed);

        let event = MeasurementBatch::new(&self.topic, batch.to_vec(), self.clock.now());
        let batch_id = event.id;

        match self.sender.send(event) {
            Ok(receivers) => {
                debug!(
                    topic = %self.topic,
                    batch_id = %batch_id,
                    size = batch.len(),
                    receivers,
                    "Batch published"
                );
                Ok(receivers)
            }
            Err(_) => {
                warn!(
                    topic = %self.topic,
                    batch_id = %batch_id,
                    size = batch.len(),
                    "Batch dropped (no subscribers)"
                );
                Err(PublishError::NoSubscribers {
                    topic: self.topic.clone(),
                })
            }
        }
    }
}

/// No-op publisher for running without a downstream.
#[derive(Debug, Clone, Default)]
pub struct NoOpPublisher;

impl MeasurementPublisher for NoOpPublisher {
    fn publish(&self, _batch: &[String]) -> Result<usize, PublishError> {
        Ok(0)
    }
}

/// Recording publisher for tests.
///
/// Keeps every delivered batch; can be switched into a failing mode to
/// exercise publish error paths.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    batches: Mutex<Vec<Vec<String>>>,
    failing: AtomicBool,
}

impl RecordingPublisher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent publishes fail with `PublishError::NotConnected`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every batch received so far, in delivery order.
    #[must_use]
    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().clone()
    }

    /// All payloads received so far, flattened.
    #[must_use]
    pub fn payloads(&self) -> Vec<String> {
        self.batches.lock().iter().flatten().cloned().collect()
    }

    #[must_use]
    pub fn publish_count(&self) -> usize {
        self.batches.lock().len()
    }
}

impl MeasurementPublisher for RecordingPublisher {
    fn publish(&self, batch: &[String]) -> Result<usize, PublishError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PublishError::NotConnected);
        }

        self.batches.lock().push(batch.to_vec());
        Ok(1)
    }
}
