//! # Shared Bus - Measurement Batch Publishing
//!
//! The publishing side of the ingestion gateway. The measurement buffer hands
//! drained batches to a [`MeasurementPublisher`]; this crate defines that port
//! and an in-memory implementation used by tests and single-node deployments.
//!
//! ```text
//! ┌───────────────────┐   publish(&[payload])   ┌──────────────────────┐
//! │ MeasurementBuffer │ ──────────────────────→ │ MeasurementPublisher │
//! └───────────────────┘                         └──────────┬───────────┘
//!                                                          │ broadcast
//!                                               ┌──────────┴───────────┐
//!                                               ▼                      ▼
//!                                        Subscription           Subscription
//! ```
//!
//! Publishing is synchronous and never retried here: a failed publish is
//! reported to whoever called the buffer.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::MeasurementBatch;
pub use publisher::{
    InMemoryMeasurementBus, MeasurementPublisher, NoOpPublisher, PublishError, RecordingPublisher,
};
pub use subscriber::{BatchStream, Subscription, SubscriptionError};

/// Maximum batches to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Topic for admitted measurement batches.
pub const MEASUREMENTS_TOPIC: &str = "sensateiot/internal/measurements/bulk";
