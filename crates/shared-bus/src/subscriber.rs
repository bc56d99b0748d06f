//! # Batch Subscriber
//!
//! Defines the receiving side of the bus.

use crate::events::MeasurementBatch;
use std::pin::Pin;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::Stream;
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The bus was dropped.
    #[error("Measurement bus closed")]
    Closed,
}

/// A subscription handle for receiving batches.
pub struct Subscription {
    receiver: broadcast::Receiver<MeasurementBatch>,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<MeasurementBatch>) -> Self {
        Self { receiver }
    }

    /// Receive the next batch.
    ///
    /// # Returns
    ///
    /// - `Some(batch)` - The next batch
    /// - `None` - The channel was closed (bus dropped)
    pub async fn recv(&mut self) -> Option<MeasurementBatch> {
        loop {
            match self.receiver.recv().await {
                Ok(batch) => return Some(batch),
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "Subscriber lagged, some batches dropped");
                }
            }
        }
    }

    /// Try to receive the next batch without blocking.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(batch))` - A batch was available
    /// - `Ok(None)` - No batch available (would block)
    /// - `Err(SubscriptionError::Closed)` - The channel was closed
    pub fn try_recv(&mut self) -> Result<Option<MeasurementBatch>, SubscriptionError> {
        loop {
            match self.receiver.try_recv() {
                Ok(batch) => return Ok(Some(batch)),
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(count)) => {
                    debug!(lagged = count, "Subscriber lagged, some batches dropped");
                }
            }
        }
    }

    /// Convert into a stream for use with stream combinators.
    #[must_use]
    pub fn into_stream(self) -> BatchStream {
        BatchStream {
            inner: BroadcastStream::new(self.receiver),
        }
    }
}

/// A stream of published batches. Lagged gaps are skipped.
pub struct BatchStream {
    inner: BroadcastStream<MeasurementBatch>,
}

impl Stream for BatchStream {
    type Item = MeasurementBatch;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(batch))) => return Poll::Ready(Some(batch)),
                Poll::Ready(Some(Err(BroadcastStreamRecvError::Lagged(count)))) => {
                    debug!(lagged = count, "Stream lagged, some batches dropped");
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
