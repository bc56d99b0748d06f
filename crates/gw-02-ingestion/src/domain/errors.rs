//! Ingestion error types.
//!
//! Both variants hand the undelivered payloads back to the caller, which
//! owns the retry or drop policy.

use shared_bus::PublishError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// The buffer is at capacity; `payload` was not stored.
    #[error("Measurement buffer full (capacity {capacity})")]
    Full { capacity: usize, payload: String },

    /// The publisher refused a drained batch; `batch` is no longer buffered.
    #[error("Failed to publish batch of {} payloads: {source}", batch.len())]
    PublishFailed {
        #[source]
        source: PublishError,
        batch: Vec<String>,
    },
}

impl BufferError {
    /// Payloads that did not reach the publisher.
    pub fn into_payloads(self) -> Vec<String> {
        match self {
            Self::Full { payload, .. } => vec![payload],
            Self::PublishFailed { batch, .. } => batch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_display_omits_payload() {
        let err = BufferError::Full {
            capacity: 10,
            payload: "secret-reading".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("capacity 10"));
        assert!(!text.contains("secret-reading"));
    }

    #[test]
    fn test_into_payloads() {
        let err = BufferError::PublishFailed {
            source: PublishError::NotConnected,
            batch: vec!["a".into(), "b".into()],
        };
        assert!(err.to_string().contains("2 payloads"));
        assert_eq!(err.into_payloads(), vec!["a".to_string(), "b".to_string()]);
    }
}
