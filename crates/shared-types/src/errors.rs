//! # Error Types
//!
//! Defines error types used across subsystems.

use thiserror::Error;

/// Errors raised while identifying the sensor behind a measurement.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// The string is not a 24 character hex document id.
    #[error("Invalid object id {value:?}: {reason}")]
    InvalidObjectId { value: String, reason: String },

    /// The payload carries no sensor id field.
    #[error("Measurement has no sensor id")]
    MissingSensorId,

    /// The payload could not be parsed at all.
    #[error("Malformed measurement payload: {0}")]
    MalformedPayload(String),
}
