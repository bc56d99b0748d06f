//! # Shared Types Crate
//!
//! This crate contains the records cached by the authorization subsystem and
//! the raw measurement type flowing through the ingestion subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Immutable Snapshots**: Records are replaced wholesale on refresh, never
//!   patched in place.
//! - **Deterministic Time**: Everything that ages reads time through
//!   [`TimeSource`], so tests never sleep.

pub mod entities;
pub mod errors;
pub mod time;

pub use entities::*;
pub use errors::*;
pub use time::*;
