//! Ports layer for the Ingestion subsystem.
//!
//! - Inbound (Driving) ports: measurement submission
//! - Outbound (Driven) ports: admission policy and batch publisher

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
