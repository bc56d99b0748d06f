//! Ports layer for the Authorization subsystem.
//!
//! - Inbound (Driving) ports: the admission decision used by ingestion
//! - Outbound (Driven) ports: record repositories used by the reloader

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
