//! Adapters layer for the Authorization subsystem.
//!
//! In-memory repository implementations of the outbound ports.

pub mod memory;

pub use memory::{InMemoryApiKeyRepository, InMemorySensorRepository, InMemoryUserRepository};
