//! # Domain Layer - Authorization Subsystem
//!
//! Pure cache logic. No I/O happens here; records arrive through the
//! bulk append operations and time arrives through a `TimeSource`.
//!
//! ## Components
//!
//! - `timed_cache`: TimedEntryCache with lazy expiry and explicit eviction
//! - `authorization`: AuthorizationCache, SensorStatus, CacheStats
//! - `config`: AuthorizationConfig, DataReloadSettings
//! - `errors`: RepositoryError, ReloadError

pub mod authorization;
pub mod config;
pub mod errors;
pub mod timed_cache;

pub use authorization::*;
pub use config::*;
pub use errors::*;
pub use timed_cache::*;
