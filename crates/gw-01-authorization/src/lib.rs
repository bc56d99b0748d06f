//! # Authorization Subsystem
//!
//! **Subsystem ID:** 1
//!
//! ## Purpose
//!
//! Answers "may this measurement proceed" from in-memory caches of sensors,
//! users and API keys, refreshed in bulk from the durable stores. The hot
//! path never touches a repository.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Entry fresh iff `tp - written_at <= timeout` | `domain/timed_cache.rs` - `CacheEntry::is_fresh` |
//! | Re-insert refreshes the entry clock | `domain/timed_cache.rs` - `upsert()` |
//! | Blacklist precedes freshness | `domain/authorization.rs` - `can_process_at()` |
//! | Blacklist has no TTL | `domain/authorization.rs` - separate `RwLock<HashSet>` |
//! | Revoked keys are never cached | `domain/authorization.rs` - `append_keys()` |
//! | Failed reload leaves cache untouched | `service.rs` - fetch all, then append |
//!
//! ## Decision Table
//!
//! | Blacklisted | Cached & fresh | `SensorStatus` |
//! |-------------|----------------|----------------|
//! | yes | any | `Unavailable` |
//! | no | yes | `Available` |
//! | no | no | `Unknown` |
//!
//! ## Outbound Dependencies
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | `SensorRepository` | Paged sensor loading |
//! | `UserRepository` | Owners of loaded sensors |
//! | `ApiKeyRepository` | Non-revoked sensor keys |
//! | `TimeSource` | Reference instant for freshness |
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gw_01_authorization::{AuthorizationCache, AuthorizationConfig, CacheReloader};
//!
//! let cache = Arc::new(AuthorizationCache::new(AuthorizationConfig::from_env()));
//! let reloader = CacheReloader::new(cache.clone(), sensors, keys, users, settings);
//! reloader.reload_all().await?;
//!
//! match cache.can_process(&measurement) {
//!     SensorStatus::Available => buffer.push(measurement.payload)?,
//!     SensorStatus::Unavailable => {}
//!     SensorStatus::Unknown => retry_later(measurement),
//! }
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    AuthorizationCache, AuthorizationConfig, CacheEntry, CacheStats, DataReloadSettings,
    ReloadError, RepositoryError, SensorStatus, TimedEntryCache,
};
pub use ports::{AdmissionPolicy, ApiKeyRepository, SensorRepository, UserRepository};
pub use service::{CacheReloader, ReloadSummary};
