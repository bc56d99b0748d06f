//! # Ingestion Subsystem
//!
//! **Subsystem ID:** 2
//!
//! ## Purpose
//!
//! Admits raw measurements through the authorization subsystem's decision,
//! accumulates the admitted payloads in a bounded buffer and hands them to
//! the bus in batches.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Buffer never exceeds capacity | `domain/buffer.rs` - `push()` reject-new |
//! | Publisher runs outside the buffer lock | `domain/buffer.rs` - `process()` |
//! | Dual locks taken in ascending buffer id order | `domain/buffer.rs` - `lock_pair()` |
//! | One reference instant per batch | `service.rs` - `submit_batch()` |
//!
//! ## Data Flow
//!
//! ```text
//! transport ──submit──→ AdmissionService ──can_process──→ AuthorizationCache
//!                              │ Available
//!                              ↓
//!                      MeasurementBuffer ──flush/process──→ MeasurementPublisher
//! ```
//!
//! ## Outbound Dependencies
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | `AdmissionPolicy` | Admission decision (gw-01-authorization) |
//! | `MeasurementPublisher` | Batch delivery (shared-bus) |

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    Admission, BatchOutcome, BufferError, IngestionConfig, MeasurementBuffer,
    DEFAULT_BUFFER_CAPACITY,
};
pub use ports::IngestionApi;
pub use service::AdmissionService;
