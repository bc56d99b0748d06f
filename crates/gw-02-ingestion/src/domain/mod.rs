//! # Domain Layer - Ingestion Subsystem
//!
//! ## Components
//!
//! - `buffer`: MeasurementBuffer, bounded with batched drain
//! - `admission`: Admission, BatchOutcome
//! - `config`: IngestionConfig
//! - `errors`: BufferError

pub mod admission;
pub mod buffer;
pub mod config;
pub mod errors;

pub use admission::*;
pub use buffer::*;
pub use config::*;
pub use errors::*;
