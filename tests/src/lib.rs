//! # Sensate Gateway Test Suite
//!
//! Unified test crate for flows that cross subsystem boundaries.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Hot path throughput (criterion)
//! └── src/
//!     ├── fixtures.rs   # Shared gateway assembly
//!     └── integration/  # Reload → admit → drain → bus flows, stress
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p gw-tests
//!
//! # By category
//! cargo test -p gw-tests integration::flows
//! cargo test -p gw-tests integration::stress
//!
//! # Benchmarks
//! cargo bench -p gw-tests
//! ```

pub mod fixtures;
pub mod integration;
