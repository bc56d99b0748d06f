//! Outbound Ports (Driven Ports)
//!
//! | Trait | Provided by | Purpose |
//! |-------|-------------|---------|
//! | `AdmissionPolicy` | `gw-01-authorization` | Per-measurement decision |
//! | `MeasurementPublisher` | `shared-bus` | Batch hand-off after drain |

pub use gw_01_authorization::{AdmissionPolicy, SensorStatus};
pub use shared_bus::{MeasurementPublisher, PublishError};
