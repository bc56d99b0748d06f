//! # Sensate Telemetry
//!
//! Logging and metrics for the gateway.
//!
//! ## Components
//!
//! - **Logs**: `tracing` events rendered by `tracing-subscriber`, human
//!   readable in development and JSON in containers
//! - **Metrics**: Prometheus counters and gauges for admission decisions,
//!   buffer pressure and cache maintenance
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sensate_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     init_telemetry(&config).expect("Failed to init telemetry");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SG_SERVICE_NAME` | `sensate-gateway` | Service name in logs |
//! | `SG_LOG_LEVEL` | `info` | Log level filter |
//! | `SG_JSON_LOGS` | `false` | JSON formatted logs |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::{build_filter, init_logging};
pub use metrics::{encode_metrics, register_metrics};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and register metrics.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;
    init_logging(config)
}
