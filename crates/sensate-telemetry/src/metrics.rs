//! Prometheus metrics for the gateway.
//!
//! All metrics follow the naming convention: `sg_<component>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., measurements_admitted_total)
//! - **Gauge**: Value that can go up or down (e.g., buffer_pending)
//! - **Histogram**: Distribution of values (e.g., publish_duration_seconds)

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, Encoder, Gauge, Histogram, HistogramOpts, Registry,
    TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // ADMISSION METRICS
    // =========================================================================

    /// Measurements admitted (sensor known and not blacklisted)
    pub static ref MEASUREMENTS_ADMITTED: Counter = Counter::new(
        "sg_admission_measurements_admitted_total",
        "Total measurements admitted into the buffer"
    ).expect("metric creation failed");

    /// Measurements rejected (blacklisted or malformed)
    pub static ref MEASUREMENTS_REJECTED: Counter = Counter::new(
        "sg_admission_measurements_rejected_total",
        "Total measurements rejected"
    ).expect("metric creation failed");

    /// Measurements deferred (sensor not known locally yet)
    pub static ref MEASUREMENTS_DEFERRED: Counter = Counter::new(
        "sg_admission_measurements_deferred_total",
        "Total measurements deferred for an unknown sensor"
    ).expect("metric creation failed");

    // =========================================================================
    // BUFFER METRICS
    // =========================================================================

    /// Pushes refused because the buffer was full
    pub static ref BUFFER_OVERFLOWS: Counter = Counter::new(
        "sg_buffer_overflow_total",
        "Total payloads refused by a full measurement buffer"
    ).expect("metric creation failed");

    /// Payloads waiting for the next drain
    pub static ref BUFFER_PENDING: Gauge = Gauge::new(
        "sg_buffer_pending",
        "Payloads currently held by the measurement buffer"
    ).expect("metric creation failed");

    /// Batches handed to the publisher successfully
    pub static ref BATCHES_PUBLISHED: Counter = Counter::new(
        "sg_buffer_batches_published_total",
        "Total batches published"
    ).expect("metric creation failed");

    /// Batches the publisher refused
    pub static ref PUBLISH_FAILURES: Counter = Counter::new(
        "sg_buffer_publish_failures_total",
        "Total batches the publisher failed to accept"
    ).expect("metric creation failed");

    /// Time spent inside the publisher
    pub static ref PUBLISH_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "sg_buffer_publish_duration_seconds",
            "Time spent handing a batch to the publisher"
        ).buckets(exponential_buckets(0.0001, 2.0, 14).expect("valid buckets"))
    ).expect("metric creation failed");

    // =========================================================================
    // CACHE METRICS
    // =========================================================================

    /// Entries reclaimed by cleanup sweeps
    pub static ref CACHE_ENTRIES_EVICTED: Counter = Counter::new(
        "sg_cache_entries_evicted_total",
        "Total stale cache entries removed by cleanup sweeps"
    ).expect("metric creation failed");

    /// Completed bulk reloads
    pub static ref CACHE_RELOADS: Counter = Counter::new(
        "sg_cache_reloads_total",
        "Total completed bulk cache reloads"
    ).expect("metric creation failed");

    /// Cached sensors after the last reload
    pub static ref CACHED_SENSORS: Gauge = Gauge::new(
        "sg_cache_sensors",
        "Sensors held by the authorization cache"
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Fails with `TelemetryError::MetricsInit` if called twice.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Admission
        Box::new(MEASUREMENTS_ADMITTED.clone()),
        Box::new(MEASUREMENTS_REJECTED.clone()),
        Box::new(MEASUREMENTS_DEFERRED.clone()),
        // Buffer
        Box::new(BUFFER_OVERFLOWS.clone()),
        Box::new(BUFFER_PENDING.clone()),
        Box::new(BATCHES_PUBLISHED.clone()),
        Box::new(PUBLISH_FAILURES.clone()),
        Box::new(PUBLISH_DURATION.clone()),
        // Cache
        Box::new(CACHE_ENTRIES_EVICTED.clone()),
        Box::new(CACHE_RELOADS.clone()),
        Box::new(CACHED_SENSORS.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
