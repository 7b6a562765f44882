//! Prometheus metrics for the incident intelligence service.
//!
//! Metrics live in a process-wide registry and are registered once at
//! startup by [`init_metrics`]. Recording into an unregistered metric is
//! harmless, which keeps library code and tests independent of startup.
//!
//! # Example
//! ```no_run
//! use incident_copilot::metrics::ADVISORY_CALLS_TOTAL;
//!
//! ADVISORY_CALLS_TOTAL
//!     .with_label_values(&["suggest", "fallback"])
//!     .inc();
//! ```
use lazy_static::lazy_static;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

const NAMESPACE: &str = "incident_copilot";

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    /// Advisory service calls
    ///
    /// Labels: operation (suggest, chat, assistant), outcome (ok, fallback)
    pub static ref ADVISORY_CALLS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("advisory_calls_total", "Advisory service calls by outcome")
            .namespace(NAMESPACE),
        &["operation", "outcome"]
    ).expect("Failed to create ADVISORY_CALLS_TOTAL metric");

    /// Advisory call latency in seconds
    ///
    /// Labels: operation
    pub static ref ADVISORY_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "advisory_request_duration_seconds",
            "Advisory service call duration in seconds"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["operation"]
    ).expect("Failed to create ADVISORY_REQUEST_DURATION_SECONDS metric");

    /// Similarity queries answered
    pub static ref SIMILARITY_QUERIES_TOTAL: IntCounter = IntCounter::with_opts(
        Opts::new("similarity_queries_total", "Similarity queries answered")
            .namespace(NAMESPACE)
    ).expect("Failed to create SIMILARITY_QUERIES_TOTAL metric");

    /// Embedding writes
    ///
    /// Labels: outcome (ok, error)
    pub static ref EMBEDDINGS_WRITTEN_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("embeddings_written_total", "Embedding writes by outcome")
            .namespace(NAMESPACE),
        &["outcome"]
    ).expect("Failed to create EMBEDDINGS_WRITTEN_TOTAL metric");

    /// Rejected status transitions
    ///
    /// Labels: from, to
    pub static ref LIFECYCLE_REJECTIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("lifecycle_rejections_total", "Rejected incident status transitions")
            .namespace(NAMESPACE),
        &["from", "to"]
    ).expect("Failed to create LIFECYCLE_REJECTIONS_TOTAL metric");
}

/// Register all metrics with the global registry
pub fn init_metrics() -> Result<(), prometheus::Error> {
    PROMETHEUS_REGISTRY.register(Box::new(ADVISORY_CALLS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(ADVISORY_REQUEST_DURATION_SECONDS.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(SIMILARITY_QUERIES_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(EMBEDDINGS_WRITTEN_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(LIFECYCLE_REJECTIONS_TOTAL.clone()))?;

    tracing::info!("Prometheus metrics registered");
    Ok(())
}

/// Render all registered metrics in Prometheus text format
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}
