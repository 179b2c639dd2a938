// Private module declaration
mod endpoints;

use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};

// Re-export for public API
pub use endpoints::{health_handler, metrics_handler};

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Account lifecycle operations (outcome, latency)
// - HTTP requests by method and status
// - Translated errors by failure kind
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

pub struct Metrics {
    registry: Registry,

    // Lifecycle Metrics
    pub operations_total: IntCounterVec,
    pub operation_duration: HistogramVec,

    // HTTP Metrics
    pub http_requests_total: IntCounterVec,
    pub http_errors_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let operations_total = IntCounterVec::new(
            Opts::new("accounts_operations_total", "Account lifecycle operations by outcome"),
            &["operation", "outcome"],
        )?;
        registry.register(Box::new(operations_total.clone()))?;

        let operation_duration = HistogramVec::new(
            HistogramOpts::new("accounts_operation_duration_seconds", "Account lifecycle operation duration")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["operation"],
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "HTTP requests served"),
            &["method", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_errors_total = IntCounterVec::new(
            Opts::new("http_errors_total", "Error responses by failure kind"),
            &["kind"],
        )?;
        registry.register(Box::new(http_errors_total.clone()))?;

        Ok(Self {
            registry,
            operations_total,
            operation_duration,
            http_requests_total,
            http_errors_total,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record a lifecycle operation
    pub fn record_operation(&self, operation: &str, outcome: &str, duration_secs: f64) {
        self.operations_total.with_label_values(&[operation, outcome]).inc();
        self.operation_duration.with_label_values(&[operation]).observe(duration_secs);
    }

    /// Helper to record a served HTTP request
    pub fn record_http_request(&self, method: &str, status: u16) {
        let status = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, status.as_str()])
            .inc();
    }

    /// Helper to record a translated error
    pub fn record_http_error(&self, kind: &str) {
        self.http_errors_total.with_label_values(&[kind]).inc();
    }
}
