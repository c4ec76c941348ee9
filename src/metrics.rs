//! Process-wide Prometheus metrics.
//!
//! Metric names mirror the dashboards the proxy has always fed; latency
//! "summaries" are histograms since the Rust client has no summary type.

use once_cell::sync::Lazy;
use prometheus::{core::Collector, Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::time::{Duration, Instant};
use tracing::error;

pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register(&registry, REQUEST_COUNTER.clone());
    register(&registry, REQUEST_DURATION.clone());
    register(&registry, CUSTOM_LOGIC_DURATION.clone());
    register(&registry, CUSTOM_LOGIC_ERRORS.clone());
    register(&registry, DATABASE_DURATION.clone());
    register(&registry, DATABASE_ERRORS.clone());
    registry
});

static REQUEST_COUNTER: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(opts("http_requests_total", "Requests received per operation"), &["method"])
        .expect("valid metric definition")
});

static REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        histogram_opts("http_request_duration_seconds", "Request latency per operation"),
        &["method"],
    )
    .expect("valid metric definition")
});

static CUSTOM_LOGIC_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        histogram_opts("custom_logic_duration_seconds", "Custom logic call latency"),
        &["method", "when"],
    )
    .expect("valid metric definition")
});

static CUSTOM_LOGIC_ERRORS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(opts("custom_logic_errors_total", "Failed custom logic calls"), &["method", "when"])
        .expect("valid metric definition")
});

static DATABASE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        histogram_opts("database_access_duration_seconds", "Store call latency per operation"),
        &["method"],
    )
    .expect("valid metric definition")
});

static DATABASE_ERRORS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(opts("database_access_errors_total", "Failed store calls per operation"), &["method"])
        .expect("valid metric definition")
});

fn namespace() -> String {
    sanitize_namespace(&crate::config::config().server.api_name)
}

/// Metric namespaces only allow `[a-zA-Z0-9_]` and may not start with a digit.
fn sanitize_namespace(raw: &str) -> String {
    let mut ns: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if ns.starts_with(|c: char| c.is_ascii_digit()) {
        ns.insert(0, '_');
    }
    ns
}

fn opts(name: &str, help: &str) -> Opts {
    Opts::new(name, help).namespace(namespace())
}

fn histogram_opts(name: &str, help: &str) -> HistogramOpts {
    HistogramOpts::new(name, help).namespace(namespace())
}

fn register<C>(registry: &Registry, collector: C)
where
    C: Collector + Clone + Send + Sync + 'static,
{
    if let Err(err) = registry.register(Box::new(collector)) {
        if !matches!(err, prometheus::Error::AlreadyReg) {
            error!(?err, "failed to register metric");
        }
    }
}

/// Counts a request on creation and records its latency when dropped, so
/// early returns and error paths are observed the same as successes.
pub struct RequestTimer {
    label: String,
    start: Instant,
}

impl RequestTimer {
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        Lazy::force(&REGISTRY);
        REQUEST_COUNTER.with_label_values(&[&label]).inc();
        Self { label, start: Instant::now() }
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        REQUEST_DURATION
            .with_label_values(&[&self.label])
            .observe(self.start.elapsed().as_secs_f64());
    }
}

pub fn observe_custom_logic(operation: &str, when: &str, elapsed: Duration) {
    CUSTOM_LOGIC_DURATION
        .with_label_values(&[operation, when])
        .observe(elapsed.as_secs_f64());
}

pub fn record_custom_logic_error(operation: &str, when: &str) {
    CUSTOM_LOGIC_ERRORS.with_label_values(&[operation, when]).inc();
}

pub fn observe_database(operation: &str, elapsed: Duration) {
    DATABASE_DURATION
        .with_label_values(&[operation])
        .observe(elapsed.as_secs_f64());
}

pub fn record_database_error(operation: &str) {
    DATABASE_ERRORS.with_label_values(&[operation]).inc();
}

/// Render every registered metric in the Prometheus text format.
pub fn gather() -> Result<String, prometheus::Error> {
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_namespaces() {
        assert_eq!(sanitize_namespace("my-api"), "my_api");
        assert_eq!(sanitize_namespace("9lives"), "_9lives");
        assert_eq!(sanitize_namespace(""), "");
    }

    #[test]
    fn request_timer_counts_and_observes() {
        let before = REQUEST_COUNTER.with_label_values(&["metrics_test_op"]).get();
        {
            let _timer = RequestTimer::start("metrics_test_op");
        }
        assert_eq!(REQUEST_COUNTER.with_label_values(&["metrics_test_op"]).get(), before + 1);
        assert!(REQUEST_DURATION.with_label_values(&["metrics_test_op"]).get_sample_count() >= 1);
    }

    #[test]
    fn gathered_output_contains_request_metrics() {
        drop(RequestTimer::start("metrics_gather_op"));
        let text = gather().unwrap();
        assert!(text.contains("http_requests_total"));
        assert!(text.contains("metrics_gather_op"));
    }
}
