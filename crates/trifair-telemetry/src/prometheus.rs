// Path: crates/trifair-telemetry/src/prometheus.rs
//! A concrete implementation of the metrics sinks using the Prometheus crate.

use crate::sinks::*;
use once_cell::sync::OnceCell;
use prometheus::{
    exponential_buckets, register_gauge, register_histogram, register_histogram_vec,
    register_int_counter, register_int_counter_vec, Gauge, Histogram, HistogramVec, IntCounter,
    IntCounterVec,
};

// --- Metric Statics ---
// We use OnceCell to hold the metric collectors. They will be initialized
// exactly once by the `install` function.

static COMMITMENTS_ISSUED_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static ROUNDS_REVEALED_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static ALREADY_REVEALED_REJECTIONS_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static SPIN_DURATION_SECONDS: OnceCell<Histogram> = OnceCell::new();
static INTEGRATOR_DURATION_SECONDS: OnceCell<Histogram> = OnceCell::new();
static POOL_SIZE: OnceCell<Gauge> = OnceCell::new();
static POOL_REFILLS_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static SESSIONS_CREATED_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static SESSIONS_EXPIRED_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static ACTIVE_SESSIONS: OnceCell<Gauge> = OnceCell::new();
static VERIFY_REQUESTS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static ERRORS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();

#[derive(Debug, Clone, Copy)]
pub struct PrometheusSink;

/// Helper macro to reduce boilerplate for getting a metric from OnceCell.
/// This will panic if `install()` has not been called, which is intentional
/// as it indicates a critical application setup error.
macro_rules! get_metric {
    ($metric:ident) => {
        $metric
            .get()
            .expect("Prometheus sink not initialized. Call telemetry::prometheus::install() first.")
    };
}

impl EngineMetricsSink for PrometheusSink {
    fn inc_commitments_issued(&self) {
        get_metric!(COMMITMENTS_ISSUED_TOTAL).inc();
    }
    fn inc_rounds_revealed(&self) {
        get_metric!(ROUNDS_REVEALED_TOTAL).inc();
    }
    fn inc_already_revealed_rejections(&self) {
        get_metric!(ALREADY_REVEALED_REJECTIONS_TOTAL).inc();
    }
    fn observe_spin_duration(&self, duration_secs: f64) {
        get_metric!(SPIN_DURATION_SECONDS).observe(duration_secs);
    }
    fn observe_integrator_duration(&self, duration_secs: f64) {
        get_metric!(INTEGRATOR_DURATION_SECONDS).observe(duration_secs);
    }
    fn set_pool_size(&self, size: u64) {
        get_metric!(POOL_SIZE).set(size as f64);
    }
    fn inc_pool_refills(&self) {
        get_metric!(POOL_REFILLS_TOTAL).inc();
    }
    fn inc_sessions_created(&self) {
        get_metric!(SESSIONS_CREATED_TOTAL).inc();
    }
    fn inc_sessions_expired(&self) {
        get_metric!(SESSIONS_EXPIRED_TOTAL).inc();
    }
    fn set_active_sessions(&self, count: u64) {
        get_metric!(ACTIVE_SESSIONS).set(count as f64);
    }
    fn inc_verify_requests(&self, outcome: &'static str) {
        get_metric!(VERIFY_REQUESTS_TOTAL)
            .with_label_values(&[outcome])
            .inc();
    }
}

impl ErrorMetricsSink for PrometheusSink {
    fn inc_error(&self, kind: &'static str, variant: &'static str) {
        get_metric!(ERRORS_TOTAL)
            .with_label_values(&[kind, variant])
            .inc();
    }
}

/// Initializes all Prometheus metrics collectors and returns a static reference to the sink.
/// This function must be called only once at application startup.
#[allow(clippy::expect_used)]
pub fn install() -> Result<&'static dyn MetricsSink, prometheus::Error> {
    COMMITMENTS_ISSUED_TOTAL
        .set(register_int_counter!(
            "trifair_commitments_issued_total",
            "Total commitments minted into the pool."
        )?)
        .expect("static already initialized");
    ROUNDS_REVEALED_TOTAL
        .set(register_int_counter!(
            "trifair_rounds_revealed_total",
            "Total rounds successfully revealed."
        )?)
        .expect("static already initialized");
    ALREADY_REVEALED_REJECTIONS_TOTAL
        .set(register_int_counter!(
            "trifair_already_revealed_rejections_total",
            "Total reveal attempts rejected because the round was already revealed."
        )?)
        .expect("static already initialized");
    SPIN_DURATION_SECONDS
        .set(register_histogram!(
            "trifair_spin_duration_seconds",
            "Latency of a full spin, from commit consumption to proof emission.",
            exponential_buckets(0.001, 2.0, 15)?
        )?)
        .expect("static already initialized");
    INTEGRATOR_DURATION_SECONDS
        .set(register_histogram!(
            "trifair_integrator_duration_seconds",
            "Latency of a single three-body integration run.",
            exponential_buckets(0.0005, 2.0, 15)?
        )?)
        .expect("static already initialized");
    POOL_SIZE
        .set(register_gauge!(
            "trifair_commitment_pool_size",
            "Current number of unconsumed commitments in the pool."
        )?)
        .expect("static already initialized");
    POOL_REFILLS_TOTAL
        .set(register_int_counter!(
            "trifair_pool_refills_total",
            "Total pool refill batches executed."
        )?)
        .expect("static already initialized");
    SESSIONS_CREATED_TOTAL
        .set(register_int_counter!(
            "trifair_sessions_created_total",
            "Total sessions created."
        )?)
        .expect("static already initialized");
    SESSIONS_EXPIRED_TOTAL
        .set(register_int_counter!(
            "trifair_sessions_expired_total",
            "Total sessions that transitioned to Expired."
        )?)
        .expect("static already initialized");
    ACTIVE_SESSIONS
        .set(register_gauge!(
            "trifair_active_sessions",
            "Current number of sessions not yet in a terminal state."
        )?)
        .expect("static already initialized");
    VERIFY_REQUESTS_TOTAL
        .set(register_int_counter_vec!(
            "trifair_verify_requests_total",
            "Total offline verification requests, labeled by outcome.",
            &["outcome"]
        )?)
        .expect("static already initialized");
    ERRORS_TOTAL
        .set(register_int_counter_vec!(
            "trifair_errors_total",
            "Total number of errors, categorized by kind and variant.",
            &["kind", "variant"]
        )?)
        .expect("static already initialized");

    static SINK: PrometheusSink = PrometheusSink;
    crate::sinks::install(&SINK);
    Ok(&SINK)
}
