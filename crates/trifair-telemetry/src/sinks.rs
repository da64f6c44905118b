// Path: crates/trifair-telemetry/src/sinks.rs
//! Defines abstract traits for metrics reporting, decoupling core logic from the backend.

use once_cell::sync::OnceCell;

// --- Static Sink Access ---

/// A no-op sink for use in tests or when telemetry is disabled.
#[derive(Debug, Clone, Copy)]
pub struct NopSink;

// Two separate cells, one per trait object, rather than a single
// `OnceCell<&'static dyn MetricsSink>` coerced down to each supertrait on
// access: that coercion is a trait-upcasting cast, stable only since Rust
// 1.86, and this workspace's MSRV is 1.78. `install` populates both from the
// same concrete sink via ordinary (always-stable) unsizing coercion instead.
static ENGINE_SINK: OnceCell<&'static dyn EngineMetricsSink> = OnceCell::new();
static ERROR_SINK: OnceCell<&'static dyn ErrorMetricsSink> = OnceCell::new();
static NOP_SINK: NopSink = NopSink;

/// Installs `sink` as the process-wide metrics destination. Must be called
/// at most once; subsequent calls are ignored, matching `OnceCell` semantics.
pub fn install<T: MetricsSink + 'static>(sink: &'static T) {
    let _ = ENGINE_SINK.set(sink);
    let _ = ERROR_SINK.set(sink);
}

/// Returns a static reference to the configured error metrics sink.
/// If no sink has been installed, returns a no-op sink.
pub fn error_metrics() -> &'static dyn ErrorMetricsSink {
    ERROR_SINK.get().copied().unwrap_or(&NOP_SINK)
}

/// Returns a static reference to the configured engine metrics sink.
/// If no sink has been installed, returns a no-op sink.
pub fn engine_metrics() -> &'static dyn EngineMetricsSink {
    ENGINE_SINK.get().copied().unwrap_or(&NOP_SINK)
}

// --- Trait Definitions ---

/// A sink for metrics related to the commitment pool and the reveal path (C3, C7).
pub trait EngineMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments the counter for commitments minted into the pool.
    fn inc_commitments_issued(&self);
    /// Increments the counter for successful reveals (`createRound` completions).
    fn inc_rounds_revealed(&self);
    /// Increments the counter for reveals rejected because the round was
    /// already revealed.
    fn inc_already_revealed_rejections(&self);
    /// Observes the wall-clock duration of one full spin (commit consumption
    /// through proof emission), in seconds.
    fn observe_spin_duration(&self, duration_secs: f64);
    /// Observes the wall-clock duration of a single three-body integration run.
    fn observe_integrator_duration(&self, duration_secs: f64);
    /// Sets the gauge for the commitment pool's current size.
    fn set_pool_size(&self, size: u64);
    /// Increments the counter for pool refill batches executed.
    fn inc_pool_refills(&self);
    /// Increments the counter for sessions created.
    fn inc_sessions_created(&self);
    /// Increments the counter for sessions that transitioned to `Expired`.
    fn inc_sessions_expired(&self);
    /// Sets the gauge for the number of sessions not yet in a terminal state.
    fn set_active_sessions(&self, count: u64);
    /// Increments the counter for offline verification requests, labeled by outcome.
    fn inc_verify_requests(&self, outcome: &'static str);
}
impl EngineMetricsSink for NopSink {
    fn inc_commitments_issued(&self) {}
    fn inc_rounds_revealed(&self) {}
    fn inc_already_revealed_rejections(&self) {}
    fn observe_spin_duration(&self, _duration_secs: f64) {}
    fn observe_integrator_duration(&self, _duration_secs: f64) {}
    fn set_pool_size(&self, _size: u64) {}
    fn inc_pool_refills(&self) {}
    fn inc_sessions_created(&self) {}
    fn inc_sessions_expired(&self) {}
    fn set_active_sessions(&self, _count: u64) {}
    fn inc_verify_requests(&self, _outcome: &'static str) {}
}

/// A sink for recording structured error metrics.
pub trait ErrorMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments a counter for a specific error, categorized by its kind and variant.
    fn inc_error(&self, kind: &'static str, variant: &'static str);
}
impl ErrorMetricsSink for NopSink {
    fn inc_error(&self, _kind: &'static str, _variant: &'static str) {}
}

/// A unified sink implementing every domain trait, providing a single point
/// of implementation for a metrics backend such as Prometheus.
pub trait MetricsSink: EngineMetricsSink + ErrorMetricsSink {}

impl<T> MetricsSink for T where T: EngineMetricsSink + ErrorMetricsSink {}
