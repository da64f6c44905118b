// Path: crates/trifair-telemetry/src/time.rs
use crate::sinks::EngineMetricsSink;
use std::time::Instant;

/// RAII timer that reports the duration of one spin to [`EngineMetricsSink::observe_spin_duration`]
/// when it drops, regardless of which branch the caller returns through.
pub struct SpinTimer<'a> {
    sink: &'a dyn EngineMetricsSink,
    start: Instant,
}

impl<'a> SpinTimer<'a> {
    pub fn new(sink: &'a dyn EngineMetricsSink) -> Self {
        Self {
            sink,
            start: Instant::now(),
        }
    }
}

impl Drop for SpinTimer<'_> {
    fn drop(&mut self) {
        self.sink
            .observe_spin_duration(self.start.elapsed().as_secs_f64());
    }
}

/// RAII timer reporting to [`EngineMetricsSink::observe_integrator_duration`].
pub struct IntegratorTimer<'a> {
    sink: &'a dyn EngineMetricsSink,
    start: Instant,
}

impl<'a> IntegratorTimer<'a> {
    pub fn new(sink: &'a dyn EngineMetricsSink) -> Self {
        Self {
            sink,
            start: Instant::now(),
        }
    }
}

impl Drop for IntegratorTimer<'_> {
    fn drop(&mut self) {
        self.sink
            .observe_integrator_duration(self.start.elapsed().as_secs_f64());
    }
}
