// Path: crates/trifair-telemetry/src/lib.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::indexing_slicing
    )
)]

//! # Trifair Telemetry
//!
//! Observability infrastructure shared by every crate above
//! `trifair-types`: structured logging initialization, and metrics sink
//! traits decoupling instrumentation call sites from the backend.
//!
//! There is no HTTP metrics-scrape endpoint here: this service exposes no
//! HTTP surface at all (§1 Non-goals), so the exporter that scrapes
//! `prometheus::install`'s registry is wired up by whatever process embeds
//! this engine, not by this crate.

/// The initialization routine for global structured logging.
pub mod init;
/// The concrete implementation of metrics sinks using the `prometheus` crate.
pub mod prometheus;
/// Abstract traits (`*MetricsSink`) that define the contract for metrics reporting.
pub mod sinks;
/// A simple RAII timer for measuring the duration of a scope.
pub mod time;

pub use sinks::{engine_metrics, error_metrics};
