// Path: crates/telemetry/src/lib.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # DEIP Chain Telemetry
//!
//! Structured logging initialization and abstract metrics sinks, so the
//! chain pipeline can report what it does without depending on a metrics
//! backend.

/// The initialization routine for global structured logging.
pub mod init;
/// The `prometheus`-backed implementation of the metrics sinks.
pub mod prometheus;
/// Abstract traits (`*MetricsSink`) that define the contract for metrics reporting.
pub mod sinks;
/// A simple RAII timer for measuring the duration of a scope.
pub mod time;

pub use sinks::{chain_metrics, error_metrics};
