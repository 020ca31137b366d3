// Path: crates/telemetry/src/prometheus.rs
//! A concrete implementation of the metrics sinks using the Prometheus crate.

use crate::sinks::*;
use once_cell::sync::OnceCell;
use prometheus::{
    exponential_buckets, register_gauge, register_histogram_vec, register_int_counter,
    register_int_counter_vec, Gauge, HistogramVec, IntCounter, IntCounterVec,
};

// --- Metric Statics ---
// Each collector is set exactly once by `install`.

static BLOCKS_APPLIED_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static BLOCKS_POPPED_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static REVERSIBLE_BLOCKS: OnceCell<Gauge> = OnceCell::new();
static TRANSACTIONS_APPLIED_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static TRANSACTIONS_REJECTED_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static OPERATION_DURATION_SECONDS: OnceCell<HistogramVec> = OnceCell::new();
static OBSERVER_FAILURES_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static ERRORS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();

/// Records into the default Prometheus registry.
#[derive(Debug, Clone, Copy)]
pub struct PrometheusSink;

/// Runs the body with the collector if `install` has run; otherwise the
/// sample is dropped.
macro_rules! with_metric {
    ($metric:ident, |$m:ident| $body:expr) => {
        if let Some($m) = $metric.get() {
            $body;
        }
    };
}

impl ChainMetricsSink for PrometheusSink {
    fn inc_blocks_applied(&self) {
        with_metric!(BLOCKS_APPLIED_TOTAL, |m| m.inc());
    }
    fn inc_blocks_popped(&self) {
        with_metric!(BLOCKS_POPPED_TOTAL, |m| m.inc());
    }
    fn set_reversible_blocks(&self, count: u64) {
        with_metric!(REVERSIBLE_BLOCKS, |m| m.set(count as f64));
    }
    fn inc_transactions_applied(&self) {
        with_metric!(TRANSACTIONS_APPLIED_TOTAL, |m| m.inc());
    }
    fn inc_transactions_rejected(&self, code: &'static str) {
        with_metric!(TRANSACTIONS_REJECTED_TOTAL, |m| m
            .with_label_values(&[code])
            .inc());
    }
    fn observe_operation_duration(&self, operation: &'static str, duration_secs: f64) {
        with_metric!(OPERATION_DURATION_SECONDS, |m| m
            .with_label_values(&[operation])
            .observe(duration_secs));
    }
    fn inc_observer_failures(&self, observer: &str) {
        with_metric!(OBSERVER_FAILURES_TOTAL, |m| m
            .with_label_values(&[observer])
            .inc());
    }
}

impl ErrorMetricsSink for PrometheusSink {
    fn inc_error(&self, kind: &'static str, code: &'static str) {
        with_metric!(ERRORS_TOTAL, |m| m.with_label_values(&[kind, code]).inc());
    }
}

fn set_once<T>(cell: &OnceCell<T>, value: T) -> Result<(), prometheus::Error> {
    cell.set(value).map_err(|_| prometheus::Error::AlreadyReg)
}

/// Registers every collector with the default registry and installs
/// [`PrometheusSink`] as the global sink. Fails if called twice.
pub fn install() -> Result<&'static dyn MetricsSink, prometheus::Error> {
    set_once(
        &BLOCKS_APPLIED_TOTAL,
        register_int_counter!(
            "deip_chain_blocks_applied_total",
            "Total number of blocks applied on top of the head."
        )?,
    )?;
    set_once(
        &BLOCKS_POPPED_TOTAL,
        register_int_counter!(
            "deip_chain_blocks_popped_total",
            "Total number of blocks undone by fork switches."
        )?,
    )?;
    set_once(
        &REVERSIBLE_BLOCKS,
        register_gauge!(
            "deip_chain_reversible_blocks",
            "Number of applied blocks that can still be undone."
        )?,
    )?;
    set_once(
        &TRANSACTIONS_APPLIED_TOTAL,
        register_int_counter!(
            "deip_chain_transactions_applied_total",
            "Total number of applied transactions."
        )?,
    )?;
    set_once(
        &TRANSACTIONS_REJECTED_TOTAL,
        register_int_counter_vec!(
            "deip_chain_transactions_rejected_total",
            "Total number of rejected transactions, by error code.",
            &["code"]
        )?,
    )?;
    set_once(
        &OPERATION_DURATION_SECONDS,
        register_histogram_vec!(
            "deip_chain_operation_duration_seconds",
            "Latency of evaluating one operation.",
            &["operation"],
            exponential_buckets(0.00001, 2.0, 16)?
        )?,
    )?;
    set_once(
        &OBSERVER_FAILURES_TOTAL,
        register_int_counter_vec!(
            "deip_chain_observer_failures_total",
            "Total number of operation observer failures, by observer.",
            &["observer"]
        )?,
    )?;
    set_once(
        &ERRORS_TOTAL,
        register_int_counter_vec!(
            "deip_errors_total",
            "Total number of errors, categorized by kind and code.",
            &["kind", "code"]
        )?,
    )?;

    static PROMETHEUS_SINK: PrometheusSink = PrometheusSink;
    SINK.set(&PROMETHEUS_SINK)
        .map_err(|_| prometheus::Error::AlreadyReg)?;
    Ok(&PROMETHEUS_SINK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_registers_once() {
        let sink = install().unwrap();
        sink.as_chain().inc_transactions_rejected("TX_DUPLICATE");
        sink.as_chain().observe_operation_duration("transfer", 0.001);
        sink.as_error().inc_error("transaction", "TX_DUPLICATE");
        assert_eq!(
            TRANSACTIONS_REJECTED_TOTAL
                .get()
                .unwrap()
                .with_label_values(&["TX_DUPLICATE"])
                .get(),
            1
        );
        assert!(install().is_err());
    }
}
