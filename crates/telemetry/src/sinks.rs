// Path: crates/telemetry/src/sinks.rs
//! Defines abstract traits for metrics reporting, decoupling the chain core from the backend.

use once_cell::sync::OnceCell;

// --- Static Sink Access ---

/// A no-op sink for use in tests or when telemetry is disabled.
#[derive(Debug, Clone, Copy)]
pub struct NopSink;

/// The global `MetricsSink`, set at most once.
pub static SINK: OnceCell<&'static dyn MetricsSink> = OnceCell::new();
static NOP_SINK: NopSink = NopSink;

/// Returns the configured chain metrics sink, or a no-op sink if none is installed.
pub fn chain_metrics() -> &'static dyn ChainMetricsSink {
    SINK.get()
        .map_or(&NOP_SINK as &dyn ChainMetricsSink, |s| s.as_chain())
}

/// Returns the configured error metrics sink, or a no-op sink if none is installed.
pub fn error_metrics() -> &'static dyn ErrorMetricsSink {
    SINK.get()
        .map_or(&NOP_SINK as &dyn ErrorMetricsSink, |s| s.as_error())
}

// --- Trait Definitions ---

/// A sink for metrics of the transaction and block pipeline.
pub trait ChainMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments the counter of blocks applied on top of the head.
    fn inc_blocks_applied(&self);
    /// Increments the counter of blocks undone by a fork switch.
    fn inc_blocks_popped(&self);
    /// Sets the gauge of blocks that can still be undone.
    fn set_reversible_blocks(&self, count: u64);
    /// Increments the counter of applied transactions.
    fn inc_transactions_applied(&self);
    /// Increments the counter of rejected transactions, labeled by error code.
    fn inc_transactions_rejected(&self, code: &'static str);
    /// Observes how long one operation took to evaluate, labeled by operation name.
    fn observe_operation_duration(&self, operation: &'static str, duration_secs: f64);
    /// Increments the counter of operation observers that returned an error.
    fn inc_observer_failures(&self, observer: &str);
}
impl ChainMetricsSink for NopSink {
    fn inc_blocks_applied(&self) {}
    fn inc_blocks_popped(&self) {}
    fn set_reversible_blocks(&self, _count: u64) {}
    fn inc_transactions_applied(&self) {}
    fn inc_transactions_rejected(&self, _code: &'static str) {}
    fn observe_operation_duration(&self, _operation: &'static str, _duration_secs: f64) {}
    fn inc_observer_failures(&self, _observer: &str) {}
}

/// A sink for recording structured error metrics.
pub trait ErrorMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments a counter for a specific error, categorized by its kind and code.
    fn inc_error(&self, kind: &'static str, code: &'static str);
}
impl ErrorMetricsSink for NopSink {
    fn inc_error(&self, _kind: &'static str, _code: &'static str) {}
}

/// A unified sink implementing every domain trait, the single point of
/// implementation for a metrics backend.
pub trait MetricsSink: ChainMetricsSink + ErrorMetricsSink {
    /// This sink as a chain metrics sink.
    fn as_chain(&self) -> &dyn ChainMetricsSink;
    /// This sink as an error metrics sink.
    fn as_error(&self) -> &dyn ErrorMetricsSink;
}

impl<T> MetricsSink for T
where
    T: ChainMetricsSink + ErrorMetricsSink,
{
    fn as_chain(&self) -> &dyn ChainMetricsSink {
        self
    }
    fn as_error(&self) -> &dyn ErrorMetricsSink {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nop_sink_accepts_everything() {
        let sink: &dyn MetricsSink = &NopSink;
        sink.as_chain().inc_blocks_applied();
        sink.as_chain().inc_transactions_rejected("TX_EXPIRED");
        sink.as_error().inc_error("transaction", "TX_EXPIRED");
        // Whatever is installed, the accessors always hand out a sink.
        chain_metrics().set_reversible_blocks(0);
        error_metrics().inc_error("block", "BLOCK_NOTHING_TO_POP");
    }
}
