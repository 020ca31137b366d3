// Path: crates/telemetry/src/time.rs
use crate::sinks::ChainMetricsSink;
use std::time::Instant;

/// Reports the lifetime of the guard as the duration of one operation.
pub struct Timer<'a> {
    sink: &'a dyn ChainMetricsSink,
    operation: &'static str,
    start: Instant,
}

impl<'a> Timer<'a> {
    pub fn new(sink: &'a dyn ChainMetricsSink, operation: &'static str) -> Self {
        Self {
            sink,
            operation,
            start: Instant::now(),
        }
    }
}

impl Drop for Timer<'_> {
    fn drop(&mut self) {
        self.sink
            .observe_operation_duration(self.operation, self.start.elapsed().as_secs_f64());
    }
}
