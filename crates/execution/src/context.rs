// Path: crates/execution/src/context.rs

use crate::interpreters::InterpreterRegistry;
use deip_services::DbServices;
use deip_state::ObjectStore;
use deip_types::config::ChainConfig;
use deip_types::protocol::{Operation, TimePointSec};

/// An operation that took effect, in application order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedOperation {
    pub op: Operation,
    /// Index of the submitted operation this one belongs to. Operations a
    /// proposal executes share the index of the operation that ran it.
    pub op_in_trx: u16,
    /// Synthesized by the core rather than submitted.
    pub is_virtual: bool,
}

/// Everything an evaluator may consult or change.
///
/// There is no global database handle: the pipeline builds one context per
/// transaction (and one for block-boundary housekeeping) and threads it
/// through every evaluator call.
#[derive(Debug)]
pub struct EvaluationContext<'a> {
    /// Facades over the store being mutated.
    pub db: DbServices<'a>,
    pub config: &'a ChainConfig,
    pub interpreters: &'a InterpreterRegistry,
    /// The time every time-dependent rule compares against.
    pub now: TimePointSec,
    /// Height of the block the operations belong to.
    pub block_num: u32,
    op_in_trx: u16,
    applied: Vec<AppliedOperation>,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(
        store: &'a mut ObjectStore,
        config: &'a ChainConfig,
        interpreters: &'a InterpreterRegistry,
        now: TimePointSec,
        block_num: u32,
    ) -> Self {
        Self {
            db: DbServices::new(store),
            config,
            interpreters,
            now,
            block_num,
            op_in_trx: 0,
            applied: Vec::new(),
        }
    }

    /// Marks the start of the submitted operation at `index`. Everything
    /// recorded until the next call carries that index.
    pub fn begin_operation(&mut self, index: usize) {
        self.op_in_trx = u16::try_from(index).unwrap_or(u16::MAX);
    }

    /// Appends a submitted (or proposed) operation to the applied list.
    pub fn record(&mut self, op: Operation) {
        self.applied.push(AppliedOperation {
            op,
            op_in_trx: self.op_in_trx,
            is_virtual: false,
        });
    }

    /// Appends a virtual operation to the applied list.
    pub fn record_virtual(&mut self, op: Operation) {
        self.applied.push(AppliedOperation {
            op,
            op_in_trx: self.op_in_trx,
            is_virtual: true,
        });
    }

    pub fn applied_len(&self) -> usize {
        self.applied.len()
    }

    /// Forgets operations recorded after the first `len`, when the session
    /// that applied them is reverted.
    pub fn truncate_applied(&mut self, len: usize) {
        self.applied.truncate(len);
    }

    pub fn applied(&self) -> &[AppliedOperation] {
        &self.applied
    }

    pub fn into_applied(self) -> Vec<AppliedOperation> {
        self.applied
    }
}
