// Path: crates/execution/src/lib.rs
//! # DEIP Chain Execution Crate Lints
//!
//! This crate enforces a strict set of lints to ensure high-quality,
//! panic-free code. Panics are disallowed in non-test code; every failure is
//! reported as a typed error from `deip-types`.
#![forbid(unsafe_code)]
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
//! # DEIP Chain Execution
//!
//! The state-transition side of the chain core: one evaluator per operation
//! kind behind an exhaustive dispatcher, the transaction and block pipeline
//! with its undo sessions, block-boundary housekeeping, and the notification
//! bus that feeds observers such as the account history plugin.

/// Returns `EvaluationError::Precondition` from the enclosing function when
/// the condition is false.
macro_rules! ensure {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err(deip_types::error::EvaluationError::Precondition(format!($($arg)+)));
        }
    };
}

/// Transaction-level authority checks against the signature verifier.
pub mod authority;
/// The `Database`: block and transaction pipeline over the shared store.
pub mod chain;
/// The explicit context evaluators run against.
pub mod context;
/// One evaluator per operation kind and the dispatcher.
pub mod evaluators;
/// The registry of custom operation interpreters.
pub mod interpreters;
/// The operation notification bus.
pub mod notify;
/// Observers shipped with the core.
pub mod plugins;

pub use chain::Database;
pub use context::{AppliedOperation, EvaluationContext};
pub use evaluators::{apply_operation, Evaluator};
pub use interpreters::InterpreterRegistry;
pub use notify::NotificationBus;
