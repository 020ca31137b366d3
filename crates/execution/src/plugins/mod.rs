// Path: crates/execution/src/plugins/mod.rs
//! Observers that index notifications outside the ledger.

/// Per-account operation history.
pub mod account_history;

pub use account_history::{AccountHistory, AccountHistoryError};
