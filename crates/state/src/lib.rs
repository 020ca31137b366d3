// Path: crates/state/src/lib.rs
#![forbid(unsafe_code)]
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::todo,
        clippy::unimplemented,
        clippy::indexing_slicing
    )
)]
//! # DEIP Chain State
//!
//! The in-memory object store every ledger record lives in. Records are
//! kept in one ordered key space, reachable by id and by the secondary
//! indexes they declare, and every write is journaled so nested undo
//! sessions can roll it back.

/// The typed, multiply-indexed object store.
pub mod store;
/// The byte-level undo journal under the store.
pub mod undo;

pub use store::ObjectStore;
pub use undo::{Checkpoint, UndoableState};
