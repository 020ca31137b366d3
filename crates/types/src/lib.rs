// Path: crates/types/src/lib.rs
#![forbid(unsafe_code)]
#![warn(missing_docs)]
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
//! # DEIP Chain Types
//!
//! Foundational data structures for the DEIP chain core: the closed
//! operation catalog with its static validation and authority contracts,
//! transactions and blocks, the persistent record kinds kept in the object
//! store, chain configuration, and the shared error taxonomy.
//!
//! This crate performs no I/O and has no knowledge of storage or execution.

/// Persistent record kinds and the operation notification view.
pub mod app;
/// Canonical, deterministic binary codec (SCALE).
pub mod codec;
/// Chain constants and the runtime `ChainConfig`.
pub mod config;
/// The error taxonomy shared by every crate in the workspace.
pub mod error;
/// Table prefixes for the object store key space.
pub mod keys;
/// A curated set of the most commonly used types.
pub mod prelude;
/// Operations, transactions, blocks and their supporting protocol types.
pub mod protocol;
/// The `Object` contract implemented by every persistent record kind.
pub mod store;
