// Path: crates/api/src/lib.rs

//! # DEIP Chain API Crate Lints
//!
//! Panics are disallowed in non-test code; every fallible path returns a
//! typed error from `deip-types`.
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
//! # DEIP Chain API
//!
//! The seams between the chain core and its collaborators: raw key-value
//! state access, the signature verifier that answers authority questions,
//! interpreters for custom operations, and operation observers.

/// The `AuthorityVerifier` seam.
pub mod authority;
/// The `CustomOperationInterpreter` seam.
pub mod interpreter;
/// The `OperationObserver` seam.
pub mod observer;
/// The `StateAccess` trait for raw key-value access.
pub mod state;
/// In-memory doubles for the seams, for tests and local tooling.
pub mod test_utils;

/// A curated set of the most commonly used traits and types.
pub mod prelude {
    pub use crate::authority::AuthorityVerifier;
    pub use crate::interpreter::CustomOperationInterpreter;
    pub use crate::observer::OperationObserver;
    pub use crate::state::{StateAccess, StateScanIter};
}
