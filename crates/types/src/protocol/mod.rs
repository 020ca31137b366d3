// Path: crates/types/src/protocol/mod.rs
//! The protocol surface: operations, transactions, blocks and the scalar
//! types they are built from.

/// Returns `ValidationError::Constraint` with a formatted message unless the
/// condition holds.
macro_rules! ensure {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::ValidationError::Constraint(format!($($arg)+)));
        }
    };
}

/// Fungible asset amounts and symbols.
pub mod asset;
/// Authorities and required-authority sets.
pub mod authority;
/// Account names, external ids, time points, percents and field validators.
pub mod base;
/// Blocks and block headers.
pub mod block;
/// Content-derived identifiers and the merkle root.
pub mod digest;
/// The closed operation catalog.
pub mod operations;
/// Transactions and signed transactions.
pub mod transaction;

pub use asset::{Asset, AssetSymbol, DEIP_SYMBOL};
pub use authority::{Authority, AuthorityLevel, RequiredAuthorities};
pub use base::{AccountName, ExternalId, Percent, PublicKey, TimePointSec};
pub use block::{BlockHeader, SignedBlock};
pub use digest::{BlockId, MerkleRoot, TransactionId};
pub use operations::{Operation, OperationPayload};
pub use transaction::{FutureExtension, SignedTransaction, Transaction};
