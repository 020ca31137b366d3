// Path: crates/api/src/authority/mod.rs
//! The signature verifier seam.
//!
//! The core never inspects signatures itself. It asks the verifier whether a
//! transaction's signatures satisfy one account authority or one key, and
//! turns a `false` into an `AuthorityError`.

use deip_types::protocol::{AccountName, Authority, AuthorityLevel, PublicKey, SignedTransaction};

/// Answers "are these signatures enough?" questions.
pub trait AuthorityVerifier: Send + Sync {
    /// Whether `trx`'s signatures satisfy `authority`, the `level` authority
    /// of `account` as currently stored.
    fn is_covered(
        &self,
        trx: &SignedTransaction,
        account: &AccountName,
        authority: &Authority,
        level: AuthorityLevel,
    ) -> bool;

    /// Whether `trx` carries a valid signature by `key`.
    fn has_key_signature(&self, trx: &SignedTransaction, key: &PublicKey) -> bool;
}
