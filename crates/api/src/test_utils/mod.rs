// Path: crates/api/src/test_utils/mod.rs
//! In-memory doubles for the API seams.

use crate::authority::AuthorityVerifier;
use crate::interpreter::CustomOperationInterpreter;
use crate::state::StateAccess;
use deip_types::error::InterpreterError;
use deip_types::protocol::operations::{CustomBinaryOperation, CustomJsonOperation};
use deip_types::protocol::{AccountName, Authority, AuthorityLevel, PublicKey, SignedTransaction};
use parking_lot::Mutex;
use std::collections::BTreeSet;

/// Treats every authority as covered.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllVerifier;

impl AuthorityVerifier for AllowAllVerifier {
    fn is_covered(
        &self,
        _trx: &SignedTransaction,
        _account: &AccountName,
        _authority: &Authority,
        _level: AuthorityLevel,
    ) -> bool {
        true
    }

    fn has_key_signature(&self, _trx: &SignedTransaction, _key: &PublicKey) -> bool {
        true
    }
}

/// Reads each signature as the literal public key that produced it, then
/// checks key weights against the authority.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainKeyVerifier;

impl PlainKeyVerifier {
    fn signing_keys(trx: &SignedTransaction) -> BTreeSet<PublicKey> {
        trx.signatures.iter().map(|s| PublicKey::new(s.as_str())).collect()
    }
}

impl AuthorityVerifier for PlainKeyVerifier {
    fn is_covered(
        &self,
        trx: &SignedTransaction,
        _account: &AccountName,
        authority: &Authority,
        _level: AuthorityLevel,
    ) -> bool {
        authority.is_satisfied_by_keys(&Self::signing_keys(trx))
    }

    fn has_key_signature(&self, trx: &SignedTransaction, key: &PublicKey) -> bool {
        Self::signing_keys(trx).contains(key)
    }
}

/// Appends each payload under the key `<n>` of its namespace and fails on
/// demand.
///
/// A JSON payload of the form `{"fail": "<reason>"}`, or a binary payload
/// starting with `0xff`, is rejected with that reason.
#[derive(Debug)]
pub struct RecordingInterpreter {
    id: String,
    applied: Mutex<Vec<Vec<u8>>>,
}

impl RecordingInterpreter {
    /// An interpreter for `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            applied: Mutex::new(Vec::new()),
        }
    }

    /// The raw store prefix its entries end up under.
    pub fn prefix(&self) -> Vec<u8> {
        deip_types::keys::custom_namespace(&self.id)
    }

    /// Every payload applied so far, including ones later reverted.
    pub fn applied(&self) -> Vec<Vec<u8>> {
        self.applied.lock().clone()
    }

    fn append(&self, state: &mut dyn StateAccess, payload: &[u8]) -> Result<(), InterpreterError> {
        let n = state
            .prefix_scan(b"")
            .map_err(|e| InterpreterError(e.to_string()))?
            .count();
        let key = format!("{:08}", n).into_bytes();
        state
            .insert(&key, payload)
            .map_err(|e| InterpreterError(e.to_string()))?;
        self.applied.lock().push(payload.to_vec());
        Ok(())
    }
}

impl CustomOperationInterpreter for RecordingInterpreter {
    fn id(&self) -> &str {
        &self.id
    }

    fn apply_json(
        &self,
        state: &mut dyn StateAccess,
        op: &CustomJsonOperation,
    ) -> Result<(), InterpreterError> {
        let value: serde_json::Value =
            serde_json::from_str(&op.json).map_err(|e| InterpreterError(e.to_string()))?;
        if let Some(reason) = value.get("fail").and_then(|v| v.as_str()) {
            return Err(InterpreterError(reason.to_string()));
        }
        self.append(state, op.json.as_bytes())
    }

    fn apply_binary(
        &self,
        state: &mut dyn StateAccess,
        op: &CustomBinaryOperation,
    ) -> Result<(), InterpreterError> {
        if op.data.first() == Some(&0xff) {
            return Err(InterpreterError("rejected binary payload".into()));
        }
        self.append(state, &op.data)
    }

    fn operation_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "json": { "type": "object" },
            "binary": { "type": "bytes" },
        })
    }
}
