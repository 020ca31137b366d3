// Path: crates/types/src/protocol/transaction.rs

use super::authority::RequiredAuthorities;
use super::base::TimePointSec;
use super::digest::{BlockId, TransactionId};
use super::operations::Operation;
use crate::error::TransactionError;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Reserved for future protocol extensions. Carries nothing today.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FutureExtension {
    /// The empty extension.
    Void,
}

/// An ordered batch of operations applied atomically.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Transaction {
    /// Low 16 bits of a recent block number.
    pub ref_block_num: u16,
    /// Second 32-bit word of that block's id.
    pub ref_block_prefix: u32,
    /// After this time the transaction can no longer be included.
    pub expiration: TimePointSec,
    /// The operations, applied in order.
    pub operations: Vec<Operation>,
    /// Reserved.
    pub extensions: Vec<FutureExtension>,
}

impl Transaction {
    /// The content-derived id. Signatures do not contribute.
    pub fn id(&self) -> TransactionId {
        TransactionId::from_encoded(&self.encode())
    }

    /// Points the transaction's TaPoS reference at `block`.
    pub fn set_reference_block(&mut self, block: &BlockId) {
        self.ref_block_num = (block.num() & 0xffff) as u16;
        self.ref_block_prefix = block.prefix();
    }

    /// Static checks: non-empty, no virtual operations, every operation valid.
    pub fn validate(&self) -> Result<(), TransactionError> {
        if self.operations.is_empty() {
            return Err(TransactionError::Empty);
        }
        for (index, op) in self.operations.iter().enumerate() {
            if op.is_virtual() {
                return Err(TransactionError::VirtualOperation { index });
            }
            op.validate()
                .map_err(|source| TransactionError::Validation { index, source })?;
        }
        Ok(())
    }

    /// The union of the operations' required authorities, owner winning over
    /// active across operations too.
    pub fn required_authorities(&self) -> RequiredAuthorities {
        let mut req = RequiredAuthorities::default();
        for op in &self.operations {
            req.extend(op.required_authorities());
        }
        req.normalized()
    }
}

/// A transaction with its signatures attached.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct SignedTransaction {
    /// The signed content.
    pub transaction: Transaction,
    /// Opaque signatures; their meaning belongs to the authority verifier.
    pub signatures: Vec<String>,
}

impl SignedTransaction {
    /// Wraps an unsigned transaction.
    pub fn new(transaction: Transaction) -> Self {
        Self {
            transaction,
            signatures: Vec::new(),
        }
    }
}

impl Deref for SignedTransaction {
    type Target = Transaction;

    fn deref(&self) -> &Self::Target {
        &self.transaction
    }
}
