// Path: crates/types/src/protocol/operations/account.rs

use super::OperationPayload;
use crate::error::ValidationError;
use crate::protocol::asset::{Asset, DEIP_SYMBOL};
use crate::protocol::authority::Authority;
use crate::protocol::base::{validate_json, validate_memo, AccountName, PublicKey};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Creates a new account funded by `creator`.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateAccountOperation {
    /// Paid by the creator and credited to the new account.
    pub fee: Asset,
    /// The funding account.
    pub creator: AccountName,
    /// The name to register.
    pub new_account_name: AccountName,
    /// Account-control authority.
    pub owner: Authority,
    /// Day-to-day signing authority.
    pub active: Authority,
    /// Key used to encrypt memos.
    pub memo_key: PublicKey,
    /// Free-form JSON metadata.
    pub json_metadata: Option<String>,
}

impl OperationPayload for CreateAccountOperation {
    fn validate(&self) -> Result<(), ValidationError> {
        self.creator.validate()?;
        self.new_account_name.validate()?;
        ensure!(self.fee.symbol == DEIP_SYMBOL, "Account creation fee must be {}", DEIP_SYMBOL);
        ensure!(self.fee.amount >= 0, "Account creation fee cannot be negative");
        self.owner.validate()?;
        self.active.validate()?;
        self.memo_key.validate()?;
        if let Some(json) = &self.json_metadata {
            validate_json("JSON metadata", json)?;
        }
        Ok(())
    }

    fn required_active_authorities(&self, out: &mut BTreeSet<AccountName>) {
        out.insert(self.creator.clone());
    }

    fn impacted_accounts(&self, out: &mut BTreeSet<AccountName>) {
        out.insert(self.creator.clone());
        out.insert(self.new_account_name.clone());
    }
}

/// Replaces an account's authorities or metadata. Changing the owner
/// authority requires the current owner authority.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdateAccountOperation {
    /// The account being updated.
    pub account: AccountName,
    /// New owner authority, if changing.
    pub owner: Option<Authority>,
    /// New active authority, if changing.
    pub active: Option<Authority>,
    /// New memo key, if changing.
    pub memo_key: Option<PublicKey>,
    /// New metadata, if changing.
    pub json_metadata: Option<String>,
}

impl OperationPayload for UpdateAccountOperation {
    fn validate(&self) -> Result<(), ValidationError> {
        self.account.validate()?;
        if let Some(owner) = &self.owner {
            owner.validate()?;
        }
        if let Some(active) = &self.active {
            active.validate()?;
        }
        if let Some(key) = &self.memo_key {
            key.validate()?;
        }
        if let Some(json) = &self.json_metadata {
            validate_json("JSON metadata", json)?;
        }
        Ok(())
    }

    fn required_active_authorities(&self, out: &mut BTreeSet<AccountName>) {
        if self.owner.is_none() {
            out.insert(self.account.clone());
        }
    }

    fn required_owner_authorities(&self, out: &mut BTreeSet<AccountName>) {
        if self.owner.is_some() {
            out.insert(self.account.clone());
        }
    }
}

/// Moves an asset amount between two accounts.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct TransferOperation {
    /// The debited account.
    pub from: AccountName,
    /// The credited account.
    pub to: AccountName,
    /// Amount and asset.
    pub amount: Asset,
    /// Free-form note.
    pub memo: String,
}

impl OperationPayload for TransferOperation {
    fn validate(&self) -> Result<(), ValidationError> {
        self.from.validate()?;
        self.to.validate()?;
        ensure!(self.from != self.to, "Cannot transfer to self");
        ensure!(self.amount.amount > 0, "Cannot transfer a negative or zero amount");
        self.amount.symbol.validate()?;
        validate_memo(&self.memo)
    }

    fn required_active_authorities(&self, out: &mut BTreeSet<AccountName>) {
        out.insert(self.from.clone());
    }

    fn impacted_accounts(&self, out: &mut BTreeSet<AccountName>) {
        out.insert(self.from.clone());
        out.insert(self.to.clone());
    }
}
