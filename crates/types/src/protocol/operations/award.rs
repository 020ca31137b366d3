// Path: crates/types/src/protocol/operations/award.rs

use super::OperationPayload;
use crate::error::ValidationError;
use crate::protocol::asset::Asset;
use crate::protocol::base::{validate_hex, validate_reference_number, AccountName, HASH_BITS};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Grants a funding award, escrowing `amount` from the creator.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateAwardOperation {
    /// Unique award number.
    pub award_number: String,
    /// The funding opportunity the award belongs to.
    pub funding_opportunity_number: String,
    /// The funder.
    pub creator: AccountName,
    /// The recipient.
    pub awardee: AccountName,
    /// Escrowed amount.
    pub amount: Asset,
}

impl OperationPayload for CreateAwardOperation {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_reference_number("award_number", &self.award_number)?;
        validate_reference_number("funding_opportunity_number", &self.funding_opportunity_number)?;
        self.creator.validate()?;
        self.awardee.validate()?;
        self.amount.symbol.validate()?;
        ensure!(self.amount.amount > 0, "Award amount must be > 0.");
        Ok(())
    }

    fn required_active_authorities(&self, out: &mut BTreeSet<AccountName>) {
        out.insert(self.creator.clone());
    }

    fn impacted_accounts(&self, out: &mut BTreeSet<AccountName>) {
        out.insert(self.creator.clone());
        out.insert(self.awardee.clone());
    }
}

/// The awardee accepts a pending award.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ApproveAwardOperation {
    /// The award.
    pub award_number: String,
    /// Must be the awardee.
    pub approver: AccountName,
}

impl OperationPayload for ApproveAwardOperation {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_reference_number("award_number", &self.award_number)?;
        self.approver.validate()
    }

    fn required_active_authorities(&self, out: &mut BTreeSet<AccountName>) {
        out.insert(self.approver.clone());
    }
}

/// The awardee declines a pending award; the escrow returns to the creator.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct RejectAwardOperation {
    /// The award.
    pub award_number: String,
    /// Must be the awardee.
    pub rejector: AccountName,
}

impl OperationPayload for RejectAwardOperation {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_reference_number("award_number", &self.award_number)?;
        self.rejector.validate()
    }

    fn required_active_authorities(&self, out: &mut BTreeSet<AccountName>) {
        out.insert(self.rejector.clone());
    }
}

/// The awardee asks to withdraw part of an approved award.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateAwardWithdrawalRequestOperation {
    /// Unique within the award.
    pub payment_number: String,
    /// The award drawn on.
    pub award_number: String,
    /// Must be the awardee.
    pub requester: AccountName,
    /// Requested amount, in the award's asset.
    pub amount: Asset,
    /// What the money is for.
    pub description: String,
    /// 256-bit hash of supporting documents.
    pub attachment: String,
}

impl OperationPayload for CreateAwardWithdrawalRequestOperation {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_reference_number("award_number", &self.award_number)?;
        validate_reference_number("payment_number", &self.payment_number)?;
        self.requester.validate()?;
        ensure!(self.amount.amount > 0, "Amount must be greater than 0");
        ensure!(!self.description.is_empty(), "Description must be specified");
        validate_hex("attachment", &self.attachment, HASH_BITS)
    }

    fn required_active_authorities(&self, out: &mut BTreeSet<AccountName>) {
        out.insert(self.requester.clone());
    }
}

/// The funder certifies a pending withdrawal request.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ApproveAwardWithdrawalRequestOperation {
    /// The request.
    pub payment_number: String,
    /// The award drawn on.
    pub award_number: String,
    /// Must be the award creator.
    pub approver: AccountName,
}

impl OperationPayload for ApproveAwardWithdrawalRequestOperation {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_reference_number("award_number", &self.award_number)?;
        validate_reference_number("payment_number", &self.payment_number)?;
        self.approver.validate()
    }

    fn required_active_authorities(&self, out: &mut BTreeSet<AccountName>) {
        out.insert(self.approver.clone());
    }
}

/// The funder declines a pending withdrawal request.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct RejectAwardWithdrawalRequestOperation {
    /// The request.
    pub payment_number: String,
    /// The award drawn on.
    pub award_number: String,
    /// Must be the award creator.
    pub rejector: AccountName,
}

impl OperationPayload for RejectAwardWithdrawalRequestOperation {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_reference_number("award_number", &self.award_number)?;
        validate_reference_number("payment_number", &self.payment_number)?;
        self.rejector.validate()
    }

    fn required_active_authorities(&self, out: &mut BTreeSet<AccountName>) {
        out.insert(self.rejector.clone());
    }
}

/// The funder releases a certified withdrawal to the awardee.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct PayAwardWithdrawalRequestOperation {
    /// The request.
    pub payment_number: String,
    /// The award drawn on.
    pub award_number: String,
    /// Must be the award creator.
    pub payer: AccountName,
}

impl OperationPayload for PayAwardWithdrawalRequestOperation {
    // Number formats are left to the evaluator's lookups here: a malformed
    // number simply names no request.
    fn validate(&self) -> Result<(), ValidationError> {
        ensure!(!self.award_number.is_empty(), "Award number must be specified");
        ensure!(!self.payment_number.is_empty(), "Payment number must be specified");
        self.payer.validate()
    }

    fn required_active_authorities(&self, out: &mut BTreeSet<AccountName>) {
        out.insert(self.payer.clone());
    }
}
