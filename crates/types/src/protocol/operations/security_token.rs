// Path: crates/types/src/protocol/operations/security_token.rs

use super::OperationPayload;
use crate::error::ValidationError;
use crate::protocol::base::{validate_memo, AccountName, ExternalId};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Mints the security tokens of a research to its owner.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateSecurityTokenOperation {
    /// 160-bit id of the token.
    pub external_id: ExternalId,
    /// 160-bit id of the tokenized research.
    pub research_external_id: ExternalId,
    /// The initial holder.
    pub owner: AccountName,
    /// Units minted.
    pub amount: u32,
}

impl OperationPayload for CreateSecurityTokenOperation {
    fn validate(&self) -> Result<(), ValidationError> {
        self.external_id.validate("external_id")?;
        self.research_external_id.validate("research_external_id")?;
        self.owner.validate()?;
        ensure!(self.amount > 0, "Security token amount must be greater than 0");
        Ok(())
    }

    fn required_active_authorities(&self, out: &mut BTreeSet<AccountName>) {
        out.insert(self.owner.clone());
    }
}

/// Moves security token units between holders.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct TransferSecurityTokenOperation {
    /// The debited holder.
    pub from: AccountName,
    /// The credited holder.
    pub to: AccountName,
    /// Which token.
    pub security_token_external_id: ExternalId,
    /// Units moved.
    pub amount: u32,
    /// Free-form note.
    pub memo: String,
}

impl OperationPayload for TransferSecurityTokenOperation {
    fn validate(&self) -> Result<(), ValidationError> {
        self.from.validate()?;
        self.to.validate()?;
        ensure!(self.from != self.to, "Cannot transfer to self");
        self.security_token_external_id
            .validate("security_token_external_id")?;
        ensure!(self.amount > 0, "Cannot transfer a zero amount");
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
