// Path: crates/types/src/protocol/operations/virtual_ops.rs
//! Operations the core synthesizes during block processing. They are
//! published to observers but can never appear in a submitted transaction.

use super::OperationPayload;
use crate::error::ValidationError;
use crate::protocol::asset::Asset;
use crate::protocol::base::{AccountName, ExternalId};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

fn not_submittable(name: &str) -> ValidationError {
    ValidationError::Constraint(format!("Virtual operation '{}' cannot be submitted", name))
}

/// Block producer payout, emitted once per block when a reward is configured.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ProducerRewardOperation {
    /// The block's producer.
    pub producer: AccountName,
    /// The amount credited.
    pub reward: Asset,
}

impl OperationPayload for ProducerRewardOperation {
    fn validate(&self) -> Result<(), ValidationError> {
        Err(not_submittable("producer_reward"))
    }

    fn impacted_accounts(&self, out: &mut BTreeSet<AccountName>) {
        out.insert(self.producer.clone());
    }

    fn is_virtual(&self) -> bool {
        true
    }
}

/// A pending proposal reached its expiration time and was removed.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ProposalExpiredOperation {
    /// The removed proposal.
    pub external_id: ExternalId,
    /// The proposer.
    pub creator: AccountName,
}

impl OperationPayload for ProposalExpiredOperation {
    fn validate(&self) -> Result<(), ValidationError> {
        Err(not_submittable("proposal_expired"))
    }

    fn impacted_accounts(&self, out: &mut BTreeSet<AccountName>) {
        out.insert(self.creator.clone());
    }

    fn is_virtual(&self) -> bool {
        true
    }
}
