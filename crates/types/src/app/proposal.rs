// Path: crates/types/src/app/proposal.rs

use super::time_key;
use crate::keys::PROPOSAL_TABLE;
use crate::object_id_accessors;
use crate::protocol::operations::OpWrapper;
use crate::protocol::{AccountName, ExternalId, PublicKey, TimePointSec};
use crate::store::{IndexEntry, Object, ObjectId};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Lifecycle of a proposal.
#[derive(
    Encode, Decode, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    /// Collecting approvals, or approved but failing to execute.
    #[default]
    Pending,
    /// Executed successfully.
    Approved,
}

/// A batch of operations waiting for approvals.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ProposalObject {
    /// Primary id.
    pub id: ObjectId,
    /// Unique 160-bit id.
    pub external_id: ExternalId,
    /// The proposing account.
    pub proposer: AccountName,
    /// The batch.
    pub proposed_ops: Vec<OpWrapper>,
    /// Removal time.
    pub expiration_time: TimePointSec,
    /// From this time on approvals may only be removed, and execution waits
    /// for it to pass.
    pub review_period_time: Option<TimePointSec>,
    /// Accounts whose active approval is needed.
    pub required_active_approvals: BTreeSet<AccountName>,
    /// Accounts whose owner approval is needed.
    pub required_owner_approvals: BTreeSet<AccountName>,
    /// Accounts that approved with active authority.
    pub available_active_approvals: BTreeSet<AccountName>,
    /// Accounts that approved with owner authority.
    pub available_owner_approvals: BTreeSet<AccountName>,
    /// Keys that approved directly.
    pub available_key_approvals: BTreeSet<PublicKey>,
    /// Lifecycle state.
    pub status: ProposalStatus,
    /// Why the last execution attempt failed.
    pub fail_reason: Option<String>,
    /// Creation time.
    pub created_at: TimePointSec,
}

impl ProposalObject {
    /// Whether `account` approved at either level.
    pub fn is_approved_by(&self, account: &AccountName) -> bool {
        self.available_active_approvals.contains(account)
            || self.available_owner_approvals.contains(account)
    }
}

impl Object for ProposalObject {
    const TABLE: &'static [u8] = PROPOSAL_TABLE;
    const NAME: &'static str = "proposal";
    object_id_accessors!();

    fn indexes(&self) -> Vec<IndexEntry> {
        vec![
            IndexEntry::unique("external_id", self.external_id.encode()),
            IndexEntry::ordered("expiration", time_key(self.expiration_time)),
        ]
    }
}
