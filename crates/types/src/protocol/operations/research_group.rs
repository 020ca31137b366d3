// Path: crates/types/src/protocol/operations/research_group.rs

use super::OperationPayload;
use crate::config::{DEIP_100_PERCENT, DEIP_1_PERCENT};
use crate::error::ValidationError;
use crate::protocol::base::{AccountName, ExternalId, Percent};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Adds `member` to a research group. Both sides must sign.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct JoinResearchGroupMembershipOperation {
    /// The joining account.
    pub member: AccountName,
    /// The research group's account.
    pub research_group: AccountName,
    /// The member's share of group rewards, in `[1%, 100%)`.
    pub weight: Percent,
    /// Whether the group invited the member (as opposed to a join request).
    pub is_invitation: bool,
    /// Researches the member joins; all of the group's when absent.
    pub researches: Option<BTreeSet<ExternalId>>,
}

impl OperationPayload for JoinResearchGroupMembershipOperation {
    fn validate(&self) -> Result<(), ValidationError> {
        self.member.validate()?;
        self.research_group.validate()?;
        let min = Percent(DEIP_1_PERCENT);
        let max = Percent(DEIP_100_PERCENT);
        ensure!(
            self.weight >= min && self.weight < max,
            "Research group weight should be in range of {} - {}. Provided value: {}.",
            min,
            max,
            self.weight
        );
        if let Some(researches) = &self.researches {
            for research in researches {
                research.validate("researches")?;
            }
        }
        Ok(())
    }

    fn required_active_authorities(&self, out: &mut BTreeSet<AccountName>) {
        out.insert(self.member.clone());
        out.insert(self.research_group.clone());
    }
}

/// Removes `member` from a research group, either by the member leaving or
/// by the group excluding them.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct LeaveResearchGroupMembershipOperation {
    /// The departing account.
    pub member: AccountName,
    /// The research group's account.
    pub research_group: AccountName,
    /// Set when the group removes the member.
    pub is_exclusion: bool,
}

impl OperationPayload for LeaveResearchGroupMembershipOperation {
    fn validate(&self) -> Result<(), ValidationError> {
        self.member.validate()?;
        self.research_group.validate()?;
        ensure!(
            self.member != self.research_group,
            "A research group cannot leave itself"
        );
        Ok(())
    }

    fn required_active_authorities(&self, out: &mut BTreeSet<AccountName>) {
        if self.is_exclusion {
            out.insert(self.research_group.clone());
        } else {
            out.insert(self.member.clone());
        }
    }

    fn impacted_accounts(&self, out: &mut BTreeSet<AccountName>) {
        out.insert(self.member.clone());
        out.insert(self.research_group.clone());
    }
}
