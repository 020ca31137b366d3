// Path: crates/types/src/app/research.rs

use crate::keys::{
    ASSESSMENT_TABLE, RESEARCH_GROUP_MEMBERSHIP_TABLE, SECURITY_TOKEN_BALANCE_TABLE,
    SECURITY_TOKEN_TABLE,
};
use crate::object_id_accessors;
use crate::protocol::operations::AssessmentStage;
use crate::protocol::{AccountName, ExternalId, Percent, TimePointSec};
use crate::store::{IndexEntry, Object, ObjectId};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Membership of one account in one research group.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ResearchGroupMembershipObject {
    /// Primary id.
    pub id: ObjectId,
    /// The group's account.
    pub research_group: AccountName,
    /// The member's account.
    pub member: AccountName,
    /// Share of group rewards.
    pub weight: Percent,
    /// Researches the member takes part in; all when absent.
    pub researches: Option<BTreeSet<ExternalId>>,
    /// When the membership took effect.
    pub joined_at: TimePointSec,
}

impl Object for ResearchGroupMembershipObject {
    const TABLE: &'static [u8] = RESEARCH_GROUP_MEMBERSHIP_TABLE;
    const NAME: &'static str = "research_group_membership";
    object_id_accessors!();

    fn indexes(&self) -> Vec<IndexEntry> {
        vec![
            IndexEntry::unique("group_member", (&self.research_group, &self.member).encode()),
            IndexEntry::ordered("member", self.member.encode()),
        ]
    }
}

/// A staged review process.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct AssessmentObject {
    /// Primary id.
    pub id: ObjectId,
    /// Unique 160-bit id.
    pub external_id: ExternalId,
    /// The owner.
    pub creator: AccountName,
    /// Stages and their phases.
    pub stages: Vec<AssessmentStage>,
    /// Creation time.
    pub created_at: TimePointSec,
}

impl Object for AssessmentObject {
    const TABLE: &'static [u8] = ASSESSMENT_TABLE;
    const NAME: &'static str = "assessment";
    object_id_accessors!();

    fn indexes(&self) -> Vec<IndexEntry> {
        vec![IndexEntry::unique("external_id", self.external_id.encode())]
    }
}

/// A research's security token.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct SecurityTokenObject {
    /// Primary id.
    pub id: ObjectId,
    /// Unique 160-bit id.
    pub external_id: ExternalId,
    /// The tokenized research.
    pub research_external_id: ExternalId,
    /// The account the supply was minted to.
    pub issuer: AccountName,
    /// Units minted.
    pub total_amount: u32,
}

impl Object for SecurityTokenObject {
    const TABLE: &'static [u8] = SECURITY_TOKEN_TABLE;
    const NAME: &'static str = "security_token";
    object_id_accessors!();

    fn indexes(&self) -> Vec<IndexEntry> {
        vec![IndexEntry::unique("external_id", self.external_id.encode())]
    }
}

/// One holder's units of one security token.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct SecurityTokenBalanceObject {
    /// Primary id.
    pub id: ObjectId,
    /// The token.
    pub security_token_external_id: ExternalId,
    /// The holder.
    pub owner: AccountName,
    /// Units held.
    pub amount: u32,
}

impl Object for SecurityTokenBalanceObject {
    const TABLE: &'static [u8] = SECURITY_TOKEN_BALANCE_TABLE;
    const NAME: &'static str = "security_token_balance";
    object_id_accessors!();

    fn indexes(&self) -> Vec<IndexEntry> {
        vec![
            IndexEntry::unique(
                "token_owner",
                (&self.security_token_external_id, &self.owner).encode(),
            ),
            IndexEntry::ordered("owner", self.owner.encode()),
        ]
    }
}
