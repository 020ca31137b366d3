// Path: crates/types/src/app/award.rs

use crate::keys::{AWARD_TABLE, AWARD_WITHDRAWAL_REQUEST_TABLE};
use crate::object_id_accessors;
use crate::protocol::{AccountName, Asset, TimePointSec};
use crate::store::{IndexEntry, Object, ObjectId};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Lifecycle of an award.
#[derive(
    Encode, Decode, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum AwardStatus {
    /// Waiting for the awardee.
    #[default]
    Pending,
    /// Accepted; withdrawals may be requested.
    Approved,
    /// Declined; the escrow was refunded.
    Rejected,
}

/// A funding award held in escrow.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct AwardObject {
    /// Primary id.
    pub id: ObjectId,
    /// Unique award number.
    pub award_number: String,
    /// The funding opportunity.
    pub funding_opportunity_number: String,
    /// The funder.
    pub creator: AccountName,
    /// The recipient.
    pub awardee: AccountName,
    /// Escrowed amount.
    pub amount: Asset,
    /// Amount already paid out.
    pub withdrawn: i64,
    /// Lifecycle state.
    pub status: AwardStatus,
    /// Creation time.
    pub created_at: TimePointSec,
}

impl AwardObject {
    /// Escrow not yet paid out.
    pub fn remaining(&self) -> i64 {
        self.amount.amount.saturating_sub(self.withdrawn)
    }
}

impl Object for AwardObject {
    const TABLE: &'static [u8] = AWARD_TABLE;
    const NAME: &'static str = "award";
    object_id_accessors!();

    fn indexes(&self) -> Vec<IndexEntry> {
        vec![IndexEntry::unique("award_number", self.award_number.encode())]
    }
}

/// Lifecycle of a withdrawal request.
#[derive(
    Encode, Decode, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalRequestStatus {
    /// Waiting for the funder.
    #[default]
    Pending,
    /// Certified by the funder; ready to pay.
    Certified,
    /// Declined by the funder.
    Rejected,
    /// Paid out.
    Paid,
}

/// A request to draw on an approved award.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct AwardWithdrawalRequestObject {
    /// Primary id.
    pub id: ObjectId,
    /// Unique within the award.
    pub payment_number: String,
    /// The award drawn on.
    pub award_number: String,
    /// The awardee.
    pub requester: AccountName,
    /// Requested amount.
    pub amount: Asset,
    /// What the money is for.
    pub description: String,
    /// Hash of supporting documents.
    pub attachment: String,
    /// Lifecycle state.
    pub status: WithdrawalRequestStatus,
    /// Creation time.
    pub created_at: TimePointSec,
}

impl Object for AwardWithdrawalRequestObject {
    const TABLE: &'static [u8] = AWARD_WITHDRAWAL_REQUEST_TABLE;
    const NAME: &'static str = "award_withdrawal_request";
    object_id_accessors!();

    fn indexes(&self) -> Vec<IndexEntry> {
        vec![IndexEntry::unique(
            "award_payment",
            (&self.award_number, &self.payment_number).encode(),
        )]
    }
}
