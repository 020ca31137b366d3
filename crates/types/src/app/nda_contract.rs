// Path: crates/types/src/app/nda_contract.rs

use crate::keys::NDA_CONTRACT_TABLE;
use crate::object_id_accessors;
use crate::protocol::{AccountName, ExternalId, TimePointSec};
use crate::store::{IndexEntry, Object, ObjectId};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Lifecycle of an NDA contract.
#[derive(
    Encode, Decode, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum NdaContractStatus {
    /// Waiting for one or both signatures.
    #[default]
    Pending,
    /// Signed by both parties.
    Signed,
}

/// A one-way non-disclosure agreement.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct NdaContractObject {
    /// Primary id.
    pub id: ObjectId,
    /// Unique 160-bit id.
    pub external_id: ExternalId,
    /// The creating account.
    pub creator: AccountName,
    /// The disclosing side.
    pub party_a: AccountName,
    /// `party_a`'s signature once given.
    pub party_a_signature: Option<String>,
    /// The receiving side.
    pub party_b: AccountName,
    /// `party_b`'s signature once given.
    pub party_b_signature: Option<String>,
    /// Parties disclosing information.
    pub disclosing_party: BTreeSet<AccountName>,
    /// Title.
    pub title: String,
    /// 256-bit hash of the agreement text.
    pub contract_hash: String,
    /// Creation time.
    pub created_at: TimePointSec,
    /// Effective from.
    pub start_time: TimePointSec,
    /// Effective until.
    pub end_time: TimePointSec,
    /// Lifecycle state.
    pub status: NdaContractStatus,
}

impl NdaContractObject {
    /// Whether `account` is one of the two parties.
    pub fn is_party(&self, account: &AccountName) -> bool {
        &self.party_a == account || &self.party_b == account
    }
}

impl Object for NdaContractObject {
    const TABLE: &'static [u8] = NDA_CONTRACT_TABLE;
    const NAME: &'static str = "nda_contract";
    object_id_accessors!();

    fn indexes(&self) -> Vec<IndexEntry> {
        vec![IndexEntry::unique("external_id", self.external_id.encode())]
    }
}
