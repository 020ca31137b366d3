// Path: crates/types/src/app/chain.rs

use super::time_key;
use crate::keys::{
    BLOCK_SUMMARY_TABLE, DYNAMIC_GLOBAL_PROPERTIES_TABLE, EXPERTISE_STATS_TABLE,
    RECENT_ENTITY_TABLE, TRANSACTION_TABLE,
};
use crate::object_id_accessors;
use crate::protocol::{AccountName, Asset, BlockId, ExternalId, TimePointSec, TransactionId};
use crate::store::{IndexEntry, Object, ObjectId};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// The head-of-chain singleton.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct DynamicGlobalPropertyObject {
    /// Always the first id of its table.
    pub id: ObjectId,
    /// Height of the head block; zero before the first block.
    pub head_block_number: u32,
    /// Id of the head block; the zero id before the first block.
    pub head_block_id: BlockId,
    /// Timestamp of the head block.
    pub time: TimePointSec,
    /// Producer of the head block.
    pub current_witness: AccountName,
    /// Circulating supply of the core asset.
    pub current_supply: Asset,
    /// Highest block that can no longer be undone.
    pub last_irreversible_block_num: u32,
}

impl Object for DynamicGlobalPropertyObject {
    const TABLE: &'static [u8] = DYNAMIC_GLOBAL_PROPERTIES_TABLE;
    const NAME: &'static str = "dynamic_global_properties";
    object_id_accessors!();
}

/// Expertise used in one block, kept while it is inside the weekly window.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExpertiseSample {
    /// The block the expertise was used in.
    pub block_num: u32,
    /// The amount used.
    pub amount: i64,
}

/// Chain-wide expertise accounting.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ExpertiseStatsObject {
    /// Singleton id.
    pub id: ObjectId,
    /// All expertise ever used.
    pub total_used_expertise: i64,
    /// Expertise used in the block being applied; reset at every boundary.
    pub used_expertise_per_block: i64,
    /// Sum of `recent` over the rolling weekly window.
    pub used_expertise_last_week: i64,
    /// Non-zero per-block samples inside the window, oldest first.
    pub recent: Vec<ExpertiseSample>,
}

impl Object for ExpertiseStatsObject {
    const TABLE: &'static [u8] = EXPERTISE_STATS_TABLE;
    const NAME: &'static str = "expertise_stats";
    object_id_accessors!();
}

/// An external id recently taken by an entity, kept so that deleted entities
/// cannot be recreated under the same id while their history is fresh.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct RecentEntityObject {
    /// Primary id.
    pub id: ObjectId,
    /// The reserved id.
    pub external_id: ExternalId,
    /// When the reservation was taken.
    pub created_at: TimePointSec,
}

impl Object for RecentEntityObject {
    const TABLE: &'static [u8] = RECENT_ENTITY_TABLE;
    const NAME: &'static str = "recent_entity";
    object_id_accessors!();

    fn indexes(&self) -> Vec<IndexEntry> {
        vec![
            IndexEntry::unique("external_id", self.external_id.encode()),
            IndexEntry::ordered("created_at", time_key(self.created_at)),
        ]
    }
}

/// A transaction applied recently enough that a resubmission must be
/// rejected as a duplicate.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct TransactionObject {
    /// Primary id.
    pub id: ObjectId,
    /// Content id of the transaction.
    pub trx_id: TransactionId,
    /// The transaction's expiration; the record is dropped after it.
    pub expiration: TimePointSec,
}

impl Object for TransactionObject {
    const TABLE: &'static [u8] = TRANSACTION_TABLE;
    const NAME: &'static str = "transaction";
    object_id_accessors!();

    fn indexes(&self) -> Vec<IndexEntry> {
        vec![
            IndexEntry::unique("trx_id", self.trx_id.encode()),
            IndexEntry::ordered("expiration", time_key(self.expiration)),
        ]
    }
}

/// The id of a recent block, keyed by the low 16 bits of its number so
/// transactions can reference it for TaPoS.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct BlockSummaryObject {
    /// Primary id.
    pub id: ObjectId,
    /// `block_num & 0xffff`.
    pub slot: u16,
    /// The block's id.
    pub block_id: BlockId,
}

impl Object for BlockSummaryObject {
    const TABLE: &'static [u8] = BLOCK_SUMMARY_TABLE;
    const NAME: &'static str = "block_summary";
    object_id_accessors!();

    fn indexes(&self) -> Vec<IndexEntry> {
        vec![IndexEntry::unique("slot", self.slot.to_be_bytes().to_vec())]
    }
}
