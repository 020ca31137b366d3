// Path: crates/types/src/protocol/block.rs

use super::base::{AccountName, TimePointSec};
use super::digest::{merkle_root, BlockId, MerkleRoot};
use super::transaction::{FutureExtension, SignedTransaction};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// The header of a block.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct BlockHeader {
    /// Id of the parent block; the zero id for the first block.
    pub previous: BlockId,
    /// Production time.
    pub timestamp: TimePointSec,
    /// The producing account.
    pub witness: AccountName,
    /// Merkle root over the block's transaction ids.
    pub transaction_merkle_root: MerkleRoot,
    /// Reserved.
    pub extensions: Vec<FutureExtension>,
}

impl BlockHeader {
    /// The height of this block: one past its parent.
    pub fn block_num(&self) -> u32 {
        self.previous.num().saturating_add(1)
    }

    /// The content-derived id, carrying the block number in its first word.
    pub fn id(&self) -> BlockId {
        BlockId::from_header(self.block_num(), &self.encode())
    }
}

/// A header, the producer's signature and the transactions.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct SignedBlock {
    /// The header.
    pub header: BlockHeader,
    /// The producer's signature over the header. Opaque to the core.
    pub witness_signature: String,
    /// The transactions, applied in order.
    pub transactions: Vec<SignedTransaction>,
}

impl SignedBlock {
    /// The block id.
    pub fn id(&self) -> BlockId {
        self.header.id()
    }

    /// The block height.
    pub fn block_num(&self) -> u32 {
        self.header.block_num()
    }

    /// Recomputes the merkle root from the transactions.
    pub fn calculate_merkle_root(&self) -> MerkleRoot {
        let ids: Vec<_> = self.transactions.iter().map(|t| t.id()).collect();
        merkle_root(&ids)
    }
}
