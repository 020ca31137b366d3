// Path: crates/execution/src/chain/block.rs

use super::{Database, Slot};
use crate::notify::{notifications, Position};
use deip_services::DbView;
use deip_state::ObjectStore;
use deip_types::app::OperationNotification;
use deip_types::config::SkipFlags;
use deip_types::error::{BlockError, ChainError};
use deip_types::protocol::{SignedBlock, TransactionId};

impl Database {
    /// Applies `block` directly on `store`, in whatever session is open.
    ///
    /// Notifications of every transaction that committed are appended to
    /// `notes`, even when a later transaction fails. A failing transaction
    /// is reverted and reported as `BlockError::TransactionFailed`; the ones
    /// before it stay applied.
    pub(super) fn apply_block_in(
        &self,
        store: &mut ObjectStore,
        block: &SignedBlock,
        skip: SkipFlags,
        last_irreversible: u32,
        notes: &mut Vec<OperationNotification>,
    ) -> Result<(), ChainError> {
        let header = &block.header;
        let props = DbView::new(store).dynamic_global_properties().get()?;

        let linked = if props.head_block_number == 0 {
            header.previous.num() == 0
        } else {
            header.previous == props.head_block_id
        };
        if !linked {
            return Err(BlockError::Unlinkable {
                expected: props.head_block_id.to_string(),
                got: header.previous.to_string(),
            }
            .into());
        }
        if header.timestamp <= props.time {
            return Err(BlockError::InvalidTimestamp {
                head: props.time.secs(),
                got: header.timestamp.secs(),
            }
            .into());
        }
        if !skip.contains(SkipFlags::SKIP_MERKLE_CHECK) {
            let computed = block.calculate_merkle_root();
            if computed != header.transaction_merkle_root {
                return Err(BlockError::MerkleMismatch {
                    expected: header.transaction_merkle_root.to_string(),
                    computed: computed.to_string(),
                }
                .into());
            }
        }

        let block_num = block.block_num();
        tracing::debug!(
            target: "execution",
            event = "apply_block",
            height = block_num,
            transactions = block.transactions.len()
        );
        let mut virtual_op = 0;
        for (index, trx) in block.transactions.iter().enumerate() {
            let slot = Slot {
                block: block_num,
                trx_in_block: u32::try_from(index).unwrap_or(u32::MAX),
                timestamp: header.timestamp,
            };
            match self.apply_transaction(store, trx, skip, slot, &mut virtual_op) {
                Ok(applied) => notes.extend(applied),
                Err(ChainError::Transaction(source)) => {
                    return Err(BlockError::TransactionFailed { index, source }.into())
                }
                Err(e) => return Err(e),
            }
        }

        let applied = self.end_block(store, block, last_irreversible)?;
        let at = Position {
            trx_id: TransactionId::default(),
            block: block_num,
            trx_in_block: u32::try_from(block.transactions.len()).unwrap_or(u32::MAX),
            timestamp: header.timestamp,
        };
        notes.extend(notifications(applied, at, &mut virtual_op));
        Ok(())
    }
}
