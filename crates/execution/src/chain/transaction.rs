// Path: crates/execution/src/chain/transaction.rs

use super::{Database, Slot};
use crate::authority::verify_authority;
use crate::context::{AppliedOperation, EvaluationContext};
use crate::evaluators::apply_operation;
use crate::notify::{notifications, Position};
use deip_services::DbView;
use deip_state::ObjectStore;
use deip_types::app::OperationNotification;
use deip_types::config::SkipFlags;
use deip_types::error::{ChainError, EvaluationError, TransactionError};
use deip_types::protocol::{SignedTransaction, TimePointSec, TransactionId};

/// A fatal evaluation error halts processing; any other one rejects the
/// transaction at `index`.
pub(super) fn operation_failed(index: usize, source: EvaluationError) -> ChainError {
    if source.is_fatal() {
        ChainError::Fatal(source.to_string())
    } else {
        TransactionError::Evaluation { index, source }.into()
    }
}

impl Database {
    /// Checks and applies one transaction in a nested session on `store`.
    ///
    /// Checks run before the session opens, so a rejected transaction never
    /// writes. On success the session folds into the caller's and the
    /// transaction's notifications are returned for publishing.
    pub(super) fn apply_transaction(
        &self,
        store: &mut ObjectStore,
        trx: &SignedTransaction,
        skip: SkipFlags,
        slot: Slot,
        virtual_op: &mut u32,
    ) -> Result<Vec<OperationNotification>, ChainError> {
        trx.validate()?;
        let trx_id = trx.id();
        let now = self.check_transaction(DbView::new(store), trx, &trx_id, skip)?;

        let cp = store.checkpoint();
        match self.evaluate_transaction(store, trx, trx_id, skip, now, slot.block) {
            Ok(applied) => {
                store.commit(cp)?;
                let at = Position {
                    trx_id,
                    block: slot.block,
                    trx_in_block: slot.trx_in_block,
                    timestamp: slot.timestamp,
                };
                Ok(notifications(applied, at, virtual_op))
            }
            Err(e) => {
                store.revert(cp)?;
                Err(e)
            }
        }
    }

    /// The state-dependent admission checks. Returns the head block time the
    /// transaction is evaluated at.
    fn check_transaction(
        &self,
        view: DbView<'_>,
        trx: &SignedTransaction,
        trx_id: &TransactionId,
        skip: SkipFlags,
    ) -> Result<TimePointSec, ChainError> {
        let now = view.dynamic_global_properties().get()?.time;
        if trx.expiration <= now {
            return Err(TransactionError::Expired {
                expiration: trx.expiration.secs(),
                now: now.secs(),
            }
            .into());
        }
        let max = now.saturating_add(self.config.max_time_until_expiration);
        if trx.expiration > max {
            return Err(TransactionError::ExpirationTooFar {
                expiration: trx.expiration.secs(),
                max: max.secs(),
            }
            .into());
        }

        let transactions = view.transactions();
        if !skip.contains(SkipFlags::SKIP_TRANSACTION_DUPE_CHECK) && transactions.is_known(trx_id)? {
            return Err(TransactionError::Duplicate(trx_id.to_string()).into());
        }
        if !skip.contains(SkipFlags::SKIP_TAPOS_CHECK)
            && !transactions.verify_tapos(trx.ref_block_num, trx.ref_block_prefix)?
        {
            return Err(TransactionError::Tapos {
                ref_block_num: trx.ref_block_num,
                ref_block_prefix: trx.ref_block_prefix,
            }
            .into());
        }
        if !skip.contains(SkipFlags::SKIP_AUTHORITY_CHECK) {
            verify_authority(view, self.verifier.as_ref(), trx)?;
        }
        Ok(now)
    }

    fn evaluate_transaction(
        &self,
        store: &mut ObjectStore,
        trx: &SignedTransaction,
        trx_id: TransactionId,
        skip: SkipFlags,
        now: TimePointSec,
        block_num: u32,
    ) -> Result<Vec<AppliedOperation>, ChainError> {
        let mut ctx = EvaluationContext::new(store, &self.config, &self.interpreters, now, block_num);
        if !skip.contains(SkipFlags::SKIP_TRANSACTION_DUPE_CHECK) {
            ctx.db.transactions().record(trx_id, trx.expiration)?;
        }
        for (index, op) in trx.operations.iter().enumerate() {
            ctx.begin_operation(index);
            apply_operation(&mut ctx, op).map_err(|e| operation_failed(index, e))?;
        }
        Ok(ctx.into_applied())
    }
}
