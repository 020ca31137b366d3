// Path: crates/execution/src/chain/housekeeping.rs
//! Block-boundary maintenance, run after a block's transactions.

use super::Database;
use crate::context::{AppliedOperation, EvaluationContext};
use crate::evaluators::adjust_supply;
use crate::evaluators::proposal::{execute_proposal, is_authorized};
use deip_state::ObjectStore;
use deip_types::app::ProposalStatus;
use deip_types::error::{ChainError, EvaluationError};
use deip_types::protocol::operations::{ProducerRewardOperation, ProposalExpiredOperation};
use deip_types::protocol::{AccountName, SignedBlock};

fn fail(e: EvaluationError) -> ChainError {
    if e.is_fatal() {
        ChainError::Fatal(e.to_string())
    } else {
        ChainError::Evaluation(e)
    }
}

impl Database {
    /// Advances the head to `block` and runs the per-block maintenance.
    /// Returns the operations it applied, virtual ones included.
    pub(super) fn end_block(
        &self,
        store: &mut ObjectStore,
        block: &SignedBlock,
        last_irreversible: u32,
    ) -> Result<Vec<AppliedOperation>, ChainError> {
        let block_id = block.id();
        let block_num = block_id.num();
        let now = block.header.timestamp;
        let mut ctx = EvaluationContext::new(store, &self.config, &self.interpreters, now, block_num);

        let props = ctx
            .db
            .dynamic_global_properties()
            .update_head(block_id, now, &block.header.witness)
            .map_err(fail)?;
        if props.last_irreversible_block_num != last_irreversible {
            ctx.db
                .dynamic_global_properties()
                .set_last_irreversible_block(last_irreversible)
                .map_err(fail)?;
        }
        ctx.db.transactions().set_block_summary(block_id).map_err(fail)?;

        let mut stats = ctx.db.expertise_stats();
        stats.reset_used_expertise_per_block(block_num).map_err(fail)?;
        stats
            .calculate_used_expertise_for_week(block_num, self.config.blocks_per_week)
            .map_err(fail)?;

        let forgotten = ctx.db.transactions().clear_expired(now).map_err(fail)?;
        let released = ctx
            .db
            .dynamic_global_properties()
            .clear_expired_recent_entities(now, self.config.recent_entity_lifetime_sec)
            .map_err(fail)?;
        if forgotten > 0 || released > 0 {
            log::debug!(
                "block {}: forgot {} transactions, released {} external ids",
                block_num,
                forgotten,
                released
            );
        }

        expire_proposals(&mut ctx).map_err(fail)?;
        pay_producer(&mut ctx, &block.header.witness).map_err(fail)?;
        Ok(ctx.into_applied())
    }
}

/// Removes proposals that reached their expiration. One with a review period
/// that is still pending and fully approved is executed first; a pending one
/// that does not execute is announced with `proposal_expired`.
fn expire_proposals(ctx: &mut EvaluationContext<'_>) -> Result<(), EvaluationError> {
    let expired = ctx.db.proposals().expired_proposals(ctx.now)?;
    for proposal in expired {
        let pending = proposal.status == ProposalStatus::Pending;
        let executed = if pending && proposal.review_period_time.is_some() && is_authorized(ctx, &proposal)? {
            execute_proposal(ctx, &proposal)?
        } else {
            false
        };
        ctx.db.proposals().remove_proposal(&proposal.external_id)?;
        if pending && !executed {
            tracing::info!(
                target: "execution",
                event = "proposal_expired",
                id = %proposal.external_id,
                block = ctx.block_num
            );
            ctx.record_virtual(
                ProposalExpiredOperation {
                    external_id: proposal.external_id.clone(),
                    creator: proposal.proposer.clone(),
                }
                .into(),
            );
        }
    }
    Ok(())
}

fn pay_producer(ctx: &mut EvaluationContext<'_>, producer: &AccountName) -> Result<(), EvaluationError> {
    let reward = ctx.config.producer_reward;
    if reward.amount <= 0 {
        return Ok(());
    }
    if ctx.db.accounts().find_account(producer)?.is_none() {
        log::warn!("block producer {} has no account, reward skipped", producer);
        return Ok(());
    }
    adjust_supply(ctx, &reward)?;
    ctx.db.assets().adjust_balance(producer, &reward)?;
    ctx.record_virtual(
        ProducerRewardOperation {
            producer: producer.clone(),
            reward,
        }
        .into(),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use deip_api::test_utils::AllowAllVerifier;
    use deip_services::DbServices;
    use deip_types::config::{ChainConfig, SkipFlags};
    use deip_types::protocol::BlockHeader;
    use std::sync::Arc;

    fn next_block(db: &Database) -> SignedBlock {
        let mut block = SignedBlock {
            header: BlockHeader {
                previous: db.head_block_id().unwrap(),
                timestamp: db.head_block_time().unwrap().saturating_add(3),
                witness: "initminer".into(),
                ..BlockHeader::default()
            },
            witness_signature: String::new(),
            transactions: vec![],
        };
        block.header.transaction_merkle_root = block.calculate_merkle_root();
        block
    }

    #[test]
    fn block_boundary_closes_expertise_usage() {
        let mut config = ChainConfig::default();
        config.blocks_per_week = 2;
        let db = Database::open(config, Arc::new(AllowAllVerifier)).unwrap();
        {
            let mut state = db.state.write();
            DbServices::new(&mut state.store)
                .expertise_stats()
                .increase_total_used_expertise_amount(9)
                .unwrap();
        }
        let stats = |db: &Database| db.with_view(|v| v.expertise_stats().get().unwrap());

        db.push_block(&next_block(&db), SkipFlags::empty()).unwrap();
        let after_one = stats(&db);
        assert_eq!(after_one.used_expertise_per_block, 0);
        assert_eq!(after_one.used_expertise_last_week, 9);
        assert_eq!(after_one.total_used_expertise, 9);

        db.push_block(&next_block(&db), SkipFlags::empty()).unwrap();
        assert_eq!(stats(&db).used_expertise_last_week, 9);
        db.push_block(&next_block(&db), SkipFlags::empty()).unwrap();
        let after_window = stats(&db);
        assert_eq!(after_window.used_expertise_last_week, 0);
        assert!(after_window.recent.is_empty());
    }
}
