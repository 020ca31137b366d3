// Path: crates/execution/src/evaluators/proposal.rs
//! Proposals hold operations until enough approvals accumulate.
//!
//! A proposal without a review period executes as soon as an
//! `update_proposal` leaves it authorized. A proposal with a review period
//! stops accepting new approvals once the period starts and is executed, if
//! still authorized, when it expires.

use super::{apply_operation, Evaluator};
use crate::context::EvaluationContext;
use deip_services::NewProposal;
use deip_types::app::{ProposalObject, ProposalStatus};
use deip_types::error::EvaluationError;
use deip_types::protocol::operations::{
    CreateProposalOperation, DeleteProposalOperation, UpdateProposalOperation,
};
use deip_types::protocol::{AuthorityLevel, RequiredAuthorities};

pub struct CreateProposalEvaluator;

impl Evaluator for CreateProposalEvaluator {
    type Operation = CreateProposalOperation;

    fn do_apply(&self, ctx: &mut EvaluationContext<'_>, op: &Self::Operation) -> Result<(), EvaluationError> {
        let now = ctx.now;
        ensure!(
            op.expiration_time > now,
            "Proposal expiration time ({}) must be in the future ({})",
            op.expiration_time,
            now
        );
        let max_expiration = now.saturating_add(ctx.config.max_proposal_lifetime_sec);
        ensure!(
            op.expiration_time <= max_expiration,
            "Proposal expiration time ({}) must be before {}",
            op.expiration_time,
            max_expiration
        );
        let review_period_time = match op.review_period_seconds {
            Some(secs) => {
                ensure!(
                    secs < op.expiration_time.secs().saturating_sub(now.secs()),
                    "Proposal review period must end before the proposal expires"
                );
                Some(op.expiration_time.saturating_sub(secs))
            }
            None => None,
        };

        ctx.db.accounts().check_account_existence(&op.creator)?;
        let mut required = RequiredAuthorities::default();
        for nested in op.operations() {
            required.extend(nested.required_authorities());
        }
        let required = required.normalized();
        for name in required.active.iter().chain(required.owner.iter()) {
            ctx.db.accounts().check_account_existence(name)?;
        }

        ctx.db
            .dynamic_global_properties()
            .create_recent_entity(&op.external_id)?;
        ctx.db.proposals().create_proposal(NewProposal {
            external_id: op.external_id.clone(),
            proposer: op.creator.clone(),
            proposed_ops: op.proposed_ops.clone(),
            expiration_time: op.expiration_time,
            review_period_time,
            required_active_approvals: required.active,
            required_owner_approvals: required.owner,
            created_at: now,
        })?;
        Ok(())
    }
}

pub struct UpdateProposalEvaluator;

impl Evaluator for UpdateProposalEvaluator {
    type Operation = UpdateProposalOperation;

    fn do_apply(&self, ctx: &mut EvaluationContext<'_>, op: &Self::Operation) -> Result<(), EvaluationError> {
        let proposal = ctx.db.proposals().get_proposal(&op.external_id)?;
        if proposal
            .review_period_time
            .is_some_and(|review| ctx.now >= review)
        {
            ensure!(
                op.active_approvals_to_add.is_empty()
                    && op.owner_approvals_to_add.is_empty()
                    && op.key_approvals_to_add.is_empty(),
                "This proposal is in its review period. No new approvals may be added."
            );
        }
        for name in op
            .active_approvals_to_add
            .iter()
            .chain(op.owner_approvals_to_add.iter())
        {
            ctx.db.accounts().check_account_existence(name)?;
        }

        let updated = ctx.db.proposals().update_approvals(op)?;
        if updated.review_period_time.is_none()
            && updated.status == ProposalStatus::Pending
            && is_authorized(ctx, &updated)?
        {
            execute_proposal(ctx, &updated)?;
        }
        Ok(())
    }
}

pub struct DeleteProposalEvaluator;

impl Evaluator for DeleteProposalEvaluator {
    type Operation = DeleteProposalOperation;

    fn do_apply(&self, ctx: &mut EvaluationContext<'_>, op: &Self::Operation) -> Result<(), EvaluationError> {
        let proposal = ctx.db.proposals().get_proposal(&op.external_id)?;
        let required = match op.authority {
            AuthorityLevel::Owner => &proposal.required_owner_approvals,
            AuthorityLevel::Active => &proposal.required_active_approvals,
        };
        ensure!(
            proposal.proposer == op.account || required.contains(&op.account),
            "Provided authority is not authoritative for this proposal."
        );
        ctx.db.proposals().remove_proposal(&op.external_id)?;
        Ok(())
    }
}

/// Whether the approvals collected on `proposal` cover every authority its
/// operations require.
///
/// An account approval counts directly. An account without one is covered
/// when the key approvals satisfy its stored authority: the owner authority
/// for owner requirements, the active or owner authority for active ones.
pub(crate) fn is_authorized(
    ctx: &EvaluationContext<'_>,
    proposal: &ProposalObject,
) -> Result<bool, EvaluationError> {
    let accounts = ctx.db.view().accounts();
    let keys = &proposal.available_key_approvals;

    for name in &proposal.required_owner_approvals {
        if proposal.available_owner_approvals.contains(name) {
            continue;
        }
        if !accounts.get_account(name)?.owner.is_satisfied_by_keys(keys) {
            return Ok(false);
        }
    }
    for name in &proposal.required_active_approvals {
        if proposal.available_active_approvals.contains(name)
            || proposal.available_owner_approvals.contains(name)
        {
            continue;
        }
        let account = accounts.get_account(name)?;
        if !account.active.is_satisfied_by_keys(keys) && !account.owner.is_satisfied_by_keys(keys) {
            return Ok(false);
        }
    }
    let keys_covered = proposal
        .proposed_ops
        .iter()
        .flat_map(|w| w.op.required_authorities().keys)
        .all(|key| keys.contains(&key));
    Ok(keys_covered)
}

/// Applies the proposed operations inside a nested session.
///
/// Success marks the proposal `Approved`. A failure reverts the session and
/// leaves the proposal `Pending` with the reason recorded; only a fatal
/// failure is returned to the caller.
pub(crate) fn execute_proposal(
    ctx: &mut EvaluationContext<'_>,
    proposal: &ProposalObject,
) -> Result<bool, EvaluationError> {
    let mark = ctx.applied_len();
    let cp = ctx.db.store().checkpoint();
    let result = proposal
        .proposed_ops
        .iter()
        .try_for_each(|wrapper| apply_operation(ctx, &wrapper.op));

    match result {
        Ok(()) => {
            ctx.db.store().commit(cp)?;
            ctx.db
                .proposals()
                .set_status(&proposal.external_id, ProposalStatus::Approved, None)?;
            tracing::info!(
                target: "execution",
                event = "proposal_executed",
                id = %proposal.external_id,
                ops = proposal.proposed_ops.len()
            );
            Ok(true)
        }
        Err(e) => {
            ctx.db.store().revert(cp)?;
            ctx.truncate_applied(mark);
            if e.is_fatal() {
                return Err(e);
            }
            tracing::warn!(
                target: "execution",
                event = "proposal_failed",
                id = %proposal.external_id,
                error = %e
            );
            ctx.db.proposals().set_status(
                &proposal.external_id,
                ProposalStatus::Pending,
                Some(e.to_string()),
            )?;
            Ok(false)
        }
    }
}
