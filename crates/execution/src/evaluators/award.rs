// Path: crates/execution/src/evaluators/award.rs
//! Awards escrow the funder's money at creation. The awardee accepts or
//! declines; an accepted award is drawn down through withdrawal requests
//! that the funder certifies and then pays.

use super::Evaluator;
use crate::context::EvaluationContext;
use deip_types::app::{AwardStatus, WithdrawalRequestStatus};
use deip_types::error::EvaluationError;
use deip_types::protocol::operations::{
    ApproveAwardOperation, ApproveAwardWithdrawalRequestOperation, CreateAwardOperation,
    CreateAwardWithdrawalRequestOperation, PayAwardWithdrawalRequestOperation,
    RejectAwardOperation, RejectAwardWithdrawalRequestOperation,
};
use deip_types::protocol::Asset;

pub struct CreateAwardEvaluator;

impl Evaluator for CreateAwardEvaluator {
    type Operation = CreateAwardOperation;

    fn do_apply(&self, ctx: &mut EvaluationContext<'_>, op: &Self::Operation) -> Result<(), EvaluationError> {
        ctx.db.accounts().check_account_existence(&op.creator)?;
        ctx.db.accounts().check_account_existence(&op.awardee)?;
        ensure!(
            ctx.db.awards().find_award(&op.award_number)?.is_none(),
            "Award {} already exists",
            op.award_number
        );
        ctx.db
            .assets()
            .adjust_balance(&op.creator, &Asset::new(-op.amount.amount, op.amount.symbol))?;
        let now = ctx.now;
        ctx.db.awards().create_award(op, now)?;
        Ok(())
    }
}

pub struct ApproveAwardEvaluator;

impl Evaluator for ApproveAwardEvaluator {
    type Operation = ApproveAwardOperation;

    fn do_apply(&self, ctx: &mut EvaluationContext<'_>, op: &Self::Operation) -> Result<(), EvaluationError> {
        let award = ctx.db.awards().get_award(&op.award_number)?;
        ensure!(
            award.awardee == op.approver,
            "Only the awardee '{}' can accept award {}",
            award.awardee,
            op.award_number
        );
        ensure!(
            award.status == AwardStatus::Pending,
            "Award {} is not pending",
            op.award_number
        );
        ctx.db
            .awards()
            .update_award_status(&op.award_number, AwardStatus::Approved)?;
        Ok(())
    }
}

pub struct RejectAwardEvaluator;

impl Evaluator for RejectAwardEvaluator {
    type Operation = RejectAwardOperation;

    fn do_apply(&self, ctx: &mut EvaluationContext<'_>, op: &Self::Operation) -> Result<(), EvaluationError> {
        let award = ctx.db.awards().get_award(&op.award_number)?;
        ensure!(
            award.awardee == op.rejector,
            "Only the awardee '{}' can decline award {}",
            award.awardee,
            op.award_number
        );
        ensure!(
            award.status == AwardStatus::Pending,
            "Award {} is not pending",
            op.award_number
        );
        ctx.db
            .awards()
            .update_award_status(&op.award_number, AwardStatus::Rejected)?;
        ctx.db.assets().adjust_balance(&award.creator, &award.amount)?;
        Ok(())
    }
}

pub struct CreateAwardWithdrawalRequestEvaluator;

impl Evaluator for CreateAwardWithdrawalRequestEvaluator {
    type Operation = CreateAwardWithdrawalRequestOperation;

    fn do_apply(&self, ctx: &mut EvaluationContext<'_>, op: &Self::Operation) -> Result<(), EvaluationError> {
        let award = ctx.db.awards().get_award(&op.award_number)?;
        ensure!(
            award.status == AwardStatus::Approved,
            "Award {} has not been accepted",
            op.award_number
        );
        ensure!(
            award.awardee == op.requester,
            "Only the awardee '{}' can request withdrawals from award {}",
            award.awardee,
            op.award_number
        );
        ensure!(
            award.amount.symbol == op.amount.symbol,
            "Award {} is paid in {}, {} requested",
            op.award_number,
            award.amount.symbol,
            op.amount.symbol
        );
        let outstanding: i64 = ctx
            .db
            .awards()
            .withdrawal_requests_of(&op.award_number)?
            .iter()
            .filter(|r| {
                matches!(
                    r.status,
                    WithdrawalRequestStatus::Pending | WithdrawalRequestStatus::Certified
                )
            })
            .map(|r| r.amount.amount)
            .sum();
        ensure!(
            outstanding.saturating_add(op.amount.amount) <= award.remaining(),
            "Award {} has {} remaining and {} already requested, {} more requested",
            op.award_number,
            award.remaining(),
            outstanding,
            op.amount.amount
        );
        let now = ctx.now;
        ctx.db.awards().create_withdrawal_request(op, now)?;
        Ok(())
    }
}

pub struct ApproveAwardWithdrawalRequestEvaluator;

impl Evaluator for ApproveAwardWithdrawalRequestEvaluator {
    type Operation = ApproveAwardWithdrawalRequestOperation;

    fn do_apply(&self, ctx: &mut EvaluationContext<'_>, op: &Self::Operation) -> Result<(), EvaluationError> {
        let award = ctx.db.awards().get_award(&op.award_number)?;
        ensure!(
            award.creator == op.approver,
            "Only the funder '{}' can certify withdrawals from award {}",
            award.creator,
            op.award_number
        );
        let request = ctx
            .db
            .awards()
            .get_withdrawal_request(&op.award_number, &op.payment_number)?;
        ensure!(
            request.status == WithdrawalRequestStatus::Pending,
            "Withdrawal request {} is not pending",
            op.payment_number
        );
        ctx.db.awards().update_withdrawal_status(
            &op.award_number,
            &op.payment_number,
            WithdrawalRequestStatus::Certified,
        )?;
        Ok(())
    }
}

pub struct RejectAwardWithdrawalRequestEvaluator;

impl Evaluator for RejectAwardWithdrawalRequestEvaluator {
    type Operation = RejectAwardWithdrawalRequestOperation;

    fn do_apply(&self, ctx: &mut EvaluationContext<'_>, op: &Self::Operation) -> Result<(), EvaluationError> {
        let award = ctx.db.awards().get_award(&op.award_number)?;
        ensure!(
            award.creator == op.rejector,
            "Only the funder '{}' can decline withdrawals from award {}",
            award.creator,
            op.award_number
        );
        let request = ctx
            .db
            .awards()
            .get_withdrawal_request(&op.award_number, &op.payment_number)?;
        ensure!(
            matches!(
                request.status,
                WithdrawalRequestStatus::Pending | WithdrawalRequestStatus::Certified
            ),
            "Withdrawal request {} can no longer be declined",
            op.payment_number
        );
        ctx.db.awards().update_withdrawal_status(
            &op.award_number,
            &op.payment_number,
            WithdrawalRequestStatus::Rejected,
        )?;
        Ok(())
    }
}

pub struct PayAwardWithdrawalRequestEvaluator;

impl Evaluator for PayAwardWithdrawalRequestEvaluator {
    type Operation = PayAwardWithdrawalRequestOperation;

    fn do_apply(&self, ctx: &mut EvaluationContext<'_>, op: &Self::Operation) -> Result<(), EvaluationError> {
        let award = ctx.db.awards().get_award(&op.award_number)?;
        ensure!(
            award.creator == op.payer,
            "Only the funder '{}' can pay withdrawals from award {}",
            award.creator,
            op.award_number
        );
        let request = ctx
            .db
            .awards()
            .get_withdrawal_request(&op.award_number, &op.payment_number)?;
        ensure!(
            request.status == WithdrawalRequestStatus::Certified,
            "Withdrawal request {} has not been certified",
            op.payment_number
        );
        let mut awards = ctx.db.awards();
        awards.record_withdrawal(&op.award_number, request.amount.amount)?;
        awards.update_withdrawal_status(
            &op.award_number,
            &op.payment_number,
            WithdrawalRequestStatus::Paid,
        )?;
        ctx.db.assets().adjust_balance(&request.requester, &request.amount)?;
        Ok(())
    }
}
