// Path: crates/execution/src/evaluators/research.rs

use super::Evaluator;
use crate::context::EvaluationContext;
use deip_types::error::EvaluationError;
use deip_types::protocol::operations::{
    CreateAssessmentOperation, CreateSecurityTokenOperation, JoinResearchGroupMembershipOperation,
    LeaveResearchGroupMembershipOperation, TransferSecurityTokenOperation,
};

pub struct JoinResearchGroupMembershipEvaluator;

impl Evaluator for JoinResearchGroupMembershipEvaluator {
    type Operation = JoinResearchGroupMembershipOperation;

    fn do_apply(&self, ctx: &mut EvaluationContext<'_>, op: &Self::Operation) -> Result<(), EvaluationError> {
        ctx.db.accounts().check_account_existence(&op.member)?;
        ctx.db.accounts().check_account_existence(&op.research_group)?;
        let now = ctx.now;
        ctx.db.research_groups().add_member(
            &op.research_group,
            &op.member,
            op.weight,
            op.researches.clone(),
            now,
        )?;
        Ok(())
    }
}

pub struct LeaveResearchGroupMembershipEvaluator;

impl Evaluator for LeaveResearchGroupMembershipEvaluator {
    type Operation = LeaveResearchGroupMembershipOperation;

    fn do_apply(&self, ctx: &mut EvaluationContext<'_>, op: &Self::Operation) -> Result<(), EvaluationError> {
        ctx.db.accounts().check_account_existence(&op.member)?;
        ctx.db.accounts().check_account_existence(&op.research_group)?;
        ctx.db
            .research_groups()
            .remove_member(&op.research_group, &op.member)?;
        Ok(())
    }
}

pub struct CreateAssessmentEvaluator;

impl Evaluator for CreateAssessmentEvaluator {
    type Operation = CreateAssessmentOperation;

    fn do_apply(&self, ctx: &mut EvaluationContext<'_>, op: &Self::Operation) -> Result<(), EvaluationError> {
        ctx.db.accounts().check_account_existence(&op.creator)?;
        let now = ctx.now;
        ctx.db
            .assessments()
            .create_assessment(&op.external_id, &op.creator, op.stages.clone(), now)?;
        Ok(())
    }
}

pub struct CreateSecurityTokenEvaluator;

impl Evaluator for CreateSecurityTokenEvaluator {
    type Operation = CreateSecurityTokenOperation;

    fn do_apply(&self, ctx: &mut EvaluationContext<'_>, op: &Self::Operation) -> Result<(), EvaluationError> {
        ctx.db.accounts().check_account_existence(&op.owner)?;
        ctx.db.security_tokens().create_security_token(
            &op.external_id,
            &op.research_external_id,
            &op.owner,
            op.amount,
        )?;
        Ok(())
    }
}

pub struct TransferSecurityTokenEvaluator;

impl Evaluator for TransferSecurityTokenEvaluator {
    type Operation = TransferSecurityTokenOperation;

    fn do_apply(&self, ctx: &mut EvaluationContext<'_>, op: &Self::Operation) -> Result<(), EvaluationError> {
        ctx.db.accounts().check_account_existence(&op.from)?;
        ctx.db.accounts().check_account_existence(&op.to)?;
        ensure!(
            ctx.db
                .security_tokens()
                .find_security_token(&op.security_token_external_id)?
                .is_some(),
            "Security token {} does not exist",
            op.security_token_external_id
        );
        ctx.db.security_tokens().transfer(
            &op.security_token_external_id,
            &op.from,
            &op.to,
            op.amount,
        )?;
        Ok(())
    }
}
