// Path: crates/execution/src/evaluators/nda_contract.rs

use super::Evaluator;
use crate::context::EvaluationContext;
use deip_types::error::EvaluationError;
use deip_types::protocol::operations::{CreateNdaContractOperation, SignNdaContractOperation};

pub struct CreateNdaContractEvaluator;

impl Evaluator for CreateNdaContractEvaluator {
    type Operation = CreateNdaContractOperation;

    fn do_apply(&self, ctx: &mut EvaluationContext<'_>, op: &Self::Operation) -> Result<(), EvaluationError> {
        ctx.db.accounts().check_account_existence(&op.creator)?;
        ctx.db.accounts().check_account_existence(&op.party_a)?;
        ctx.db.accounts().check_account_existence(&op.party_b)?;
        let now = ctx.now;
        ctx.db.nda_contracts().create_contract(op, now)?;
        Ok(())
    }
}

pub struct SignNdaContractEvaluator;

impl Evaluator for SignNdaContractEvaluator {
    type Operation = SignNdaContractOperation;

    fn do_apply(&self, ctx: &mut EvaluationContext<'_>, op: &Self::Operation) -> Result<(), EvaluationError> {
        ctx.db.accounts().check_account_existence(&op.signer)?;
        let now = ctx.now;
        ctx.db
            .nda_contracts()
            .sign(&op.external_id, &op.signer, &op.signature, now)?;
        Ok(())
    }
}
