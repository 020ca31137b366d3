// Path: crates/execution/src/evaluators/custom.rs
//! Custom operations are opaque to the core. Each id is handled by the
//! interpreter registered for it. The interpreter writes through the same
//! store session as the rest of the transaction, confined to its own key
//! space.

use super::Evaluator;
use crate::context::EvaluationContext;
use deip_api::state::NamespacedStateAccess;
use deip_types::error::EvaluationError;
use deip_types::protocol::operations::{CustomBinaryOperation, CustomJsonOperation};

pub struct CustomJsonEvaluator;

impl Evaluator for CustomJsonEvaluator {
    type Operation = CustomJsonOperation;

    fn do_apply(&self, ctx: &mut EvaluationContext<'_>, op: &Self::Operation) -> Result<(), EvaluationError> {
        let registry = ctx.interpreters;
        let interpreter = registry
            .get(&op.id)
            .ok_or_else(|| EvaluationError::UnknownCustomOperation(op.id.clone()))?;
        let mut state = NamespacedStateAccess::new(ctx.db.store(), &op.id);
        interpreter
            .apply_json(&mut state, op)
            .map_err(|e| EvaluationError::Interpreter {
                id: op.id.clone(),
                reason: e.to_string(),
            })
    }
}

pub struct CustomBinaryEvaluator;

impl Evaluator for CustomBinaryEvaluator {
    type Operation = CustomBinaryOperation;

    fn do_apply(&self, ctx: &mut EvaluationContext<'_>, op: &Self::Operation) -> Result<(), EvaluationError> {
        let registry = ctx.interpreters;
        let interpreter = registry
            .get(&op.id)
            .ok_or_else(|| EvaluationError::UnknownCustomOperation(op.id.clone()))?;
        let mut state = NamespacedStateAccess::new(ctx.db.store(), &op.id);
        interpreter
            .apply_binary(&mut state, op)
            .map_err(|e| EvaluationError::Interpreter {
                id: op.id.clone(),
                reason: e.to_string(),
            })
    }
}
