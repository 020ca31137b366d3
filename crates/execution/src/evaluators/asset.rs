// Path: crates/execution/src/evaluators/asset.rs

use super::Evaluator;
use crate::context::EvaluationContext;
use deip_types::error::EvaluationError;
use deip_types::protocol::operations::{
    CreateAssetOperation, IssueAssetOperation, ReserveAssetOperation,
};
use deip_types::protocol::{Asset, DEIP_SYMBOL};

/// Changes the issued supply of `delta`'s asset. The core asset's supply is
/// also tracked in the dynamic global properties.
pub(crate) fn adjust_supply(ctx: &mut EvaluationContext<'_>, delta: &Asset) -> Result<(), EvaluationError> {
    let asset = ctx.db.assets().get_asset_by_symbol(&delta.symbol.name())?;
    ensure!(
        asset.symbol == delta.symbol,
        "Asset {} has precision {}, {} given",
        asset.string_symbol,
        asset.symbol.precision(),
        delta.symbol.precision()
    );
    ctx.db
        .assets()
        .adjust_asset_supply(&asset.string_symbol, delta.amount)?;
    if delta.symbol == DEIP_SYMBOL {
        ctx.db.dynamic_global_properties().adjust_supply(delta)?;
    }
    Ok(())
}

pub struct CreateAssetEvaluator;

impl Evaluator for CreateAssetEvaluator {
    type Operation = CreateAssetOperation;

    fn do_apply(&self, ctx: &mut EvaluationContext<'_>, op: &Self::Operation) -> Result<(), EvaluationError> {
        ctx.db.accounts().check_account_existence(&op.issuer)?;
        let symbol = op.asset_symbol()?;
        ctx.db
            .assets()
            .create_asset(symbol, &op.symbol, &op.issuer, op.max_supply, &op.description)?;
        Ok(())
    }
}

pub struct IssueAssetEvaluator;

impl Evaluator for IssueAssetEvaluator {
    type Operation = IssueAssetOperation;

    fn do_apply(&self, ctx: &mut EvaluationContext<'_>, op: &Self::Operation) -> Result<(), EvaluationError> {
        ctx.db.accounts().check_account_existence(&op.issuer)?;
        ctx.db.accounts().check_account_existence(&op.recipient)?;
        let asset = ctx.db.assets().get_asset_by_symbol(&op.amount.symbol.name())?;
        ensure!(
            asset.issuer == op.issuer,
            "Only '{}' can issue asset {}",
            asset.issuer,
            asset.string_symbol
        );
        adjust_supply(ctx, &op.amount)?;
        ctx.db.assets().adjust_balance(&op.recipient, &op.amount)?;
        Ok(())
    }
}

pub struct ReserveAssetEvaluator;

impl Evaluator for ReserveAssetEvaluator {
    type Operation = ReserveAssetOperation;

    fn do_apply(&self, ctx: &mut EvaluationContext<'_>, op: &Self::Operation) -> Result<(), EvaluationError> {
        ctx.db.accounts().check_account_existence(&op.owner)?;
        let burned = Asset::new(-op.amount.amount, op.amount.symbol);
        ctx.db.assets().adjust_balance(&op.owner, &burned)?;
        adjust_supply(ctx, &burned)?;
        Ok(())
    }
}
