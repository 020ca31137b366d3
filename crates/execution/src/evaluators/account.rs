// Path: crates/execution/src/evaluators/account.rs

use super::Evaluator;
use crate::context::EvaluationContext;
use deip_types::error::EvaluationError;
use deip_types::protocol::operations::{
    CreateAccountOperation, TransferOperation, UpdateAccountOperation,
};
use deip_types::protocol::{Asset, Authority};

/// Every account an authority delegates to must exist.
fn check_authority_accounts(
    ctx: &EvaluationContext<'_>,
    authority: &Authority,
) -> Result<(), EvaluationError> {
    let accounts = ctx.db.view().accounts();
    for name in authority.account_auths.keys() {
        accounts.check_account_existence(name)?;
    }
    Ok(())
}

pub struct CreateAccountEvaluator;

impl Evaluator for CreateAccountEvaluator {
    type Operation = CreateAccountOperation;

    fn do_apply(&self, ctx: &mut EvaluationContext<'_>, op: &Self::Operation) -> Result<(), EvaluationError> {
        let min_fee = ctx.config.min_account_creation_fee;
        ensure!(
            op.fee.symbol == min_fee.symbol && op.fee.amount >= min_fee.amount,
            "Insufficient Fee: {} required, {} provided.",
            min_fee,
            op.fee
        );
        ctx.db.accounts().check_account_existence(&op.creator)?;
        ensure!(
            ctx.db.accounts().find_account(&op.new_account_name)?.is_none(),
            "Account with name \"{}\" already exists.",
            op.new_account_name
        );
        check_authority_accounts(ctx, &op.owner)?;
        check_authority_accounts(ctx, &op.active)?;

        // The fee moves from the creator to the new account.
        if op.fee.amount > 0 {
            ctx.db
                .assets()
                .adjust_balance(&op.creator, &Asset::new(-op.fee.amount, op.fee.symbol))?;
        }
        ctx.db.accounts().create_account(
            &op.new_account_name,
            Some(&op.creator),
            op.owner.clone(),
            op.active.clone(),
            op.memo_key.clone(),
            op.json_metadata.clone(),
            ctx.now,
        )?;
        if op.fee.amount > 0 {
            ctx.db.assets().adjust_balance(&op.new_account_name, &op.fee)?;
        }
        Ok(())
    }
}

pub struct UpdateAccountEvaluator;

impl Evaluator for UpdateAccountEvaluator {
    type Operation = UpdateAccountOperation;

    fn do_apply(&self, ctx: &mut EvaluationContext<'_>, op: &Self::Operation) -> Result<(), EvaluationError> {
        ctx.db.accounts().check_account_existence(&op.account)?;
        for authority in op.owner.iter().chain(op.active.iter()) {
            check_authority_accounts(ctx, authority)?;
        }
        let mut accounts = ctx.db.accounts();
        accounts.update_authorities(&op.account, op.owner.clone(), op.active.clone())?;
        accounts.update_metadata(&op.account, op.memo_key.clone(), op.json_metadata.clone())?;
        Ok(())
    }
}

pub struct TransferEvaluator;

impl Evaluator for TransferEvaluator {
    type Operation = TransferOperation;

    fn do_apply(&self, ctx: &mut EvaluationContext<'_>, op: &Self::Operation) -> Result<(), EvaluationError> {
        ctx.db.accounts().check_account_existence(&op.from)?;
        ctx.db.accounts().check_account_existence(&op.to)?;
        ctx.db.assets().get_asset_by_symbol(&op.amount.symbol.name())?;

        let mut assets = ctx.db.assets();
        assets.adjust_balance(&op.from, &Asset::new(-op.amount.amount, op.amount.symbol))?;
        assets.adjust_balance(&op.to, &op.amount)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::interpreters::InterpreterRegistry;
    use deip_services::DbView;
    use deip_types::config::ChainConfig;
    use deip_types::protocol::{AccountName, PublicKey, DEIP_SYMBOL};

    fn create(name: &str, fee: i64) -> CreateAccountOperation {
        CreateAccountOperation {
            fee: Asset::core(fee),
            creator: "alice".into(),
            new_account_name: name.into(),
            owner: Authority::from_key(PublicKey::new("OWNER")),
            active: Authority::from_key(PublicKey::new("ACTIVE")),
            memo_key: PublicKey::new("MEMO"),
            json_metadata: None,
        }
    }

    #[test]
    fn fee_moves_to_the_new_account() {
        let mut store = ledger(&["alice"], 100);
        let config = ChainConfig {
            min_account_creation_fee: Asset::core(10),
            ..ChainConfig::default()
        };
        let interpreters = InterpreterRegistry::new();
        let mut ctx = context(&mut store, &config, &interpreters);

        let err = CreateAccountEvaluator.do_apply(&mut ctx, &create("carol", 5)).unwrap_err();
        assert!(err.to_string().starts_with("Insufficient Fee"));
        CreateAccountEvaluator.do_apply(&mut ctx, &create("carol", 10)).unwrap();
        assert!(CreateAccountEvaluator.do_apply(&mut ctx, &create("carol", 10)).is_err());

        let view = DbView::new(&store);
        let carol = view.accounts().get_account(&"carol".into()).unwrap();
        assert_eq!(carol.creator, Some(AccountName::from("alice")));
        assert_eq!(carol.created, NOW);
        assert_eq!(view.assets().get_balance(&"carol".into(), DEIP_SYMBOL).unwrap().amount, 10);
        assert_eq!(view.assets().get_balance(&"alice".into(), DEIP_SYMBOL).unwrap().amount, 90);
    }

    #[test]
    fn authorities_must_reference_existing_accounts() {
        let mut store = ledger(&["alice"], 0);
        let (config, interpreters) = (ChainConfig::default(), InterpreterRegistry::new());
        let mut ctx = context(&mut store, &config, &interpreters);
        let mut op = create("carol", 0);
        op.active.account_auths.insert("nobody".into(), 1);
        assert!(CreateAccountEvaluator.do_apply(&mut ctx, &op).is_err());
    }

    #[test]
    fn transfer_moves_balance() {
        let mut store = ledger(&["alice", "bob"], 50);
        let (config, interpreters) = (ChainConfig::default(), InterpreterRegistry::new());
        let mut ctx = context(&mut store, &config, &interpreters);
        let op = TransferOperation {
            from: "alice".into(),
            to: "bob".into(),
            amount: Asset::core(20),
            memo: "rent".into(),
        };
        TransferEvaluator.do_apply(&mut ctx, &op).unwrap();
        let err = TransferEvaluator
            .do_apply(
                &mut ctx,
                &TransferOperation {
                    amount: Asset::core(31),
                    ..op
                },
            )
            .unwrap_err();
        assert!(matches!(err, EvaluationError::InsufficientBalance { .. }));

        let view = DbView::new(&store);
        assert_eq!(view.assets().get_balance(&"bob".into(), DEIP_SYMBOL).unwrap().amount, 70);
    }
}
