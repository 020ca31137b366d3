// Path: crates/execution/src/evaluators/mod.rs
//! One evaluator per operation kind.
//!
//! Evaluators re-check the state-dependent rules of their operation and
//! apply it through the database facades. Static field checks have already
//! run in `Operation::validate`, and authorities in the pipeline.

use crate::context::EvaluationContext;
use deip_telemetry::{chain_metrics, time::Timer};
use deip_types::error::EvaluationError;
use deip_types::protocol::Operation;

mod account;
mod asset;
mod award;
mod custom;
mod nda_contract;
pub(crate) mod proposal;
mod research;

pub use account::{CreateAccountEvaluator, TransferEvaluator, UpdateAccountEvaluator};
pub use asset::{CreateAssetEvaluator, IssueAssetEvaluator, ReserveAssetEvaluator};
pub use award::{
    ApproveAwardEvaluator, ApproveAwardWithdrawalRequestEvaluator, CreateAwardEvaluator,
    CreateAwardWithdrawalRequestEvaluator, PayAwardWithdrawalRequestEvaluator,
    RejectAwardEvaluator, RejectAwardWithdrawalRequestEvaluator,
};
pub use custom::{CustomBinaryEvaluator, CustomJsonEvaluator};
pub use nda_contract::{CreateNdaContractEvaluator, SignNdaContractEvaluator};
pub use proposal::{CreateProposalEvaluator, DeleteProposalEvaluator, UpdateProposalEvaluator};
pub use research::{
    CreateAssessmentEvaluator, CreateSecurityTokenEvaluator,
    JoinResearchGroupMembershipEvaluator, LeaveResearchGroupMembershipEvaluator,
    TransferSecurityTokenEvaluator,
};

pub(crate) use asset::adjust_supply;

/// The state-transition function of one operation kind.
pub trait Evaluator {
    type Operation;

    fn do_apply(
        &self,
        ctx: &mut EvaluationContext<'_>,
        op: &Self::Operation,
    ) -> Result<(), EvaluationError>;
}

/// Applies one operation against `ctx` and records it as applied.
///
/// On failure nothing is recorded, but store writes made before the failure
/// stay in the caller's session; the caller reverts it.
pub fn apply_operation(ctx: &mut EvaluationContext<'_>, op: &Operation) -> Result<(), EvaluationError> {
    let _timer = Timer::new(chain_metrics(), op.name());
    let mark = ctx.applied_len();
    // Recorded first so an executed proposal lists after its update_proposal.
    ctx.record(op.clone());
    let result = match op {
        Operation::CreateAccount(o) => CreateAccountEvaluator.do_apply(ctx, o),
        Operation::UpdateAccount(o) => UpdateAccountEvaluator.do_apply(ctx, o),
        Operation::Transfer(o) => TransferEvaluator.do_apply(ctx, o),
        Operation::CreateAsset(o) => CreateAssetEvaluator.do_apply(ctx, o),
        Operation::IssueAsset(o) => IssueAssetEvaluator.do_apply(ctx, o),
        Operation::ReserveAsset(o) => ReserveAssetEvaluator.do_apply(ctx, o),
        Operation::JoinResearchGroupMembership(o) => {
            JoinResearchGroupMembershipEvaluator.do_apply(ctx, o)
        }
        Operation::LeaveResearchGroupMembership(o) => {
            LeaveResearchGroupMembershipEvaluator.do_apply(ctx, o)
        }
        Operation::CreateAssessment(o) => CreateAssessmentEvaluator.do_apply(ctx, o),
        Operation::CreateProposal(o) => CreateProposalEvaluator.do_apply(ctx, o),
        Operation::UpdateProposal(o) => UpdateProposalEvaluator.do_apply(ctx, o),
        Operation::DeleteProposal(o) => DeleteProposalEvaluator.do_apply(ctx, o),
        Operation::CreateNdaContract(o) => CreateNdaContractEvaluator.do_apply(ctx, o),
        Operation::SignNdaContract(o) => SignNdaContractEvaluator.do_apply(ctx, o),
        Operation::CreateSecurityToken(o) => CreateSecurityTokenEvaluator.do_apply(ctx, o),
        Operation::TransferSecurityToken(o) => TransferSecurityTokenEvaluator.do_apply(ctx, o),
        Operation::CreateAward(o) => CreateAwardEvaluator.do_apply(ctx, o),
        Operation::ApproveAward(o) => ApproveAwardEvaluator.do_apply(ctx, o),
        Operation::RejectAward(o) => RejectAwardEvaluator.do_apply(ctx, o),
        Operation::CreateAwardWithdrawalRequest(o) => {
            CreateAwardWithdrawalRequestEvaluator.do_apply(ctx, o)
        }
        Operation::ApproveAwardWithdrawalRequest(o) => {
            ApproveAwardWithdrawalRequestEvaluator.do_apply(ctx, o)
        }
        Operation::RejectAwardWithdrawalRequest(o) => {
            RejectAwardWithdrawalRequestEvaluator.do_apply(ctx, o)
        }
        Operation::PayAwardWithdrawalRequest(o) => {
            PayAwardWithdrawalRequestEvaluator.do_apply(ctx, o)
        }
        Operation::CustomJson(o) => CustomJsonEvaluator.do_apply(ctx, o),
        Operation::CustomBinary(o) => CustomBinaryEvaluator.do_apply(ctx, o),
        Operation::ProducerReward(_) | Operation::ProposalExpired(_) => {
            Err(EvaluationError::NotEvaluable(op.name()))
        }
    };
    if result.is_err() {
        ctx.truncate_applied(mark);
    }
    result
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::context::EvaluationContext;
    use crate::interpreters::InterpreterRegistry;
    use deip_services::DbServices;
    use deip_state::ObjectStore;
    use deip_types::config::ChainConfig;
    use deip_types::protocol::{AccountName, Asset, Authority, PublicKey, TimePointSec, DEIP_SYMBOL};

    pub const NOW: TimePointSec = TimePointSec::from_secs(1_000);

    /// A store holding the core asset and the named accounts, each with
    /// `balance` core units.
    pub fn ledger(accounts: &[&str], balance: i64) -> ObjectStore {
        let mut store = ObjectStore::new();
        let mut db = DbServices::new(&mut store);
        db.dynamic_global_properties()
            .initialize(NOW, &"initminer".into(), Asset::core(0))
            .unwrap();
        db.assets()
            .create_asset(DEIP_SYMBOL, &DEIP_SYMBOL.name(), &"initminer".into(), i64::MAX, "core")
            .unwrap();
        for name in accounts {
            let name = AccountName::from(*name);
            db.accounts()
                .create_account(
                    &name,
                    None,
                    Authority::from_key(PublicKey::new(name.as_str())),
                    Authority::from_key(PublicKey::new(name.as_str())),
                    PublicKey::new(name.as_str()),
                    None,
                    NOW,
                )
                .unwrap();
            if balance > 0 {
                db.assets().adjust_balance(&name, &Asset::core(balance)).unwrap();
                db.assets()
                    .adjust_asset_supply(&DEIP_SYMBOL.name(), balance)
                    .unwrap();
                db.dynamic_global_properties()
                    .adjust_supply(&Asset::core(balance))
                    .unwrap();
            }
        }
        store
    }

    pub fn context<'a>(
        store: &'a mut ObjectStore,
        config: &'a ChainConfig,
        interpreters: &'a InterpreterRegistry,
    ) -> EvaluationContext<'a> {
        EvaluationContext::new(store, config, interpreters, NOW, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::interpreters::InterpreterRegistry;
    use deip_types::config::ChainConfig;
    use deip_types::protocol::operations::{ProposalExpiredOperation, TransferOperation};
    use deip_types::protocol::Asset;

    #[test]
    fn virtual_operations_are_not_evaluable() {
        let mut store = ledger(&["alice"], 0);
        let (config, interpreters) = (ChainConfig::default(), InterpreterRegistry::new());
        let mut ctx = context(&mut store, &config, &interpreters);
        let op = Operation::from(ProposalExpiredOperation {
            external_id: "a".repeat(40).as_str().into(),
            creator: "alice".into(),
        });
        assert_eq!(
            apply_operation(&mut ctx, &op),
            Err(EvaluationError::NotEvaluable("proposal_expired"))
        );
        assert_eq!(ctx.applied_len(), 0);
    }

    #[test]
    fn applied_operations_are_recorded_in_order() {
        let mut store = ledger(&["alice", "bob"], 100);
        let (config, interpreters) = (ChainConfig::default(), InterpreterRegistry::new());
        let mut ctx = context(&mut store, &config, &interpreters);
        let pay = |amount| {
            Operation::from(TransferOperation {
                from: "alice".into(),
                to: "bob".into(),
                amount: Asset::core(amount),
                memo: String::new(),
            })
        };
        apply_operation(&mut ctx, &pay(60)).unwrap();
        assert!(apply_operation(&mut ctx, &pay(60)).is_err());
        assert_eq!(ctx.applied_len(), 1);
    }
}
