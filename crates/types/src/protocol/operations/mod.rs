// Path: crates/types/src/protocol/operations/mod.rs
//! The closed operation catalog.
//!
//! Every operation a user can submit, plus the virtual operations the core
//! synthesizes, is one variant of [`Operation`]. The variant position is its
//! wire tag: new kinds are appended, never inserted, so historical blocks
//! keep decoding to the same operations.

use super::authority::RequiredAuthorities;
use super::base::{AccountName, PublicKey};
use crate::error::ValidationError;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

mod account;
mod assessment;
mod asset;
mod award;
mod custom;
mod nda_contract;
mod proposal;
mod research_group;
mod security_token;
mod virtual_ops;

pub use account::{CreateAccountOperation, TransferOperation, UpdateAccountOperation};
pub use assessment::{AssessmentPhase, AssessmentStage, CreateAssessmentOperation};
pub use asset::{CreateAssetOperation, IssueAssetOperation, ReserveAssetOperation};
pub use award::{
    ApproveAwardOperation, ApproveAwardWithdrawalRequestOperation, CreateAwardOperation,
    CreateAwardWithdrawalRequestOperation, PayAwardWithdrawalRequestOperation,
    RejectAwardOperation, RejectAwardWithdrawalRequestOperation,
};
pub use custom::{CustomBinaryOperation, CustomJsonOperation};
pub use nda_contract::{CreateNdaContractOperation, SignNdaContractOperation};
pub use proposal::{
    CreateProposalOperation, DeleteProposalOperation, OpWrapper, UpdateProposalOperation,
};
pub use research_group::{
    JoinResearchGroupMembershipOperation, LeaveResearchGroupMembershipOperation,
};
pub use security_token::{CreateSecurityTokenOperation, TransferSecurityTokenOperation};
pub use virtual_ops::{ProducerRewardOperation, ProposalExpiredOperation};

/// The static contract every operation payload implements.
///
/// All methods are pure functions of the payload's own fields; none of them
/// may consult ledger state.
pub trait OperationPayload {
    /// Checks the payload's fields.
    fn validate(&self) -> Result<(), ValidationError>;

    /// Accounts whose active authority must sign.
    fn required_active_authorities(&self, _out: &mut BTreeSet<AccountName>) {}

    /// Accounts whose owner authority must sign.
    fn required_owner_authorities(&self, _out: &mut BTreeSet<AccountName>) {}

    /// Individual keys that must sign.
    fn required_key_authorities(&self, _out: &mut BTreeSet<PublicKey>) {}

    /// Every account this operation touches, for history indexing.
    fn impacted_accounts(&self, out: &mut BTreeSet<AccountName>) {
        self.required_active_authorities(out);
        self.required_owner_authorities(out);
    }

    /// Whether the operation is only ever synthesized by the core.
    fn is_virtual(&self) -> bool {
        false
    }
}

/// One state-transition request.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum Operation {
    CreateAccount(CreateAccountOperation),
    UpdateAccount(UpdateAccountOperation),
    Transfer(TransferOperation),
    CreateAsset(CreateAssetOperation),
    IssueAsset(IssueAssetOperation),
    ReserveAsset(ReserveAssetOperation),
    JoinResearchGroupMembership(JoinResearchGroupMembershipOperation),
    LeaveResearchGroupMembership(LeaveResearchGroupMembershipOperation),
    CreateAssessment(CreateAssessmentOperation),
    CreateProposal(CreateProposalOperation),
    UpdateProposal(UpdateProposalOperation),
    DeleteProposal(DeleteProposalOperation),
    CreateNdaContract(CreateNdaContractOperation),
    SignNdaContract(SignNdaContractOperation),
    CreateSecurityToken(CreateSecurityTokenOperation),
    TransferSecurityToken(TransferSecurityTokenOperation),
    CreateAward(CreateAwardOperation),
    ApproveAward(ApproveAwardOperation),
    RejectAward(RejectAwardOperation),
    CreateAwardWithdrawalRequest(CreateAwardWithdrawalRequestOperation),
    ApproveAwardWithdrawalRequest(ApproveAwardWithdrawalRequestOperation),
    RejectAwardWithdrawalRequest(RejectAwardWithdrawalRequestOperation),
    PayAwardWithdrawalRequest(PayAwardWithdrawalRequestOperation),
    CustomJson(CustomJsonOperation),
    CustomBinary(CustomBinaryOperation),
    ProducerReward(ProducerRewardOperation),
    ProposalExpired(ProposalExpiredOperation),
}

impl Operation {
    fn payload(&self) -> &dyn OperationPayload {
        match self {
            Self::CreateAccount(op) => op,
            Self::UpdateAccount(op) => op,
            Self::Transfer(op) => op,
            Self::CreateAsset(op) => op,
            Self::IssueAsset(op) => op,
            Self::ReserveAsset(op) => op,
            Self::JoinResearchGroupMembership(op) => op,
            Self::LeaveResearchGroupMembership(op) => op,
            Self::CreateAssessment(op) => op,
            Self::CreateProposal(op) => op,
            Self::UpdateProposal(op) => op,
            Self::DeleteProposal(op) => op,
            Self::CreateNdaContract(op) => op,
            Self::SignNdaContract(op) => op,
            Self::CreateSecurityToken(op) => op,
            Self::TransferSecurityToken(op) => op,
            Self::CreateAward(op) => op,
            Self::ApproveAward(op) => op,
            Self::RejectAward(op) => op,
            Self::CreateAwardWithdrawalRequest(op) => op,
            Self::ApproveAwardWithdrawalRequest(op) => op,
            Self::RejectAwardWithdrawalRequest(op) => op,
            Self::PayAwardWithdrawalRequest(op) => op,
            Self::CustomJson(op) => op,
            Self::CustomBinary(op) => op,
            Self::ProducerReward(op) => op,
            Self::ProposalExpired(op) => op,
        }
    }

    /// The stable snake_case name of the operation kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateAccount(_) => "create_account",
            Self::UpdateAccount(_) => "update_account",
            Self::Transfer(_) => "transfer",
            Self::CreateAsset(_) => "create_asset",
            Self::IssueAsset(_) => "issue_asset",
            Self::ReserveAsset(_) => "reserve_asset",
            Self::JoinResearchGroupMembership(_) => "join_research_group_membership",
            Self::LeaveResearchGroupMembership(_) => "leave_research_group_membership",
            Self::CreateAssessment(_) => "create_assessment",
            Self::CreateProposal(_) => "create_proposal",
            Self::UpdateProposal(_) => "update_proposal",
            Self::DeleteProposal(_) => "delete_proposal",
            Self::CreateNdaContract(_) => "create_nda_contract",
            Self::SignNdaContract(_) => "sign_nda_contract",
            Self::CreateSecurityToken(_) => "create_security_token",
            Self::TransferSecurityToken(_) => "transfer_security_token",
            Self::CreateAward(_) => "create_award",
            Self::ApproveAward(_) => "approve_award",
            Self::RejectAward(_) => "reject_award",
            Self::CreateAwardWithdrawalRequest(_) => "create_award_withdrawal_request",
            Self::ApproveAwardWithdrawalRequest(_) => "approve_award_withdrawal_request",
            Self::RejectAwardWithdrawalRequest(_) => "reject_award_withdrawal_request",
            Self::PayAwardWithdrawalRequest(_) => "pay_award_withdrawal_request",
            Self::CustomJson(_) => "custom_json",
            Self::CustomBinary(_) => "custom_binary",
            Self::ProducerReward(_) => "producer_reward",
            Self::ProposalExpired(_) => "proposal_expired",
        }
    }

    /// Checks the operation's own fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.payload().validate()
    }

    /// The signatures this operation requires, with owner taking precedence
    /// over active for an account listed at both levels.
    pub fn required_authorities(&self) -> RequiredAuthorities {
        let payload = self.payload();
        let mut req = RequiredAuthorities::default();
        payload.required_active_authorities(&mut req.active);
        payload.required_owner_authorities(&mut req.owner);
        payload.required_key_authorities(&mut req.keys);
        req.normalized()
    }

    /// Every account this operation touches.
    pub fn impacted_accounts(&self) -> BTreeSet<AccountName> {
        let mut out = BTreeSet::new();
        self.payload().impacted_accounts(&mut out);
        out
    }

    /// Whether the operation is only ever synthesized by the core.
    pub fn is_virtual(&self) -> bool {
        self.payload().is_virtual()
    }
}

macro_rules! impl_from_payload {
    ($($variant:ident($payload:ty)),* $(,)?) => {
        $(
            impl From<$payload> for Operation {
                fn from(op: $payload) -> Self {
                    Self::$variant(op)
                }
            }
        )*
    };
}

impl_from_payload!(
    CreateAccount(CreateAccountOperation),
    UpdateAccount(UpdateAccountOperation),
    Transfer(TransferOperation),
    CreateAsset(CreateAssetOperation),
    IssueAsset(IssueAssetOperation),
    ReserveAsset(ReserveAssetOperation),
    JoinResearchGroupMembership(JoinResearchGroupMembershipOperation),
    LeaveResearchGroupMembership(LeaveResearchGroupMembershipOperation),
    CreateAssessment(CreateAssessmentOperation),
    CreateProposal(CreateProposalOperation),
    UpdateProposal(UpdateProposalOperation),
    DeleteProposal(DeleteProposalOperation),
    CreateNdaContract(CreateNdaContractOperation),
    SignNdaContract(SignNdaContractOperation),
    CreateSecurityToken(CreateSecurityTokenOperation),
    TransferSecurityToken(TransferSecurityTokenOperation),
    CreateAward(CreateAwardOperation),
    ApproveAward(ApproveAwardOperation),
    RejectAward(RejectAwardOperation),
    CreateAwardWithdrawalRequest(CreateAwardWithdrawalRequestOperation),
    ApproveAwardWithdrawalRequest(ApproveAwardWithdrawalRequestOperation),
    RejectAwardWithdrawalRequest(RejectAwardWithdrawalRequestOperation),
    PayAwardWithdrawalRequest(PayAwardWithdrawalRequestOperation),
    CustomJson(CustomJsonOperation),
    CustomBinary(CustomBinaryOperation),
    ProducerReward(ProducerRewardOperation),
    ProposalExpired(ProposalExpiredOperation),
);
