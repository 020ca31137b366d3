// Path: crates/types/src/app/mod.rs
//! Persistent record kinds kept in the object store, and the notification
//! view published for every applied operation.
//!
//! Index keys are SCALE encodings of the indexed fields, so a composite key
//! starts with the encoding of its first component and can be prefix-scanned
//! by it. Time-ordered indexes use big-endian seconds so that byte order is
//! time order.

/// Accounts, assets and balances.
pub mod account;
/// Awards and withdrawal requests.
pub mod award;
/// Chain-wide singletons and bookkeeping records.
pub mod chain;
/// Non-disclosure agreements.
pub mod nda_contract;
/// The per-operation notification view.
pub mod notification;
/// Proposals.
pub mod proposal;
/// Research group memberships, assessments and security tokens.
pub mod research;

pub use account::{AccountBalanceObject, AccountObject, AssetObject};
pub use award::{AwardObject, AwardStatus, AwardWithdrawalRequestObject, WithdrawalRequestStatus};
pub use chain::{
    BlockSummaryObject, DynamicGlobalPropertyObject, ExpertiseSample, ExpertiseStatsObject,
    RecentEntityObject, TransactionObject,
};
pub use nda_contract::{NdaContractObject, NdaContractStatus};
pub use notification::OperationNotification;
pub use proposal::{ProposalObject, ProposalStatus};
pub use research::{
    AssessmentObject, ResearchGroupMembershipObject, SecurityTokenBalanceObject,
    SecurityTokenObject,
};

/// Big-endian seconds, for time-ordered index keys.
pub fn time_key(t: crate::protocol::TimePointSec) -> Vec<u8> {
    t.secs().to_be_bytes().to_vec()
}
