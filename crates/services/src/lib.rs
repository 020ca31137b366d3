// Path: crates/services/src/lib.rs
#![forbid(unsafe_code)]
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::todo,
        clippy::unimplemented,
        clippy::indexing_slicing
    )
)]
//! # DEIP Database Services
//!
//! Per-record-kind facades over the shared [`ObjectStore`]. Evaluators and
//! the block pipeline reach ledger records only through these facades,
//! which keep the domain invariants of each record kind in one place.
//!
//! A facade is generic over how it holds the store: `&ObjectStore` gives the
//! read API, `&mut ObjectStore` adds the write API. [`DbServices`] and
//! [`DbView`] hand them out.

use deip_state::ObjectStore;

/// Returns `EvaluationError::Precondition` from the enclosing function when
/// the condition is false.
macro_rules! ensure {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err(deip_types::error::EvaluationError::Precondition(format!($($arg)+)));
        }
    };
}

/// Declares a facade struct holding a store handle, with its constructor and
/// the shared `store` / `store_mut` accessors.
macro_rules! facade {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name<S> {
            store: S,
        }

        impl<S: std::borrow::Borrow<deip_state::ObjectStore>> $name<S> {
            /// Wraps a store handle.
            pub fn new(store: S) -> Self {
                Self { store }
            }

            #[allow(dead_code)]
            fn store(&self) -> &deip_state::ObjectStore {
                self.store.borrow()
            }
        }

        impl<S: std::borrow::BorrowMut<deip_state::ObjectStore>> $name<S> {
            #[allow(dead_code)]
            fn store_mut(&mut self) -> &mut deip_state::ObjectStore {
                self.store.borrow_mut()
            }
        }
    };
}

/// Accounts and assets.
pub mod account;
/// Awards and withdrawal requests.
pub mod award;
/// Chain singletons: dynamic global properties and expertise statistics.
pub mod chain;
/// NDA contracts.
pub mod nda_contract;
/// Proposals.
pub mod proposal;
/// Research group memberships, assessments and security tokens.
pub mod research;
/// Applied transactions and TaPoS block summaries.
pub mod transaction;

pub use account::{AccountService, AssetService};
pub use award::AwardService;
pub use chain::{DynamicGlobalPropertiesService, ExpertiseStatsService};
pub use nda_contract::NdaContractService;
pub use proposal::{NewProposal, ProposalService};
pub use research::{AssessmentService, ResearchGroupService, SecurityTokenService};
pub use transaction::TransactionService;

/// The single factory of mutable facades. Every facade it returns borrows
/// the same store.
#[derive(Debug)]
pub struct DbServices<'a> {
    store: &'a mut ObjectStore,
}

impl<'a> DbServices<'a> {
    /// Wraps the store being mutated.
    pub fn new(store: &'a mut ObjectStore) -> Self {
        Self { store }
    }

    /// The raw store, for undo sessions and interpreter state access.
    pub fn store(&mut self) -> &mut ObjectStore {
        &mut *self.store
    }

    /// A read-only view over the same store.
    pub fn view(&self) -> DbView<'_> {
        DbView::new(&*self.store)
    }

    /// Dynamic global properties and recent entities.
    pub fn dynamic_global_properties(&mut self) -> DynamicGlobalPropertiesService<&mut ObjectStore> {
        DynamicGlobalPropertiesService::new(&mut *self.store)
    }

    /// Expertise statistics.
    pub fn expertise_stats(&mut self) -> ExpertiseStatsService<&mut ObjectStore> {
        ExpertiseStatsService::new(&mut *self.store)
    }

    /// Accounts.
    pub fn accounts(&mut self) -> AccountService<&mut ObjectStore> {
        AccountService::new(&mut *self.store)
    }

    /// Assets and balances.
    pub fn assets(&mut self) -> AssetService<&mut ObjectStore> {
        AssetService::new(&mut *self.store)
    }

    /// Research group memberships.
    pub fn research_groups(&mut self) -> ResearchGroupService<&mut ObjectStore> {
        ResearchGroupService::new(&mut *self.store)
    }

    /// Assessments.
    pub fn assessments(&mut self) -> AssessmentService<&mut ObjectStore> {
        AssessmentService::new(&mut *self.store)
    }

    /// Proposals.
    pub fn proposals(&mut self) -> ProposalService<&mut ObjectStore> {
        ProposalService::new(&mut *self.store)
    }

    /// NDA contracts.
    pub fn nda_contracts(&mut self) -> NdaContractService<&mut ObjectStore> {
        NdaContractService::new(&mut *self.store)
    }

    /// Security tokens.
    pub fn security_tokens(&mut self) -> SecurityTokenService<&mut ObjectStore> {
        SecurityTokenService::new(&mut *self.store)
    }

    /// Awards.
    pub fn awards(&mut self) -> AwardService<&mut ObjectStore> {
        AwardService::new(&mut *self.store)
    }

    /// Transactions and block summaries.
    pub fn transactions(&mut self) -> TransactionService<&mut ObjectStore> {
        TransactionService::new(&mut *self.store)
    }
}

/// Read-only facades over a shared borrow of the store.
#[derive(Debug, Clone, Copy)]
pub struct DbView<'a> {
    store: &'a ObjectStore,
}

impl<'a> DbView<'a> {
    /// Wraps a store for reading.
    pub fn new(store: &'a ObjectStore) -> Self {
        Self { store }
    }

    /// Dynamic global properties and recent entities.
    pub fn dynamic_global_properties(&self) -> DynamicGlobalPropertiesService<&'a ObjectStore> {
        DynamicGlobalPropertiesService::new(self.store)
    }

    /// Expertise statistics.
    pub fn expertise_stats(&self) -> ExpertiseStatsService<&'a ObjectStore> {
        ExpertiseStatsService::new(self.store)
    }

    /// Accounts.
    pub fn accounts(&self) -> AccountService<&'a ObjectStore> {
        AccountService::new(self.store)
    }

    /// Assets and balances.
    pub fn assets(&self) -> AssetService<&'a ObjectStore> {
        AssetService::new(self.store)
    }

    /// Research group memberships.
    pub fn research_groups(&self) -> ResearchGroupService<&'a ObjectStore> {
        ResearchGroupService::new(self.store)
    }

    /// Assessments.
    pub fn assessments(&self) -> AssessmentService<&'a ObjectStore> {
        AssessmentService::new(self.store)
    }

    /// Proposals.
    pub fn proposals(&self) -> ProposalService<&'a ObjectStore> {
        ProposalService::new(self.store)
    }

    /// NDA contracts.
    pub fn nda_contracts(&self) -> NdaContractService<&'a ObjectStore> {
        NdaContractService::new(self.store)
    }

    /// Security tokens.
    pub fn security_tokens(&self) -> SecurityTokenService<&'a ObjectStore> {
        SecurityTokenService::new(self.store)
    }

    /// Awards.
    pub fn awards(&self) -> AwardService<&'a ObjectStore> {
        AwardService::new(self.store)
    }

    /// Transactions and block summaries.
    pub fn transactions(&self) -> TransactionService<&'a ObjectStore> {
        TransactionService::new(self.store)
    }
}
