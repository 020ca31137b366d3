// Path: crates/types/src/protocol/operations/proposal.rs

use super::{Operation, OperationPayload};
use crate::error::ValidationError;
use crate::protocol::authority::AuthorityLevel;
use crate::protocol::base::{AccountName, ExternalId, PublicKey, TimePointSec};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One operation held inside a proposal.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OpWrapper {
    /// The proposed operation.
    pub op: Operation,
}

impl From<Operation> for OpWrapper {
    fn from(op: Operation) -> Self {
        Self { op }
    }
}

/// Proposes a batch of operations that executes once every required
/// authority has approved it.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateProposalOperation {
    /// 160-bit id, unique across proposals.
    pub external_id: ExternalId,
    /// The proposing account.
    pub creator: AccountName,
    /// The batch, executed in order and atomically.
    pub proposed_ops: Vec<OpWrapper>,
    /// When the proposal lapses if still pending.
    pub expiration_time: TimePointSec,
    /// Seconds before expiration during which approvals may only be removed.
    pub review_period_seconds: Option<u32>,
}

impl CreateProposalOperation {
    /// Iterates the proposed operations.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.proposed_ops.iter().map(|w| &w.op)
    }
}

impl OperationPayload for CreateProposalOperation {
    fn validate(&self) -> Result<(), ValidationError> {
        self.external_id.validate("external_id")?;
        self.creator.validate()?;
        ensure!(!self.proposed_ops.is_empty(), "Proposal must contain at least one operation");
        for op in self.operations() {
            op.validate()?;
        }
        NestingGuard::default().visit_create(self)
    }

    fn required_active_authorities(&self, out: &mut BTreeSet<AccountName>) {
        out.insert(self.creator.clone());
    }

    fn impacted_accounts(&self, out: &mut BTreeSet<AccountName>) {
        out.insert(self.creator.clone());
        for op in self.operations() {
            out.extend(op.impacted_accounts());
        }
    }
}

/// Tracks every proposal id seen on the way down a proposal tree.
#[derive(Default)]
struct NestingGuard {
    seen: BTreeSet<ExternalId>,
}

impl NestingGuard {
    fn visit_create(&mut self, proposal: &CreateProposalOperation) -> Result<(), ValidationError> {
        ensure!(
            self.seen.insert(proposal.external_id.clone()),
            "Ambiguous proposal {} detected",
            proposal.external_id
        );

        let (mut creates, mut updates, mut deletes) = (0u8, 0u8, 0u8);
        for op in proposal.operations() {
            match op {
                Operation::CreateProposal(_) => {
                    creates += 1;
                    ensure!(
                        creates == 1,
                        "At most one proposal create can be nested in a single proposal!"
                    );
                }
                Operation::UpdateProposal(update) => {
                    ensure!(
                        !targets_sibling(proposal, &update.external_id, SiblingKind::Update),
                        "Nested proposal can not affect its sibling {} proposal",
                        update.external_id
                    );
                    updates += 1;
                    ensure!(
                        updates == 1,
                        "At most one proposal update can be nested in a single proposal!"
                    );
                }
                Operation::DeleteProposal(delete) => {
                    ensure!(
                        !targets_sibling(proposal, &delete.external_id, SiblingKind::Delete),
                        "Nested proposal can not affect its sibling {} proposal",
                        delete.external_id
                    );
                    deletes += 1;
                    ensure!(
                        deletes == 1,
                        "At most one proposal delete can be nested in a single proposal!"
                    );
                }
                _ => {}
            }
            self.visit(op)?;
        }
        Ok(())
    }

    fn visit(&mut self, op: &Operation) -> Result<(), ValidationError> {
        match op {
            Operation::CreateProposal(nested) => self.visit_create(nested),
            Operation::UpdateProposal(update) => {
                ensure!(
                    !self.seen.contains(&update.external_id),
                    "Nested proposal can not update its parent {} proposal",
                    update.external_id
                );
                Ok(())
            }
            Operation::DeleteProposal(delete) => {
                ensure!(
                    !self.seen.contains(&delete.external_id),
                    "Nested proposal can not delete its parent {} proposal",
                    delete.external_id
                );
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[derive(PartialEq)]
enum SiblingKind {
    Update,
    Delete,
}

/// Whether another proposal operation in the same batch creates, updates or
/// deletes `target`. An update is only checked against creates and deletes
/// and a delete against creates and updates.
fn targets_sibling(parent: &CreateProposalOperation, target: &ExternalId, kind: SiblingKind) -> bool {
    parent.operations().any(|op| match op {
        Operation::CreateProposal(create) => &create.external_id == target,
        Operation::UpdateProposal(update) if kind == SiblingKind::Delete => {
            &update.external_id == target
        }
        Operation::DeleteProposal(delete) if kind == SiblingKind::Update => {
            &delete.external_id == target
        }
        _ => false,
    })
}

/// Adds or removes approvals on a pending proposal.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdateProposalOperation {
    /// The proposal being approved.
    pub external_id: ExternalId,
    /// Accounts approving with their active authority.
    pub active_approvals_to_add: BTreeSet<AccountName>,
    /// Accounts withdrawing an active approval.
    pub active_approvals_to_remove: BTreeSet<AccountName>,
    /// Accounts approving with their owner authority.
    pub owner_approvals_to_add: BTreeSet<AccountName>,
    /// Accounts withdrawing an owner approval.
    pub owner_approvals_to_remove: BTreeSet<AccountName>,
    /// Keys approving directly.
    pub key_approvals_to_add: BTreeSet<PublicKey>,
    /// Keys withdrawing a direct approval.
    pub key_approvals_to_remove: BTreeSet<PublicKey>,
}

impl OperationPayload for UpdateProposalOperation {
    fn validate(&self) -> Result<(), ValidationError> {
        self.external_id.validate("external_id")?;
        ensure!(
            !(self.active_approvals_to_add.is_empty()
                && self.active_approvals_to_remove.is_empty()
                && self.owner_approvals_to_add.is_empty()
                && self.owner_approvals_to_remove.is_empty()
                && self.key_approvals_to_add.is_empty()
                && self.key_approvals_to_remove.is_empty()),
            "Proposal update must add or remove at least one approval"
        );
        for name in self.active_approvals_to_add.iter().chain(&self.active_approvals_to_remove) {
            name.validate()?;
        }
        for name in self.owner_approvals_to_add.iter().chain(&self.owner_approvals_to_remove) {
            name.validate()?;
        }
        ensure!(
            self.active_approvals_to_add.is_disjoint(&self.active_approvals_to_remove)
                && self.owner_approvals_to_add.is_disjoint(&self.owner_approvals_to_remove)
                && self.key_approvals_to_add.is_disjoint(&self.key_approvals_to_remove),
            "Cannot add and remove approval at the same time."
        );
        Ok(())
    }

    fn required_active_authorities(&self, out: &mut BTreeSet<AccountName>) {
        out.extend(self.active_approvals_to_add.iter().cloned());
        out.extend(self.active_approvals_to_remove.iter().cloned());
    }

    fn required_owner_authorities(&self, out: &mut BTreeSet<AccountName>) {
        out.extend(self.owner_approvals_to_add.iter().cloned());
        out.extend(self.owner_approvals_to_remove.iter().cloned());
    }

    fn required_key_authorities(&self, out: &mut BTreeSet<PublicKey>) {
        out.extend(self.key_approvals_to_add.iter().cloned());
        out.extend(self.key_approvals_to_remove.iter().cloned());
    }
}

/// Withdraws a pending proposal.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct DeleteProposalOperation {
    /// The proposal being deleted.
    pub external_id: ExternalId,
    /// The proposer or one of the required approvers.
    pub account: AccountName,
    /// The authority level `account` signs with.
    pub authority: AuthorityLevel,
}

impl OperationPayload for DeleteProposalOperation {
    fn validate(&self) -> Result<(), ValidationError> {
        self.external_id.validate("external_id")?;
        self.account.validate()
    }

    fn required_active_authorities(&self, out: &mut BTreeSet<AccountName>) {
        if self.authority == AuthorityLevel::Active {
            out.insert(self.account.clone());
        }
    }

    fn required_owner_authorities(&self, out: &mut BTreeSet<AccountName>) {
        if self.authority == AuthorityLevel::Owner {
            out.insert(self.account.clone());
        }
    }
}
