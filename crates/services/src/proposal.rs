// Path: crates/services/src/proposal.rs

use deip_types::app::{time_key, ProposalObject, ProposalStatus};
use deip_types::error::EvaluationError;
use deip_types::protocol::operations::{OpWrapper, UpdateProposalOperation};
use deip_types::protocol::{AccountName, ExternalId, TimePointSec};
use parity_scale_codec::Encode;
use std::collections::BTreeSet;

/// The fields of a proposal fixed at creation.
#[derive(Debug, Clone)]
pub struct NewProposal {
    pub external_id: ExternalId,
    pub proposer: AccountName,
    pub proposed_ops: Vec<OpWrapper>,
    pub expiration_time: TimePointSec,
    pub review_period_time: Option<TimePointSec>,
    pub required_active_approvals: BTreeSet<AccountName>,
    pub required_owner_approvals: BTreeSet<AccountName>,
    pub created_at: TimePointSec,
}

facade!(
    /// Proposals, unique by external id and ordered by expiration.
    ProposalService
);

impl<S: std::borrow::Borrow<deip_state::ObjectStore>> ProposalService<S> {
    pub fn find_proposal(&self, external_id: &ExternalId) -> Result<Option<ProposalObject>, EvaluationError> {
        Ok(self.store().find_by("external_id", &external_id.encode())?)
    }

    pub fn get_proposal(&self, external_id: &ExternalId) -> Result<ProposalObject, EvaluationError> {
        self.find_proposal(external_id)?.ok_or_else(|| {
            EvaluationError::Precondition(format!("Proposal {} does not exist", external_id))
        })
    }

    /// Proposals whose expiration time is at or before `now`, earliest first.
    pub fn expired_proposals(&self, now: TimePointSec) -> Result<Vec<ProposalObject>, EvaluationError> {
        let bound = time_key(now.saturating_add(1));
        if now.secs() == u32::MAX {
            return Ok(self.store().scan_by("expiration", &[])?);
        }
        Ok(self.store().scan_below("expiration", &bound)?)
    }
}

impl<S: std::borrow::BorrowMut<deip_state::ObjectStore>> ProposalService<S> {
    pub fn create_proposal(&mut self, new: NewProposal) -> Result<ProposalObject, EvaluationError> {
        ensure!(
            self.find_proposal(&new.external_id)?.is_none(),
            "Proposal {} already exists",
            new.external_id
        );
        let proposal = self.store_mut().create::<ProposalObject>(|p| {
            p.external_id = new.external_id;
            p.proposer = new.proposer;
            p.proposed_ops = new.proposed_ops;
            p.expiration_time = new.expiration_time;
            p.review_period_time = new.review_period_time;
            p.required_active_approvals = new.required_active_approvals;
            p.required_owner_approvals = new.required_owner_approvals;
            p.created_at = new.created_at;
        })?;
        log::info!(
            "Proposal {} created by '{}' with {} operation(s)",
            proposal.external_id,
            proposal.proposer,
            proposal.proposed_ops.len()
        );
        Ok(proposal)
    }

    /// Applies the approval changes of an `update_proposal`. Adding an
    /// approval that is already present, or removing one that is not, fails.
    pub fn update_approvals(&mut self, op: &UpdateProposalOperation) -> Result<ProposalObject, EvaluationError> {
        let proposal = self.get_proposal(&op.external_id)?;
        for account in &op.active_approvals_to_add {
            ensure!(
                !proposal.available_active_approvals.contains(account),
                "Active approval of '{}' is already present",
                account
            );
        }
        for account in &op.active_approvals_to_remove {
            ensure!(
                proposal.available_active_approvals.contains(account),
                "Active approval of '{}' is not present",
                account
            );
        }
        for account in &op.owner_approvals_to_add {
            ensure!(
                !proposal.available_owner_approvals.contains(account),
                "Owner approval of '{}' is already present",
                account
            );
        }
        for account in &op.owner_approvals_to_remove {
            ensure!(
                proposal.available_owner_approvals.contains(account),
                "Owner approval of '{}' is not present",
                account
            );
        }
        for key in &op.key_approvals_to_add {
            ensure!(
                !proposal.available_key_approvals.contains(key),
                "Key approval of '{}' is already present",
                key
            );
        }
        for key in &op.key_approvals_to_remove {
            ensure!(
                proposal.available_key_approvals.contains(key),
                "Key approval of '{}' is not present",
                key
            );
        }
        Ok(self.store_mut().modify::<ProposalObject>(proposal.id, |p| {
            p.available_active_approvals
                .extend(op.active_approvals_to_add.iter().cloned());
            p.available_active_approvals
                .retain(|a| !op.active_approvals_to_remove.contains(a));
            p.available_owner_approvals
                .extend(op.owner_approvals_to_add.iter().cloned());
            p.available_owner_approvals
                .retain(|a| !op.owner_approvals_to_remove.contains(a));
            p.available_key_approvals
                .extend(op.key_approvals_to_add.iter().cloned());
            p.available_key_approvals
                .retain(|k| !op.key_approvals_to_remove.contains(k));
        })?)
    }

    pub fn set_status(
        &mut self,
        external_id: &ExternalId,
        status: ProposalStatus,
        fail_reason: Option<String>,
    ) -> Result<ProposalObject, EvaluationError> {
        let proposal = self.get_proposal(external_id)?;
        Ok(self.store_mut().modify::<ProposalObject>(proposal.id, |p| {
            p.status = status;
            p.fail_reason = fail_reason;
        })?)
    }

    pub fn remove_proposal(&mut self, external_id: &ExternalId) -> Result<ProposalObject, EvaluationError> {
        let proposal = self.get_proposal(external_id)?;
        Ok(self.store_mut().remove::<ProposalObject>(proposal.id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deip_state::ObjectStore;
    use deip_types::protocol::PublicKey;

    fn new(id: char, expires: u32) -> NewProposal {
        NewProposal {
            external_id: ExternalId::new(id.to_string().repeat(40)),
            proposer: "alice".into(),
            proposed_ops: vec![],
            expiration_time: TimePointSec::from_secs(expires),
            review_period_time: None,
            required_active_approvals: BTreeSet::from(["alice".into()]),
            required_owner_approvals: BTreeSet::new(),
            created_at: TimePointSec::from_secs(1),
        }
    }

    #[test]
    fn approvals_are_added_and_removed() {
        let mut store = ObjectStore::new();
        let mut proposals = ProposalService::new(&mut store);
        let p = proposals.create_proposal(new('a', 100)).unwrap();
        assert!(proposals.create_proposal(new('a', 100)).is_err());

        let mut add = UpdateProposalOperation {
            external_id: p.external_id.clone(),
            ..Default::default()
        };
        add.active_approvals_to_add.insert("alice".into());
        add.key_approvals_to_add.insert(PublicKey::new("DEIP5key"));
        let updated = proposals.update_approvals(&add).unwrap();
        assert!(updated.is_approved_by(&"alice".into()));
        assert!(proposals.update_approvals(&add).is_err());

        let mut remove = UpdateProposalOperation {
            external_id: p.external_id.clone(),
            ..Default::default()
        };
        remove.active_approvals_to_remove.insert("alice".into());
        let updated = proposals.update_approvals(&remove).unwrap();
        assert!(!updated.is_approved_by(&"alice".into()));
        assert_eq!(updated.available_key_approvals.len(), 1);
    }

    #[test]
    fn expired_proposals_in_expiration_order() {
        let mut store = ObjectStore::new();
        let mut proposals = ProposalService::new(&mut store);
        proposals.create_proposal(new('a', 300)).unwrap();
        proposals.create_proposal(new('b', 100)).unwrap();
        proposals.create_proposal(new('c', 200)).unwrap();
        let expired: Vec<_> = proposals
            .expired_proposals(TimePointSec::from_secs(200))
            .unwrap()
            .into_iter()
            .map(|p| p.expiration_time.secs())
            .collect();
        assert_eq!(expired, vec![100, 200]);

        proposals.remove_proposal(&ExternalId::new("b".repeat(40))).unwrap();
        assert_eq!(
            proposals.expired_proposals(TimePointSec::from_secs(u32::MAX)).unwrap().len(),
            2
        );
    }
}
