// Path: crates/services/src/research.rs

use deip_types::app::{
    AssessmentObject, ResearchGroupMembershipObject, SecurityTokenBalanceObject,
    SecurityTokenObject,
};
use deip_types::error::EvaluationError;
use deip_types::protocol::operations::AssessmentStage;
use deip_types::protocol::{AccountName, ExternalId, Percent, TimePointSec};
use parity_scale_codec::Encode;
use std::collections::BTreeSet;

// --- Research groups ---

facade!(
    /// Research group memberships, unique by (group, member) and ordered by
    /// member.
    ResearchGroupService
);

impl<S: std::borrow::Borrow<deip_state::ObjectStore>> ResearchGroupService<S> {
    pub fn find_membership(
        &self,
        group: &AccountName,
        member: &AccountName,
    ) -> Result<Option<ResearchGroupMembershipObject>, EvaluationError> {
        Ok(self.store().find_by("group_member", &(group, member).encode())?)
    }

    pub fn is_member(&self, group: &AccountName, member: &AccountName) -> Result<bool, EvaluationError> {
        Ok(self.find_membership(group, member)?.is_some())
    }

    /// Every membership of `group`, ordered by member name encoding.
    pub fn members_of(&self, group: &AccountName) -> Result<Vec<ResearchGroupMembershipObject>, EvaluationError> {
        Ok(self.store().scan_by("group_member", &group.encode())?)
    }

    /// Every group `member` belongs to.
    pub fn memberships_of(
        &self,
        member: &AccountName,
    ) -> Result<Vec<ResearchGroupMembershipObject>, EvaluationError> {
        Ok(self.store().scan_by("member", &member.encode())?)
    }
}

impl<S: std::borrow::BorrowMut<deip_state::ObjectStore>> ResearchGroupService<S> {
    pub fn add_member(
        &mut self,
        group: &AccountName,
        member: &AccountName,
        weight: Percent,
        researches: Option<BTreeSet<ExternalId>>,
        joined_at: TimePointSec,
    ) -> Result<ResearchGroupMembershipObject, EvaluationError> {
        ensure!(
            !self.is_member(group, member)?,
            "Account '{}' is already a member of '{}' research group",
            member,
            group
        );
        Ok(self.store_mut().create::<ResearchGroupMembershipObject>(|m| {
            m.research_group = group.clone();
            m.member = member.clone();
            m.weight = weight;
            m.researches = researches;
            m.joined_at = joined_at;
        })?)
    }

    pub fn remove_member(
        &mut self,
        group: &AccountName,
        member: &AccountName,
    ) -> Result<ResearchGroupMembershipObject, EvaluationError> {
        let Some(membership) = self.find_membership(group, member)? else {
            return Err(EvaluationError::Precondition(format!(
                "Account '{}' is not a member of '{}' research group",
                member, group
            )));
        };
        Ok(self
            .store_mut()
            .remove::<ResearchGroupMembershipObject>(membership.id)?)
    }
}

// --- Assessments ---

facade!(
    /// Assessments, unique by external id.
    AssessmentService
);

impl<S: std::borrow::Borrow<deip_state::ObjectStore>> AssessmentService<S> {
    pub fn find_assessment(&self, external_id: &ExternalId) -> Result<Option<AssessmentObject>, EvaluationError> {
        Ok(self.store().find_by("external_id", &external_id.encode())?)
    }

    pub fn get_assessment(&self, external_id: &ExternalId) -> Result<AssessmentObject, EvaluationError> {
        Ok(self.store().get_by("external_id", &external_id.encode())?)
    }
}

impl<S: std::borrow::BorrowMut<deip_state::ObjectStore>> AssessmentService<S> {
    /// Stores a new assessment. A second assessment with the same external
    /// id is a `DuplicateKey` store error.
    pub fn create_assessment(
        &mut self,
        external_id: &ExternalId,
        creator: &AccountName,
        stages: Vec<AssessmentStage>,
        created_at: TimePointSec,
    ) -> Result<AssessmentObject, EvaluationError> {
        Ok(self.store_mut().create::<AssessmentObject>(|a| {
            a.external_id = external_id.clone();
            a.creator = creator.clone();
            a.stages = stages;
            a.created_at = created_at;
        })?)
    }
}

// --- Security tokens ---

facade!(
    /// Security token definitions and balances, unique by (token, owner).
    SecurityTokenService
);

impl<S: std::borrow::Borrow<deip_state::ObjectStore>> SecurityTokenService<S> {
    pub fn find_security_token(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<SecurityTokenObject>, EvaluationError> {
        Ok(self.store().find_by("external_id", &external_id.encode())?)
    }

    fn find_balance(
        &self,
        token: &ExternalId,
        owner: &AccountName,
    ) -> Result<Option<SecurityTokenBalanceObject>, EvaluationError> {
        Ok(self.store().find_by("token_owner", &(token, owner).encode())?)
    }

    /// Units of `token` held by `owner`; zero when none.
    pub fn get_balance(&self, token: &ExternalId, owner: &AccountName) -> Result<u32, EvaluationError> {
        Ok(self.find_balance(token, owner)?.map(|b| b.amount).unwrap_or(0))
    }

    /// All holders of `token`.
    pub fn holders_of(&self, token: &ExternalId) -> Result<Vec<SecurityTokenBalanceObject>, EvaluationError> {
        Ok(self.store().scan_by("token_owner", &token.encode())?)
    }
}

impl<S: std::borrow::BorrowMut<deip_state::ObjectStore>> SecurityTokenService<S> {
    /// Creates a token and credits its whole amount to `owner`.
    pub fn create_security_token(
        &mut self,
        external_id: &ExternalId,
        research_external_id: &ExternalId,
        owner: &AccountName,
        amount: u32,
    ) -> Result<SecurityTokenObject, EvaluationError> {
        ensure!(
            self.find_security_token(external_id)?.is_none(),
            "Security token {} already exists",
            external_id
        );
        let token = self.store_mut().create::<SecurityTokenObject>(|t| {
            t.external_id = external_id.clone();
            t.research_external_id = research_external_id.clone();
            t.issuer = owner.clone();
            t.total_amount = amount;
        })?;
        self.credit(external_id, owner, amount)?;
        Ok(token)
    }

    fn credit(&mut self, token: &ExternalId, owner: &AccountName, amount: u32) -> Result<(), EvaluationError> {
        match self.find_balance(token, owner)? {
            Some(balance) => {
                let Some(updated) = balance.amount.checked_add(amount) else {
                    return Err(EvaluationError::Precondition(format!(
                        "Security token {} balance of '{}' overflows",
                        token, owner
                    )));
                };
                self.store_mut()
                    .modify::<SecurityTokenBalanceObject>(balance.id, |b| b.amount = updated)?;
            }
            None => {
                self.store_mut().create::<SecurityTokenBalanceObject>(|b| {
                    b.security_token_external_id = token.clone();
                    b.owner = owner.clone();
                    b.amount = amount;
                })?;
            }
        }
        Ok(())
    }

    /// Moves `amount` units of `token` from `from` to `to`. An emptied
    /// balance record is removed.
    pub fn transfer(
        &mut self,
        token: &ExternalId,
        from: &AccountName,
        to: &AccountName,
        amount: u32,
    ) -> Result<(), EvaluationError> {
        let source = self.find_balance(token, from)?;
        let available = source.as_ref().map(|b| b.amount).unwrap_or(0);
        ensure!(
            available >= amount,
            "Account '{}' has {} units of security token {}, {} required",
            from,
            available,
            token,
            amount
        );
        if let Some(source) = source {
            if source.amount == amount {
                self.store_mut().remove::<SecurityTokenBalanceObject>(source.id)?;
            } else {
                self.store_mut()
                    .modify::<SecurityTokenBalanceObject>(source.id, |b| b.amount -= amount)?;
            }
        }
        self.credit(token, to, amount)
    }
}
