// Path: crates/services/src/award.rs

use deip_types::app::{AwardObject, AwardStatus, AwardWithdrawalRequestObject, WithdrawalRequestStatus};
use deip_types::error::EvaluationError;
use deip_types::protocol::operations::{CreateAwardOperation, CreateAwardWithdrawalRequestOperation};
use deip_types::protocol::TimePointSec;
use parity_scale_codec::Encode;

facade!(
    /// Awards, unique by award number, and their withdrawal requests,
    /// unique by (award number, payment number).
    AwardService
);

impl<S: std::borrow::Borrow<deip_state::ObjectStore>> AwardService<S> {
    pub fn find_award(&self, award_number: &str) -> Result<Option<AwardObject>, EvaluationError> {
        Ok(self.store().find_by("award_number", &award_number.encode())?)
    }

    pub fn get_award(&self, award_number: &str) -> Result<AwardObject, EvaluationError> {
        self.find_award(award_number)?.ok_or_else(|| {
            EvaluationError::Precondition(format!("Award {} does not exist", award_number))
        })
    }

    pub fn find_withdrawal_request(
        &self,
        award_number: &str,
        payment_number: &str,
    ) -> Result<Option<AwardWithdrawalRequestObject>, EvaluationError> {
        Ok(self
            .store()
            .find_by("award_payment", &(award_number, payment_number).encode())?)
    }

    pub fn get_withdrawal_request(
        &self,
        award_number: &str,
        payment_number: &str,
    ) -> Result<AwardWithdrawalRequestObject, EvaluationError> {
        self.find_withdrawal_request(award_number, payment_number)?
            .ok_or_else(|| {
                EvaluationError::Precondition(format!(
                    "Withdrawal request {} for award {} does not exist",
                    payment_number, award_number
                ))
            })
    }

    /// Every withdrawal request filed against `award_number`.
    pub fn withdrawal_requests_of(
        &self,
        award_number: &str,
    ) -> Result<Vec<AwardWithdrawalRequestObject>, EvaluationError> {
        Ok(self.store().scan_by("award_payment", &award_number.encode())?)
    }
}

impl<S: std::borrow::BorrowMut<deip_state::ObjectStore>> AwardService<S> {
    pub fn create_award(
        &mut self,
        op: &CreateAwardOperation,
        now: TimePointSec,
    ) -> Result<AwardObject, EvaluationError> {
        ensure!(
            self.find_award(&op.award_number)?.is_none(),
            "Award {} already exists",
            op.award_number
        );
        Ok(self.store_mut().create::<AwardObject>(|a| {
            a.award_number = op.award_number.clone();
            a.funding_opportunity_number = op.funding_opportunity_number.clone();
            a.creator = op.creator.clone();
            a.awardee = op.awardee.clone();
            a.amount = op.amount;
            a.created_at = now;
        })?)
    }

    pub fn update_award_status(
        &mut self,
        award_number: &str,
        status: AwardStatus,
    ) -> Result<AwardObject, EvaluationError> {
        let award = self.get_award(award_number)?;
        Ok(self
            .store_mut()
            .modify::<AwardObject>(award.id, |a| a.status = status)?)
    }

    /// Adds `amount` to the award's withdrawn total. The total may not
    /// exceed the award amount.
    pub fn record_withdrawal(&mut self, award_number: &str, amount: i64) -> Result<AwardObject, EvaluationError> {
        let award = self.get_award(award_number)?;
        ensure!(
            amount <= award.remaining(),
            "Award {} has {} remaining, {} requested",
            award_number,
            award.remaining(),
            amount
        );
        Ok(self.store_mut().modify::<AwardObject>(award.id, |a| {
            a.withdrawn = a.withdrawn.saturating_add(amount);
        })?)
    }

    pub fn create_withdrawal_request(
        &mut self,
        op: &CreateAwardWithdrawalRequestOperation,
        now: TimePointSec,
    ) -> Result<AwardWithdrawalRequestObject, EvaluationError> {
        ensure!(
            self.find_withdrawal_request(&op.award_number, &op.payment_number)?
                .is_none(),
            "Withdrawal request {} for award {} already exists",
            op.payment_number,
            op.award_number
        );
        Ok(self.store_mut().create::<AwardWithdrawalRequestObject>(|r| {
            r.payment_number = op.payment_number.clone();
            r.award_number = op.award_number.clone();
            r.requester = op.requester.clone();
            r.amount = op.amount;
            r.description = op.description.clone();
            r.attachment = op.attachment.clone();
            r.created_at = now;
        })?)
    }

    pub fn update_withdrawal_status(
        &mut self,
        award_number: &str,
        payment_number: &str,
        status: WithdrawalRequestStatus,
    ) -> Result<AwardWithdrawalRequestObject, EvaluationError> {
        let request = self.get_withdrawal_request(award_number, payment_number)?;
        Ok(self
            .store_mut()
            .modify::<AwardWithdrawalRequestObject>(request.id, |r| r.status = status)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deip_state::ObjectStore;
    use deip_types::protocol::Asset;

    #[test]
    fn withdrawals_are_bounded_by_the_award() {
        let mut store = ObjectStore::new();
        let mut awards = AwardService::new(&mut store);
        let op = CreateAwardOperation {
            award_number: "AW-1".into(),
            funding_opportunity_number: "FO-1".into(),
            creator: "foundation".into(),
            awardee: "alice".into(),
            amount: Asset::core(1000),
        };
        awards.create_award(&op, TimePointSec::default()).unwrap();
        assert!(awards.create_award(&op, TimePointSec::default()).is_err());

        awards.record_withdrawal("AW-1", 600).unwrap();
        assert!(awards.record_withdrawal("AW-1", 401).is_err());
        assert_eq!(awards.record_withdrawal("AW-1", 400).unwrap().remaining(), 0);
    }

    #[test]
    fn requests_are_keyed_by_award_and_payment() {
        let mut store = ObjectStore::new();
        let mut awards = AwardService::new(&mut store);
        for (award, payment) in [("AW-1", "P-1"), ("AW-1", "P-2"), ("AW-2", "P-1")] {
            awards
                .create_withdrawal_request(
                    &CreateAwardWithdrawalRequestOperation {
                        payment_number: payment.into(),
                        award_number: award.into(),
                        requester: "alice".into(),
                        amount: Asset::core(10),
                        description: "travel".into(),
                        attachment: "0".repeat(64),
                    },
                    TimePointSec::default(),
                )
                .unwrap();
        }
        assert_eq!(awards.withdrawal_requests_of("AW-1").unwrap().len(), 2);
        let paid = awards
            .update_withdrawal_status("AW-2", "P-1", WithdrawalRequestStatus::Paid)
            .unwrap();
        assert_eq!(paid.status, WithdrawalRequestStatus::Paid);
        assert!(awards
            .update_withdrawal_status("AW-2", "P-2", WithdrawalRequestStatus::Paid)
            .is_err());
    }
}
