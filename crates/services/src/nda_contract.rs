// Path: crates/services/src/nda_contract.rs

use deip_types::app::{NdaContractObject, NdaContractStatus};
use deip_types::error::EvaluationError;
use deip_types::protocol::operations::CreateNdaContractOperation;
use deip_types::protocol::{AccountName, ExternalId, TimePointSec};
use parity_scale_codec::Encode;

facade!(
    /// Non-disclosure agreements between two accounts.
    NdaContractService
);

impl<S: std::borrow::Borrow<deip_state::ObjectStore>> NdaContractService<S> {
    pub fn find_contract(&self, external_id: &ExternalId) -> Result<Option<NdaContractObject>, EvaluationError> {
        Ok(self.store().find_by("external_id", &external_id.encode())?)
    }

    pub fn get_contract(&self, external_id: &ExternalId) -> Result<NdaContractObject, EvaluationError> {
        self.find_contract(external_id)?.ok_or_else(|| {
            EvaluationError::Precondition(format!("NDA contract {} does not exist", external_id))
        })
    }
}

impl<S: std::borrow::BorrowMut<deip_state::ObjectStore>> NdaContractService<S> {
    /// Stores a pending contract. The start time defaults to `now`.
    pub fn create_contract(
        &mut self,
        op: &CreateNdaContractOperation,
        now: TimePointSec,
    ) -> Result<NdaContractObject, EvaluationError> {
        let start_time = op.start_time.unwrap_or(now);
        ensure!(
            start_time >= now,
            "NDA start date ({}) must be later or equal to the current moment ({})",
            start_time,
            now
        );
        ensure!(
            op.end_time > now,
            "NDA end date ({}) must be later the current moment ({})",
            op.end_time,
            now
        );
        Ok(self.store_mut().create::<NdaContractObject>(|c| {
            c.external_id = op.external_id.clone();
            c.creator = op.creator.clone();
            c.party_a = op.party_a.clone();
            c.party_b = op.party_b.clone();
            c.disclosing_party = op.disclosing_party.clone();
            c.title = op.title.clone();
            c.contract_hash = op.contract_hash.clone();
            c.created_at = now;
            c.start_time = start_time;
            c.end_time = op.end_time;
        })?)
    }

    /// Records `signer`'s signature. The contract becomes `Signed` once both
    /// parties have signed.
    pub fn sign(
        &mut self,
        external_id: &ExternalId,
        signer: &AccountName,
        signature: &str,
        now: TimePointSec,
    ) -> Result<NdaContractObject, EvaluationError> {
        let contract = self.get_contract(external_id)?;
        ensure!(
            contract.is_party(signer),
            "Account '{}' is not a party of NDA contract {}",
            signer,
            external_id
        );
        ensure!(
            contract.end_time > now,
            "NDA contract {} has expired",
            external_id
        );
        let already_signed = if &contract.party_a == signer {
            contract.party_a_signature.is_some()
        } else {
            contract.party_b_signature.is_some()
        };
        ensure!(
            !already_signed,
            "Account '{}' has already signed NDA contract {}",
            signer,
            external_id
        );
        Ok(self.store_mut().modify::<NdaContractObject>(contract.id, |c| {
            if &c.party_a == signer {
                c.party_a_signature = Some(signature.to_string());
            } else {
                c.party_b_signature = Some(signature.to_string());
            }
            if c.party_a_signature.is_some() && c.party_b_signature.is_some() {
                c.status = NdaContractStatus::Signed;
            }
        })?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deip_state::ObjectStore;
    use std::collections::BTreeSet;

    fn create_op() -> CreateNdaContractOperation {
        CreateNdaContractOperation {
            external_id: ExternalId::new("c".repeat(40)),
            creator: "alice".into(),
            party_a: "alice".into(),
            party_b: "bob".into(),
            disclosing_party: BTreeSet::from(["alice".into()]),
            title: "Joint research".into(),
            contract_hash: "d".repeat(64),
            start_time: None,
            end_time: TimePointSec::from_secs(5000),
        }
    }

    #[test]
    fn both_parties_sign() {
        let now = TimePointSec::from_secs(100);
        let mut store = ObjectStore::new();
        let mut ndas = NdaContractService::new(&mut store);
        let op = create_op();
        let created = ndas.create_contract(&op, now).unwrap();
        assert_eq!(created.start_time, now);
        assert_eq!(created.status, NdaContractStatus::Pending);

        let sig = "e".repeat(130);
        assert!(ndas.sign(&op.external_id, &"carol".into(), &sig, now).is_err());
        ndas.sign(&op.external_id, &"alice".into(), &sig, now).unwrap();
        assert!(ndas.sign(&op.external_id, &"alice".into(), &sig, now).is_err());
        let signed = ndas.sign(&op.external_id, &"bob".into(), &sig, now).unwrap();
        assert_eq!(signed.status, NdaContractStatus::Signed);
    }

    #[test]
    fn start_in_the_past_is_rejected() {
        let mut store = ObjectStore::new();
        let mut ndas = NdaContractService::new(&mut store);
        let op = CreateNdaContractOperation {
            start_time: Some(TimePointSec::from_secs(50)),
            ..create_op()
        };
        assert!(ndas.create_contract(&op, TimePointSec::from_secs(100)).is_err());
    }
}
