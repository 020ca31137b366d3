// Path: crates/types/src/protocol/operations/nda_contract.rs

use super::OperationPayload;
use crate::config::DEIP_MAX_NDA_TITLE_LENGTH;
use crate::error::ValidationError;
use crate::protocol::base::{
    validate_hex, AccountName, ExternalId, TimePointSec, HASH_BITS, SIGNATURE_BITS,
};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Opens a one-way non-disclosure agreement from `party_a` to `party_b`.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateNdaContractOperation {
    /// 160-bit id, unique across contracts.
    pub external_id: ExternalId,
    /// Must be `party_a`.
    pub creator: AccountName,
    /// The disclosing side.
    pub party_a: AccountName,
    /// The receiving side.
    pub party_b: AccountName,
    /// Exactly `{party_a}`.
    pub disclosing_party: BTreeSet<AccountName>,
    /// Human-readable title, 1 to 199 bytes.
    pub title: String,
    /// 256-bit hash of the agreement text.
    pub contract_hash: String,
    /// Effective from; head block time when absent.
    pub start_time: Option<TimePointSec>,
    /// Effective until.
    pub end_time: TimePointSec,
}

impl OperationPayload for CreateNdaContractOperation {
    fn validate(&self) -> Result<(), ValidationError> {
        self.external_id.validate("external_id")?;
        self.creator.validate()?;
        self.party_a.validate()?;
        self.party_b.validate()?;
        ensure!(self.party_a != self.party_b, "Parties must not be the same accounts");
        ensure!(
            self.creator == self.party_a,
            "Two-way NDA contracts are not supported currently"
        );
        ensure!(
            self.disclosing_party.len() == 1 && self.disclosing_party.contains(&self.party_a),
            "Two-way NDA contracts are not supported currently"
        );
        ensure!(
            !self.title.is_empty() && self.title.len() <= DEIP_MAX_NDA_TITLE_LENGTH,
            "Contract title must be specified in length from 1 to 200 characters"
        );
        validate_hex("contract_hash", &self.contract_hash, HASH_BITS)?;
        if let Some(start) = self.start_time {
            ensure!(start < self.end_time, "NDA start date must be earlier than end date");
        }
        Ok(())
    }

    fn required_active_authorities(&self, out: &mut BTreeSet<AccountName>) {
        out.insert(self.creator.clone());
    }

    fn impacted_accounts(&self, out: &mut BTreeSet<AccountName>) {
        out.insert(self.party_a.clone());
        out.insert(self.party_b.clone());
    }
}

/// Adds one party's signature to a contract.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct SignNdaContractOperation {
    /// The contract being signed.
    pub external_id: ExternalId,
    /// One of the two parties.
    pub signer: AccountName,
    /// 520-bit detached signature over the contract hash.
    pub signature: String,
}

impl OperationPayload for SignNdaContractOperation {
    fn validate(&self) -> Result<(), ValidationError> {
        self.external_id.validate("external_id")?;
        self.signer.validate()?;
        validate_hex("signature", &self.signature, SIGNATURE_BITS)
    }

    fn required_active_authorities(&self, out: &mut BTreeSet<AccountName>) {
        out.insert(self.signer.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nda() -> CreateNdaContractOperation {
        CreateNdaContractOperation {
            external_id: ExternalId::new("1".repeat(40)),
            creator: "alice".into(),
            party_a: "alice".into(),
            party_b: "bob".into(),
            disclosing_party: BTreeSet::from([AccountName::from("alice")]),
            title: "Joint research".into(),
            contract_hash: "ab".repeat(32),
            start_time: Some(TimePointSec(100)),
            end_time: TimePointSec(200),
        }
    }

    #[test]
    fn one_way_contracts_only() {
        assert!(nda().validate().is_ok());
        let two_way = CreateNdaContractOperation {
            disclosing_party: BTreeSet::from([AccountName::from("alice"), AccountName::from("bob")]),
            ..nda()
        };
        assert!(two_way.validate().is_err());
        let by_b = CreateNdaContractOperation {
            creator: "bob".into(),
            ..nda()
        };
        assert!(by_b.validate().is_err());
        let untitled = CreateNdaContractOperation {
            title: String::new(),
            ..nda()
        };
        assert!(untitled.validate().is_err());
    }

    #[test]
    fn short_signature_is_rejected() {
        // 519 bits does not fill whole hex digits; the nearest string is one
        // character short of 130.
        let sign = SignNdaContractOperation {
            external_id: ExternalId::new("1".repeat(40)),
            signer: "bob".into(),
            signature: "f".repeat(129),
        };
        assert!(matches!(
            sign.validate(),
            Err(ValidationError::HexWidth {
                field: "signature",
                bits: 520,
                expected: 130,
                actual: 129
            })
        ));
        let ok = SignNdaContractOperation {
            signature: "f".repeat(130),
            ..sign
        };
        assert!(ok.validate().is_ok());
    }
}
