// Path: crates/types/src/protocol/operations/custom.rs

use super::OperationPayload;
use crate::config::DEIP_MAX_CUSTOM_ID_LENGTH;
use crate::error::ValidationError;
use crate::protocol::base::{validate_json, AccountName};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

fn validate_custom_id(id: &str) -> Result<(), ValidationError> {
    ensure!(
        !id.is_empty() && id.len() <= DEIP_MAX_CUSTOM_ID_LENGTH,
        "Custom operation id must be 1 to {} characters, got {}",
        DEIP_MAX_CUSTOM_ID_LENGTH,
        id.len()
    );
    // Each id owns the key prefix `custom/<id>/`, which must not nest.
    ensure!(!id.contains('/'), "Custom operation id may not contain '/'");
    Ok(())
}

/// An application-defined JSON payload, handed to the interpreter registered
/// under `id`.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct CustomJsonOperation {
    /// Accounts signing with active authority.
    pub required_auths: BTreeSet<AccountName>,
    /// Accounts signing with owner authority.
    pub required_owner_auths: BTreeSet<AccountName>,
    /// Interpreter id.
    pub id: String,
    /// The payload. Must parse as JSON.
    pub json: String,
}

impl OperationPayload for CustomJsonOperation {
    fn validate(&self) -> Result<(), ValidationError> {
        ensure!(
            !(self.required_auths.is_empty() && self.required_owner_auths.is_empty()),
            "At least one account must be specified"
        );
        for name in self.required_auths.iter().chain(&self.required_owner_auths) {
            name.validate()?;
        }
        validate_custom_id(&self.id)?;
        validate_json("Custom JSON", &self.json)
    }

    fn required_active_authorities(&self, out: &mut BTreeSet<AccountName>) {
        out.extend(self.required_auths.iter().cloned());
    }

    fn required_owner_authorities(&self, out: &mut BTreeSet<AccountName>) {
        out.extend(self.required_owner_auths.iter().cloned());
    }
}

/// An application-defined opaque payload.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct CustomBinaryOperation {
    /// Accounts signing with active authority.
    pub required_active_auths: BTreeSet<AccountName>,
    /// Accounts signing with owner authority.
    pub required_owner_auths: BTreeSet<AccountName>,
    /// Interpreter id.
    pub id: String,
    /// The payload.
    #[serde(with = "hex::serde")]
    pub data: Vec<u8>,
}

impl OperationPayload for CustomBinaryOperation {
    fn validate(&self) -> Result<(), ValidationError> {
        ensure!(
            !(self.required_active_auths.is_empty() && self.required_owner_auths.is_empty()),
            "At least one account must be specified"
        );
        for name in self.required_active_auths.iter().chain(&self.required_owner_auths) {
            name.validate()?;
        }
        validate_custom_id(&self.id)
    }

    fn required_active_authorities(&self, out: &mut BTreeSet<AccountName>) {
        out.extend(self.required_active_auths.iter().cloned());
    }

    fn required_owner_authorities(&self, out: &mut BTreeSet<AccountName>) {
        out.extend(self.required_owner_auths.iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Operation;

    #[test]
    fn owner_auth_wins_over_active() {
        let op: Operation = CustomJsonOperation {
            required_auths: BTreeSet::from([AccountName::from("alice"), AccountName::from("bob")]),
            required_owner_auths: BTreeSet::from([AccountName::from("alice")]),
            id: "lab".into(),
            json: "{}".into(),
        }
        .into();
        assert!(op.validate().is_ok());
        let req = op.required_authorities();
        assert_eq!(req.active, BTreeSet::from([AccountName::from("bob")]));
        assert_eq!(req.owner, BTreeSet::from([AccountName::from("alice")]));
    }

    #[test]
    fn id_and_payload_rules() {
        let op = CustomJsonOperation {
            required_auths: BTreeSet::from([AccountName::from("alice")]),
            id: "x".repeat(33),
            json: "{}".into(),
            ..Default::default()
        };
        assert!(op.validate().is_err());
        let op = CustomJsonOperation {
            id: "lab".into(),
            json: "not json".into(),
            ..op
        };
        assert!(op.validate().is_err());
        let op = CustomJsonOperation {
            id: "lab/notes".into(),
            json: "{}".into(),
            ..op
        };
        assert!(op.validate().is_err());
    }
}
