// Path: crates/types/src/protocol/operations/asset.rs

use super::OperationPayload;
use crate::config::DEIP_MAX_MEMO_SIZE;
use crate::error::ValidationError;
use crate::protocol::asset::{validate_symbol_name, Asset, AssetSymbol};
use crate::protocol::base::AccountName;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Defines a new fungible asset issued by `issuer`.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateAssetOperation {
    /// The only account allowed to issue the asset.
    pub issuer: AccountName,
    /// Ticker, 1 to 6 uppercase letters.
    pub symbol: String,
    /// Decimal places, below 15.
    pub precision: u8,
    /// Upper bound on the circulating supply.
    pub max_supply: i64,
    /// Free-form description.
    pub description: String,
}

impl CreateAssetOperation {
    /// The packed symbol this operation defines.
    pub fn asset_symbol(&self) -> Result<AssetSymbol, ValidationError> {
        AssetSymbol::new(self.precision, &self.symbol)
    }
}

impl OperationPayload for CreateAssetOperation {
    fn validate(&self) -> Result<(), ValidationError> {
        self.issuer.validate()?;
        validate_symbol_name(&self.symbol)?;
        self.asset_symbol()?;
        ensure!(self.max_supply > 0, "Maximum supply must be greater than 0");
        ensure!(
            self.description.len() < DEIP_MAX_MEMO_SIZE,
            "Asset description is too large"
        );
        Ok(())
    }

    fn required_active_authorities(&self, out: &mut BTreeSet<AccountName>) {
        out.insert(self.issuer.clone());
    }
}

/// Mints new units of an asset to `recipient`.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct IssueAssetOperation {
    /// Must be the asset's issuer.
    pub issuer: AccountName,
    /// Amount to mint.
    pub amount: Asset,
    /// The credited account.
    pub recipient: AccountName,
}

impl OperationPayload for IssueAssetOperation {
    fn validate(&self) -> Result<(), ValidationError> {
        self.issuer.validate()?;
        self.recipient.validate()?;
        self.amount.symbol.validate()?;
        ensure!(self.amount.amount > 0, "Amount to issue must be greater than 0");
        Ok(())
    }

    fn required_active_authorities(&self, out: &mut BTreeSet<AccountName>) {
        out.insert(self.issuer.clone());
    }

    fn impacted_accounts(&self, out: &mut BTreeSet<AccountName>) {
        out.insert(self.issuer.clone());
        out.insert(self.recipient.clone());
    }
}

/// Takes units of an asset out of circulation.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ReserveAssetOperation {
    /// The debited account.
    pub owner: AccountName,
    /// Amount to remove from circulation.
    pub amount: Asset,
}

impl OperationPayload for ReserveAssetOperation {
    fn validate(&self) -> Result<(), ValidationError> {
        self.owner.validate()?;
        ensure!(self.amount.amount > 0, "Amount to reserve must be greater than 0");
        self.amount.symbol.validate()
    }

    fn required_active_authorities(&self, out: &mut BTreeSet<AccountName>) {
        out.insert(self.owner.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserving_nothing_is_invalid() {
        let op = ReserveAssetOperation {
            owner: "alice".into(),
            amount: Asset::core(0),
        };
        let err = op.validate().unwrap_err();
        assert_eq!(err, ValidationError::Constraint("Amount to reserve must be greater than 0".into()));
    }

    #[test]
    fn create_asset_bounds() {
        let op = CreateAssetOperation {
            issuer: "alice".into(),
            symbol: "LAB".into(),
            precision: 2,
            max_supply: 1_000_000,
            description: "lab credits".into(),
        };
        assert!(op.validate().is_ok());
        assert!(CreateAssetOperation { precision: 15, ..op.clone() }.validate().is_err());
        assert!(CreateAssetOperation { symbol: "LABORATORY".into(), ..op.clone() }.validate().is_err());
        assert!(CreateAssetOperation { max_supply: 0, ..op }.validate().is_err());
    }
}
