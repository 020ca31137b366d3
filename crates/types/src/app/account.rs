// Path: crates/types/src/app/account.rs

use crate::keys::{ACCOUNT_BALANCE_TABLE, ACCOUNT_TABLE, ASSET_TABLE};
use crate::object_id_accessors;
use crate::protocol::{AccountName, Asset, AssetSymbol, Authority, PublicKey, TimePointSec};
use crate::store::{IndexEntry, Object, ObjectId};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// A registered account.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct AccountObject {
    /// Primary id.
    pub id: ObjectId,
    /// Unique account name.
    pub name: AccountName,
    /// Account-control authority.
    pub owner: Authority,
    /// Day-to-day signing authority.
    pub active: Authority,
    /// Memo encryption key.
    pub memo_key: PublicKey,
    /// Free-form JSON metadata.
    pub json_metadata: Option<String>,
    /// The account that paid for the registration, if any.
    pub creator: Option<AccountName>,
    /// Registration time.
    pub created: TimePointSec,
}

impl Object for AccountObject {
    const TABLE: &'static [u8] = ACCOUNT_TABLE;
    const NAME: &'static str = "account";
    object_id_accessors!();

    fn indexes(&self) -> Vec<IndexEntry> {
        vec![IndexEntry::unique("name", self.name.encode())]
    }
}

/// A fungible asset definition.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct AssetObject {
    /// Primary id.
    pub id: ObjectId,
    /// Packed symbol with precision.
    pub symbol: AssetSymbol,
    /// The ticker; unique regardless of precision.
    pub string_symbol: String,
    /// The only account allowed to issue.
    pub issuer: AccountName,
    /// Upper bound on `current_supply`.
    pub max_supply: i64,
    /// Units in circulation.
    pub current_supply: i64,
    /// Free-form description.
    pub description: String,
}

impl Object for AssetObject {
    const TABLE: &'static [u8] = ASSET_TABLE;
    const NAME: &'static str = "asset";
    object_id_accessors!();

    fn indexes(&self) -> Vec<IndexEntry> {
        vec![IndexEntry::unique("symbol", self.string_symbol.encode())]
    }
}

/// One account's holding of one asset.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct AccountBalanceObject {
    /// Primary id.
    pub id: ObjectId,
    /// The holder.
    pub owner: AccountName,
    /// The asset.
    pub symbol: AssetSymbol,
    /// Units held; never negative.
    pub amount: i64,
}

impl AccountBalanceObject {
    /// The holding as an [`Asset`].
    pub fn as_asset(&self) -> Asset {
        Asset::new(self.amount, self.symbol)
    }
}

impl Object for AccountBalanceObject {
    const TABLE: &'static [u8] = ACCOUNT_BALANCE_TABLE;
    const NAME: &'static str = "account_balance";
    object_id_accessors!();

    fn indexes(&self) -> Vec<IndexEntry> {
        vec![IndexEntry::unique(
            "owner_symbol",
            (&self.owner, self.symbol).encode(),
        )]
    }
}
