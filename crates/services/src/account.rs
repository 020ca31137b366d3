// Path: crates/services/src/account.rs

use deip_types::app::{AccountBalanceObject, AccountObject, AssetObject};
use deip_types::error::EvaluationError;
use deip_types::protocol::{AccountName, Asset, AssetSymbol, Authority, PublicKey, TimePointSec};
use parity_scale_codec::Encode;

facade!(
    /// Accounts, unique by name.
    AccountService
);

impl<S: std::borrow::Borrow<deip_state::ObjectStore>> AccountService<S> {
    pub fn find_account(&self, name: &AccountName) -> Result<Option<AccountObject>, EvaluationError> {
        Ok(self.store().find_by("name", &name.encode())?)
    }

    pub fn get_account(&self, name: &AccountName) -> Result<AccountObject, EvaluationError> {
        Ok(self.store().get_by("name", &name.encode())?)
    }

    pub fn check_account_existence(&self, name: &AccountName) -> Result<(), EvaluationError> {
        ensure!(
            self.find_account(name)?.is_some(),
            "Account \"{}\" must exist.",
            name
        );
        Ok(())
    }
}

impl<S: std::borrow::BorrowMut<deip_state::ObjectStore>> AccountService<S> {
    #[allow(clippy::too_many_arguments)]
    pub fn create_account(
        &mut self,
        name: &AccountName,
        creator: Option<&AccountName>,
        owner: Authority,
        active: Authority,
        memo_key: PublicKey,
        json_metadata: Option<String>,
        created: TimePointSec,
    ) -> Result<AccountObject, EvaluationError> {
        ensure!(
            self.find_account(name)?.is_none(),
            "Account with name \"{}\" already exists.",
            name
        );
        let account = self.store_mut().create::<AccountObject>(|a| {
            a.name = name.clone();
            a.creator = creator.cloned();
            a.owner = owner;
            a.active = active;
            a.memo_key = memo_key;
            a.json_metadata = json_metadata;
            a.created = created;
        })?;
        log::info!("Created account '{}'", account.name);
        Ok(account)
    }

    /// Replaces the authorities that are `Some`.
    pub fn update_authorities(
        &mut self,
        name: &AccountName,
        owner: Option<Authority>,
        active: Option<Authority>,
    ) -> Result<AccountObject, EvaluationError> {
        let account = self.get_account(name)?;
        Ok(self.store_mut().modify::<AccountObject>(account.id, |a| {
            if let Some(owner) = owner {
                a.owner = owner;
            }
            if let Some(active) = active {
                a.active = active;
            }
        })?)
    }

    /// Replaces the memo key and metadata that are `Some`.
    pub fn update_metadata(
        &mut self,
        name: &AccountName,
        memo_key: Option<PublicKey>,
        json_metadata: Option<String>,
    ) -> Result<AccountObject, EvaluationError> {
        let account = self.get_account(name)?;
        Ok(self.store_mut().modify::<AccountObject>(account.id, |a| {
            if let Some(key) = memo_key {
                a.memo_key = key;
            }
            if json_metadata.is_some() {
                a.json_metadata = json_metadata;
            }
        })?)
    }
}

facade!(
    /// Asset definitions, unique by symbol name, and per-account balances,
    /// unique by (owner, symbol).
    AssetService
);

impl<S: std::borrow::Borrow<deip_state::ObjectStore>> AssetService<S> {
    pub fn find_asset_by_symbol(&self, symbol: &str) -> Result<Option<AssetObject>, EvaluationError> {
        Ok(self.store().find_by("symbol", &symbol.encode())?)
    }

    pub fn get_asset_by_symbol(&self, symbol: &str) -> Result<AssetObject, EvaluationError> {
        self.find_asset_by_symbol(symbol)?
            .ok_or_else(|| EvaluationError::Precondition(format!("Asset {} does not exist", symbol)))
    }

    fn find_balance(
        &self,
        owner: &AccountName,
        symbol: AssetSymbol,
    ) -> Result<Option<AccountBalanceObject>, EvaluationError> {
        Ok(self
            .store()
            .find_by("owner_symbol", &(owner, symbol).encode())?)
    }

    /// The balance of `owner` in `symbol`; zero when nothing is held.
    pub fn get_balance(&self, owner: &AccountName, symbol: AssetSymbol) -> Result<Asset, EvaluationError> {
        Ok(self
            .find_balance(owner, symbol)?
            .map(|b| b.as_asset())
            .unwrap_or(Asset::new(0, symbol)))
    }

    /// Every balance held by `owner`, in symbol order.
    pub fn balances_of(&self, owner: &AccountName) -> Result<Vec<AccountBalanceObject>, EvaluationError> {
        Ok(self.store().scan_by("owner_symbol", &owner.encode())?)
    }
}

impl<S: std::borrow::BorrowMut<deip_state::ObjectStore>> AssetService<S> {
    pub fn create_asset(
        &mut self,
        symbol: AssetSymbol,
        string_symbol: &str,
        issuer: &AccountName,
        max_supply: i64,
        description: &str,
    ) -> Result<AssetObject, EvaluationError> {
        ensure!(
            self.find_asset_by_symbol(string_symbol)?.is_none(),
            "Asset {} already exists",
            string_symbol
        );
        let asset = self.store_mut().create::<AssetObject>(|a| {
            a.symbol = symbol;
            a.string_symbol = string_symbol.to_string();
            a.issuer = issuer.clone();
            a.max_supply = max_supply;
            a.description = description.to_string();
        })?;
        log::info!("Created asset {} issued by '{}'", string_symbol, issuer);
        Ok(asset)
    }

    /// Changes an asset's issued supply by `delta`, keeping it within
    /// `0..=max_supply`.
    pub fn adjust_asset_supply(&mut self, symbol: &str, delta: i64) -> Result<AssetObject, EvaluationError> {
        let asset = self.get_asset_by_symbol(symbol)?;
        let supply = asset.current_supply.checked_add(delta);
        ensure!(
            supply.is_some_and(|s| (0..=asset.max_supply).contains(&s)),
            "Supply of {} must stay between 0 and {}",
            symbol,
            asset.max_supply
        );
        let supply = supply.unwrap_or(asset.current_supply);
        Ok(self
            .store_mut()
            .modify::<AssetObject>(asset.id, |a| a.current_supply = supply)?)
    }

    /// Adds `delta` (which may be negative) to `owner`'s balance and returns
    /// the new balance.
    pub fn adjust_balance(&mut self, owner: &AccountName, delta: &Asset) -> Result<Asset, EvaluationError> {
        let current = self.get_balance(owner, delta.symbol)?;
        let updated = current
            .checked_add(delta)
            .filter(|b| b.amount >= 0)
            .ok_or_else(|| EvaluationError::InsufficientBalance {
                account: owner.to_string(),
                available: current.to_string(),
                required: Asset::new(delta.amount.saturating_neg(), delta.symbol).to_string(),
            })?;
        match self.find_balance(owner, delta.symbol)? {
            Some(balance) => {
                self.store_mut()
                    .modify::<AccountBalanceObject>(balance.id, |b| b.amount = updated.amount)?;
            }
            None => {
                self.store_mut().create::<AccountBalanceObject>(|b| {
                    b.owner = owner.clone();
                    b.symbol = delta.symbol;
                    b.amount = updated.amount;
                })?;
            }
        }
        Ok(updated)
    }
}
