// Path: crates/execution/src/chain/genesis.rs

use deip_services::DbServices;
use deip_state::ObjectStore;
use deip_types::config::{GenesisConfig, DEIP_INIT_MINER_NAME};
use deip_types::error::ChainError;
use deip_types::protocol::{AccountName, Asset, Authority, BlockId, DEIP_SYMBOL};

/// Writes the initial ledger: the global singletons, the core asset and
/// the genesis accounts with their balances.
pub(super) fn initialize(store: &mut ObjectStore, genesis: &GenesisConfig) -> Result<(), ChainError> {
    let total = genesis
        .accounts
        .iter()
        .try_fold(0i64, |sum, account| {
            if account.balance < 0 {
                return None;
            }
            sum.checked_add(account.balance)
        })
        .ok_or_else(|| ChainError::Fatal("Genesis balances must be non-negative and fit the supply".into()))?;
    let init_miner = AccountName::new(DEIP_INIT_MINER_NAME);
    let witness = genesis
        .accounts
        .first()
        .map_or_else(|| init_miner.clone(), |a| a.name.clone());

    let mut db = DbServices::new(store);
    db.dynamic_global_properties()
        .initialize(genesis.time, &witness, Asset::core(total))?;
    db.expertise_stats().initialize()?;
    db.assets().create_asset(
        DEIP_SYMBOL,
        &DEIP_SYMBOL.name(),
        &init_miner,
        i64::MAX,
        "Core asset of the DEIP chain",
    )?;
    db.assets().adjust_asset_supply(&DEIP_SYMBOL.name(), total)?;

    for account in &genesis.accounts {
        let authority = Authority::from_key(account.public_key.clone());
        db.accounts().create_account(
            &account.name,
            None,
            authority.clone(),
            authority,
            account.public_key.clone(),
            None,
            genesis.time,
        )?;
        if account.balance > 0 {
            db.assets()
                .adjust_balance(&account.name, &Asset::core(account.balance))?;
        }
    }
    db.transactions().set_block_summary(BlockId::default())?;
    Ok(())
}
