// Path: crates/types/src/config/mod.rs

//! Chain constants and the runtime configuration of the chain core.
use crate::protocol::{AccountName, Asset, PublicKey, TimePointSec};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

mod constants;
pub use constants::*;

/// Runtime parameters of the chain core.
///
/// Every field has a default matching the chain constants, so an empty TOML
/// document yields a working single-producer chain.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    /// Latest allowed transaction expiration, relative to head block time.
    #[serde(default = "default_max_time_until_expiration")]
    pub max_time_until_expiration: u32,
    /// Longest allowed proposal lifetime.
    #[serde(default = "default_max_proposal_lifetime_sec")]
    pub max_proposal_lifetime_sec: u32,
    /// How long an external id stays reserved after creation.
    #[serde(default = "default_recent_entity_lifetime_sec")]
    pub recent_entity_lifetime_sec: u32,
    /// Length of the rolling used-expertise window, in blocks.
    #[serde(default = "default_blocks_per_week")]
    pub blocks_per_week: u32,
    /// Smallest fee `create_account` accepts.
    #[serde(default)]
    pub min_account_creation_fee: Asset,
    /// Minted to the producer of every block. No reward when zero.
    #[serde(default)]
    pub producer_reward: Asset,
    /// The initial ledger.
    #[serde(default)]
    pub genesis: GenesisConfig,
}

fn default_max_time_until_expiration() -> u32 {
    DEIP_MAX_TIME_UNTIL_EXPIRATION
}
fn default_max_proposal_lifetime_sec() -> u32 {
    DEIP_MAX_PROPOSAL_LIFETIME_SEC
}
fn default_recent_entity_lifetime_sec() -> u32 {
    DEIP_RECENT_ENTITY_LIFETIME_SEC
}
fn default_blocks_per_week() -> u32 {
    DEIP_BLOCKS_PER_WEEK
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            max_time_until_expiration: default_max_time_until_expiration(),
            max_proposal_lifetime_sec: default_max_proposal_lifetime_sec(),
            recent_entity_lifetime_sec: default_recent_entity_lifetime_sec(),
            blocks_per_week: default_blocks_per_week(),
            min_account_creation_fee: Asset::core(0),
            producer_reward: Asset::core(0),
            genesis: GenesisConfig::default(),
        }
    }
}

/// The initial state written before the first block.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct GenesisConfig {
    /// Head block time of the empty chain.
    #[serde(default)]
    pub time: TimePointSec,
    /// Accounts created at genesis.
    #[serde(default = "default_genesis_accounts")]
    pub accounts: Vec<GenesisAccount>,
}

fn default_genesis_accounts() -> Vec<GenesisAccount> {
    vec![GenesisAccount {
        name: AccountName::new(DEIP_INIT_MINER_NAME),
        public_key: PublicKey::new(DEIP_INIT_MINER_NAME),
        balance: 0,
    }]
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            time: TimePointSec::default(),
            accounts: default_genesis_accounts(),
        }
    }
}

/// One account created at genesis. Its owner, active and memo authorities are
/// all the single `public_key`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct GenesisAccount {
    /// Account name.
    pub name: AccountName,
    /// The account's only key.
    pub public_key: PublicKey,
    /// Initial core-asset balance, in the smallest unit.
    #[serde(default)]
    pub balance: i64,
}

bitflags::bitflags! {
    /// Checks a caller may skip when it has already performed them, e.g. while
    /// replaying blocks it produced itself.
    #[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[serde(transparent)]
    pub struct SkipFlags: u32 {
        /// Do not consult the authority verifier.
        const SKIP_AUTHORITY_CHECK = 0b0001;
        /// Accept transactions already seen.
        const SKIP_TRANSACTION_DUPE_CHECK = 0b0010;
        /// Do not verify the TaPoS reference.
        const SKIP_TAPOS_CHECK = 0b0100;
        /// Do not recompute the transaction merkle root.
        const SKIP_MERKLE_CHECK = 0b1000;
    }
}

impl Encode for SkipFlags {
    fn encode_to<T: parity_scale_codec::Output + ?Sized>(&self, dest: &mut T) {
        self.bits().encode_to(dest)
    }
}

impl Decode for SkipFlags {
    fn decode<I: parity_scale_codec::Input>(
        input: &mut I,
    ) -> Result<Self, parity_scale_codec::Error> {
        let bits = u32::decode(input)?;
        Self::from_bits(bits).ok_or_else(|| "Invalid bits for SkipFlags".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::DEIP_SYMBOL;

    #[test]
    fn empty_document_uses_chain_constants() {
        let config: ChainConfig = toml::from_str("").unwrap();
        assert_eq!(config, ChainConfig::default());
        assert_eq!(config.max_time_until_expiration, 3600);
        assert_eq!(config.blocks_per_week, 201_600);
        assert_eq!(config.genesis.accounts.len(), 1);
        assert_eq!(config.genesis.accounts[0].name.as_str(), "initminer");
    }

    #[test]
    fn parses_genesis_and_overrides() {
        let s = r#"
            max_time_until_expiration = 120
            blocks_per_week = 4

            [producer_reward]
            amount = 1000
            symbol = 344826659843

            [genesis]
            time = 1000

            [[genesis.accounts]]
            name = "alice"
            public_key = "alice-key"
            balance = 50000

            [[genesis.accounts]]
            name = "bob"
            public_key = "bob-key"
        "#;
        let config: ChainConfig = toml::from_str(s).unwrap();
        assert_eq!(config.max_time_until_expiration, 120);
        assert_eq!(config.blocks_per_week, 4);
        assert_eq!(config.max_proposal_lifetime_sec, DEIP_MAX_PROPOSAL_LIFETIME_SEC);
        assert_eq!(config.producer_reward.symbol, DEIP_SYMBOL);
        assert_eq!(config.genesis.time, TimePointSec(1000));
        assert_eq!(config.genesis.accounts.len(), 2);
        assert_eq!(config.genesis.accounts[1].balance, 0);
    }

    #[test]
    fn skip_flags_round_trip() {
        let flags = SkipFlags::SKIP_AUTHORITY_CHECK | SkipFlags::SKIP_TAPOS_CHECK;
        let bytes = flags.encode();
        assert_eq!(SkipFlags::decode(&mut &bytes[..]).unwrap(), flags);
        assert!(SkipFlags::decode(&mut &16u32.encode()[..]).is_err());
    }
}
