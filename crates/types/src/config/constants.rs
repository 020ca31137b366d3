// Path: crates/types/src/config/constants.rs
//! Consensus constants. Changing any of these forks the chain.

/// The whole, in basis points.
pub const DEIP_100_PERCENT: u16 = 10_000;
/// One percent, in basis points.
pub const DEIP_1_PERCENT: u16 = DEIP_100_PERCENT / 100;

/// Seconds between blocks.
pub const DEIP_BLOCK_INTERVAL: u32 = 3;
/// Blocks produced in a day.
pub const DEIP_BLOCKS_PER_DAY: u32 = 24 * 60 * 60 / DEIP_BLOCK_INTERVAL;
/// Blocks produced in a week; the length of the rolling expertise window.
pub const DEIP_BLOCKS_PER_WEEK: u32 = DEIP_BLOCKS_PER_DAY * 7;

/// Memos and descriptions must be strictly shorter than this many bytes.
pub const DEIP_MAX_MEMO_SIZE: usize = 2048;
/// Latest allowed transaction expiration, relative to head block time.
pub const DEIP_MAX_TIME_UNTIL_EXPIRATION: u32 = 60 * 60;
/// Longest allowed proposal lifetime.
pub const DEIP_MAX_PROPOSAL_LIFETIME_SEC: u32 = 60 * 60 * 24 * 7 * 4;
/// How long an external id stays reserved after its entity is created.
pub const DEIP_RECENT_ENTITY_LIFETIME_SEC: u32 = 60 * 60 * 24;

/// Shortest account name.
pub const DEIP_MIN_ACCOUNT_NAME_LENGTH: usize = 3;
/// Longest account name.
pub const DEIP_MAX_ACCOUNT_NAME_LENGTH: usize = 40;
/// Longest custom operation id.
pub const DEIP_MAX_CUSTOM_ID_LENGTH: usize = 32;
/// Longest NDA contract title.
pub const DEIP_MAX_NDA_TITLE_LENGTH: usize = 199;

/// Highest asset precision.
pub const DEIP_MAX_ASSET_PRECISION: u8 = 14;
/// Longest asset ticker.
pub const DEIP_MAX_ASSET_SYMBOL_LENGTH: usize = 6;

/// Name of the account that receives the genesis supply.
pub const DEIP_INIT_MINER_NAME: &str = "initminer";
