// Path: crates/types/src/keys/mod.rs
//! Table prefixes for the object store key space.
//!
//! Every persistent record kind owns one prefix. Prefixes end in `/` so no
//! prefix is a byte-prefix of another and a table scan never bleeds into a
//! neighbouring table.

/// Singleton dynamic global properties.
pub const DYNAMIC_GLOBAL_PROPERTIES_TABLE: &[u8] = b"dgp/";
/// Singleton expertise statistics.
pub const EXPERTISE_STATS_TABLE: &[u8] = b"expertise_stats/";
/// External ids recently consumed, for replay protection.
pub const RECENT_ENTITY_TABLE: &[u8] = b"recent_entity/";
/// Accounts.
pub const ACCOUNT_TABLE: &[u8] = b"account/";
/// Asset definitions.
pub const ASSET_TABLE: &[u8] = b"asset/";
/// Per-account asset balances.
pub const ACCOUNT_BALANCE_TABLE: &[u8] = b"account_balance/";
/// Research group memberships.
pub const RESEARCH_GROUP_MEMBERSHIP_TABLE: &[u8] = b"rg_membership/";
/// Assessments.
pub const ASSESSMENT_TABLE: &[u8] = b"assessment/";
/// Proposals.
pub const PROPOSAL_TABLE: &[u8] = b"proposal/";
/// NDA contracts.
pub const NDA_CONTRACT_TABLE: &[u8] = b"nda_contract/";
/// Security token definitions.
pub const SECURITY_TOKEN_TABLE: &[u8] = b"security_token/";
/// Security token balances.
pub const SECURITY_TOKEN_BALANCE_TABLE: &[u8] = b"security_token_balance/";
/// Awards.
pub const AWARD_TABLE: &[u8] = b"award/";
/// Award withdrawal requests.
pub const AWARD_WITHDRAWAL_REQUEST_TABLE: &[u8] = b"award_withdrawal/";
/// Applied transactions still inside their expiration window.
pub const TRANSACTION_TABLE: &[u8] = b"transaction/";
/// Recent block ids for TaPoS checks.
pub const BLOCK_SUMMARY_TABLE: &[u8] = b"block_summary/";
/// Records kept by custom operation interpreters, one sub-prefix per id.
pub const CUSTOM_NAMESPACE: &[u8] = b"custom/";

/// The key prefix owned by the interpreter registered under `id`.
pub fn custom_namespace(id: &str) -> Vec<u8> {
    [CUSTOM_NAMESPACE, id.as_bytes(), b"/"].concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_table_prefix_shadows_another() {
        let all = [
            DYNAMIC_GLOBAL_PROPERTIES_TABLE,
            EXPERTISE_STATS_TABLE,
            RECENT_ENTITY_TABLE,
            ACCOUNT_TABLE,
            ASSET_TABLE,
            ACCOUNT_BALANCE_TABLE,
            RESEARCH_GROUP_MEMBERSHIP_TABLE,
            ASSESSMENT_TABLE,
            PROPOSAL_TABLE,
            NDA_CONTRACT_TABLE,
            SECURITY_TOKEN_TABLE,
            SECURITY_TOKEN_BALANCE_TABLE,
            AWARD_TABLE,
            AWARD_WITHDRAWAL_REQUEST_TABLE,
            TRANSACTION_TABLE,
            BLOCK_SUMMARY_TABLE,
            CUSTOM_NAMESPACE,
        ];
        for (i, a) in all.iter().enumerate() {
            for (j, b) in all.iter().enumerate() {
                if i != j {
                    assert!(!b.starts_with(a), "{:?} shadows {:?}", a, b);
                }
            }
        }
    }
}
