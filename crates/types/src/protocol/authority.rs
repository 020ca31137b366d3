// Path: crates/types/src/protocol/authority.rs
//! Account authorities and the required-authority sets declared by operations.

use super::base::{AccountName, PublicKey};
use crate::error::ValidationError;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A weighted multi-signature authority.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Authority {
    /// Total weight required to satisfy the authority.
    pub weight_threshold: u32,
    /// Accounts whose approval contributes weight.
    pub account_auths: BTreeMap<AccountName, u16>,
    /// Keys whose signature contributes weight.
    pub key_auths: BTreeMap<PublicKey, u16>,
}

impl Authority {
    /// A single-key authority with threshold 1.
    pub fn from_key(key: PublicKey) -> Self {
        Self {
            weight_threshold: 1,
            account_auths: BTreeMap::new(),
            key_auths: BTreeMap::from([(key, 1)]),
        }
    }

    /// Whether the combined weight of all members falls short of the threshold.
    pub fn is_impossible(&self) -> bool {
        let total: u64 = self
            .account_auths
            .values()
            .chain(self.key_auths.values())
            .map(|w| u64::from(*w))
            .sum();
        total < u64::from(self.weight_threshold)
    }

    /// Whether signatures from `keys` alone reach the threshold.
    pub fn is_satisfied_by_keys(&self, keys: &BTreeSet<PublicKey>) -> bool {
        let weight: u64 = self
            .key_auths
            .iter()
            .filter(|(k, _)| keys.contains(*k))
            .map(|(_, w)| u64::from(*w))
            .sum();
        self.weight_threshold > 0 && weight >= u64::from(self.weight_threshold)
    }

    /// Checks member names and that the authority can be satisfied at all.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for account in self.account_auths.keys() {
            account.validate()?;
        }
        for key in self.key_auths.keys() {
            key.validate()?;
        }
        if self.weight_threshold == 0 {
            return Err(ValidationError::Constraint(
                "Authority weight threshold must be positive".into(),
            ));
        }
        if self.is_impossible() {
            return Err(ValidationError::Constraint(
                "Authority can never be satisfied".into(),
            ));
        }
        Ok(())
    }
}

/// The signature strength tier an approval or requirement refers to.
#[derive(
    Encode, Decode, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum AuthorityLevel {
    /// Day-to-day signing authority.
    #[default]
    Active,
    /// Account-control authority; also satisfies active requirements.
    Owner,
}

/// The full set of signatures a transaction or operation must carry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequiredAuthorities {
    /// Accounts whose active (or owner) authority must sign.
    pub active: BTreeSet<AccountName>,
    /// Accounts whose owner authority must sign.
    pub owner: BTreeSet<AccountName>,
    /// Individual keys that must sign.
    pub keys: BTreeSet<PublicKey>,
}

impl RequiredAuthorities {
    /// Merges another requirement set into this one.
    pub fn extend(&mut self, other: RequiredAuthorities) {
        self.active.extend(other.active);
        self.owner.extend(other.owner);
        self.keys.extend(other.keys);
    }

    /// Applies the tie-break: an account required at both levels is required
    /// only at owner level.
    pub fn normalized(mut self) -> Self {
        let owner = &self.owner;
        self.active.retain(|a| !owner.contains(a));
        self
    }

    /// Whether nothing is required.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.owner.is_empty() && self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_wins_over_active() {
        let mut req = RequiredAuthorities::default();
        req.active.insert("alice".into());
        req.active.insert("bob".into());
        req.owner.insert("alice".into());
        let req = req.normalized();
        assert_eq!(req.active, BTreeSet::from([AccountName::from("bob")]));
        assert_eq!(req.owner, BTreeSet::from([AccountName::from("alice")]));
    }

    #[test]
    fn impossible_authorities_are_rejected() {
        let mut auth = Authority::from_key(PublicKey::new("DEIP1key"));
        assert!(auth.validate().is_ok());
        auth.weight_threshold = 2;
        assert!(auth.is_impossible());
        assert!(auth.validate().is_err());
        auth.weight_threshold = 0;
        assert!(auth.validate().is_err());
    }

    #[test]
    fn key_weights_accumulate() {
        let mut auth = Authority::default();
        auth.weight_threshold = 2;
        auth.key_auths.insert(PublicKey::new("k1"), 1);
        auth.key_auths.insert(PublicKey::new("k2"), 1);
        let one = BTreeSet::from([PublicKey::new("k1")]);
        let both = BTreeSet::from([PublicKey::new("k1"), PublicKey::new("k2")]);
        assert!(!auth.is_satisfied_by_keys(&one));
        assert!(auth.is_satisfied_by_keys(&both));
    }
}
