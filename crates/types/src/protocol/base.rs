// Path: crates/types/src/protocol/base.rs
//! Scalar protocol types and the field validators shared by every operation.

use crate::config::{
    DEIP_100_PERCENT, DEIP_MAX_ACCOUNT_NAME_LENGTH, DEIP_MAX_MEMO_SIZE,
    DEIP_MIN_ACCOUNT_NAME_LENGTH,
};
use crate::error::ValidationError;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of content and account external ids.
pub const EXTERNAL_ID_BITS: u16 = 160;
/// Width of content hashes.
pub const HASH_BITS: u16 = 256;
/// Width of detached signatures.
pub const SIGNATURE_BITS: u16 = 520;
/// Width of short identifiers.
pub const SHORT_ID_BITS: u16 = 128;

/// A named on-chain account.
#[derive(
    Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[serde(transparent)]
pub struct AccountName(pub String);

impl AccountName {
    /// Wraps a name without validating it.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks the naming rules.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_account_name(&self.0)
    }
}

impl From<&str> for AccountName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Checks that `name` is a well-formed account name.
///
/// Names are dot-separated labels. Each label is at least three characters,
/// starts with a lowercase letter, ends with a lowercase letter or digit and
/// otherwise holds only lowercase letters, digits and dashes.
pub fn validate_account_name(name: &str) -> Result<(), ValidationError> {
    let invalid = |reason| ValidationError::InvalidAccountName {
        name: name.to_string(),
        reason,
    };
    if name.len() < DEIP_MIN_ACCOUNT_NAME_LENGTH || name.len() > DEIP_MAX_ACCOUNT_NAME_LENGTH {
        return Err(invalid("length must be between 3 and 40 characters"));
    }
    for label in name.split('.') {
        let bytes = label.as_bytes();
        if bytes.len() < DEIP_MIN_ACCOUNT_NAME_LENGTH {
            return Err(invalid("each segment must be at least 3 characters"));
        }
        if !bytes.first().is_some_and(u8::is_ascii_lowercase) {
            return Err(invalid("each segment must start with a lowercase letter"));
        }
        if !bytes
            .last()
            .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(invalid("each segment must end with a lowercase letter or digit"));
        }
        if !bytes
            .iter()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == b'-')
        {
            return Err(invalid("only lowercase letters, digits, dashes and dots are allowed"));
        }
    }
    Ok(())
}

/// Checks that `value` is a lowercase hexadecimal string of exactly `bits` bits.
pub fn validate_hex(field: &'static str, value: &str, bits: u16) -> Result<(), ValidationError> {
    let expected = usize::from(bits / 4);
    if value.len() != expected {
        return Err(ValidationError::HexWidth {
            field,
            bits,
            expected,
            actual: value.len(),
        });
    }
    if !value
        .bytes()
        .all(|c| c.is_ascii_digit() || (b'a'..=b'f').contains(&c))
    {
        return Err(ValidationError::HexCharset { field });
    }
    Ok(())
}

/// A 160-bit external identifier rendered as 40 lowercase hex characters.
#[derive(
    Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[serde(transparent)]
pub struct ExternalId(pub String);

impl ExternalId {
    /// Wraps an id without validating it.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks the 160-bit width and charset, reporting `field` on failure.
    pub fn validate(&self, field: &'static str) -> Result<(), ValidationError> {
        validate_hex(field, &self.0, EXTERNAL_ID_BITS)
    }
}

impl From<&str> for ExternalId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An encoded public key. Key formats are opaque to the core.
#[derive(
    Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[serde(transparent)]
pub struct PublicKey(pub String);

impl PublicKey {
    /// Wraps an encoded key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Rejects empty keys.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            return Err(ValidationError::Constraint("Public key cannot be empty".into()));
        }
        Ok(())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A point in time with one-second resolution, in seconds since the Unix epoch.
#[derive(
    Encode, Decode, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[serde(transparent)]
pub struct TimePointSec(pub u32);

impl TimePointSec {
    /// Builds a time point from seconds since the epoch.
    pub const fn from_secs(secs: u32) -> Self {
        Self(secs)
    }

    /// Seconds since the epoch.
    pub const fn secs(&self) -> u32 {
        self.0
    }

    /// Adds `secs`, clamping at the maximum representable time.
    pub const fn saturating_add(&self, secs: u32) -> Self {
        Self(self.0.saturating_add(secs))
    }

    /// Subtracts `secs`, clamping at the epoch.
    pub const fn saturating_sub(&self, secs: u32) -> Self {
        Self(self.0.saturating_sub(secs))
    }
}

impl fmt::Display for TimePointSec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A share expressed in basis points, where `DEIP_100_PERCENT` is the whole.
#[derive(
    Encode, Decode, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[serde(transparent)]
pub struct Percent(pub u16);

impl Percent {
    /// A whole-number percentage, e.g. `Percent::from_percent(5)` is 5%.
    pub const fn from_percent(percent: u16) -> Self {
        Self(percent.saturating_mul(DEIP_100_PERCENT / 100))
    }

    /// The share in basis points.
    pub const fn basis_points(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

/// Rejects memos at or above the maximum memo size.
pub fn validate_memo(memo: &str) -> Result<(), ValidationError> {
    if memo.len() >= DEIP_MAX_MEMO_SIZE {
        return Err(ValidationError::Constraint(format!(
            "Memo is too large: {} bytes, limit is {}",
            memo.len(),
            DEIP_MAX_MEMO_SIZE
        )));
    }
    Ok(())
}

/// Rejects strings that do not parse as JSON.
pub fn validate_json(field: &str, json: &str) -> Result<(), ValidationError> {
    serde_json::from_str::<serde_json::Value>(json)
        .map(|_| ())
        .map_err(|e| ValidationError::Constraint(format!("{} is not valid JSON: {}", field, e)))
}

/// Checks a payment, award or funding opportunity number: 3 to 15 characters
/// of letters, digits and dashes.
pub fn validate_reference_number(field: &str, number: &str) -> Result<(), ValidationError> {
    if number.len() < 3 || number.len() > 15 {
        return Err(ValidationError::Constraint(format!(
            "{} must be between 3 and 15 characters, got '{}'",
            field, number
        )));
    }
    if !number
        .bytes()
        .all(|c| c.is_ascii_alphanumeric() || c == b'-')
    {
        return Err(ValidationError::Constraint(format!(
            "{} may contain only letters, digits and dashes, got '{}'",
            field, number
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_names_follow_label_rules() {
        for ok in ["alice", "bob", "research-lab", "deip.university", "abc123"] {
            assert!(validate_account_name(ok).is_ok(), "{} should be valid", ok);
        }
        for bad in ["al", "Alice", "1abc", "abc-", "ab.cde", "abc..def", "a_bc"] {
            assert!(validate_account_name(bad).is_err(), "{} should be invalid", bad);
        }
        let too_long = "a".repeat(41);
        assert!(validate_account_name(&too_long).is_err());
    }

    #[test]
    fn hex_widths_are_exact() {
        let id160 = "a".repeat(40);
        let sig520 = "0f".repeat(65);
        assert!(validate_hex("external_id", &id160, EXTERNAL_ID_BITS).is_ok());
        assert!(validate_hex("signature", &sig520, SIGNATURE_BITS).is_ok());
        assert!(validate_hex("short_id", &"1".repeat(32), SHORT_ID_BITS).is_ok());
        assert!(validate_hex("hash", &"e".repeat(64), HASH_BITS).is_ok());

        let err = validate_hex("external_id", &"a".repeat(39), EXTERNAL_ID_BITS).unwrap_err();
        assert_eq!(
            err,
            ValidationError::HexWidth {
                field: "external_id",
                bits: 160,
                expected: 40,
                actual: 39
            }
        );
        let upper = "A".repeat(40);
        assert_eq!(
            validate_hex("external_id", &upper, EXTERNAL_ID_BITS).unwrap_err(),
            ValidationError::HexCharset {
                field: "external_id"
            }
        );
    }

    #[test]
    fn percent_renders_two_decimals() {
        assert_eq!(Percent::from_percent(5).to_string(), "5.00%");
        assert_eq!(Percent(1234).to_string(), "12.34%");
        assert_eq!(Percent::from_percent(100).basis_points(), DEIP_100_PERCENT);
    }

    #[test]
    fn reference_numbers_are_bounded() {
        assert!(validate_reference_number("award_number", "AWD-001").is_ok());
        assert!(validate_reference_number("award_number", "A1").is_err());
        assert!(validate_reference_number("award_number", "A".repeat(16).as_str()).is_err());
        assert!(validate_reference_number("award_number", "AWD 001").is_err());
    }
}
