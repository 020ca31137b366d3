// Path: crates/types/src/protocol/asset.rs
//! Fungible asset amounts and packed asset symbols.

use crate::config::{DEIP_MAX_ASSET_PRECISION, DEIP_MAX_ASSET_SYMBOL_LENGTH};
use crate::error::ValidationError;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An asset symbol packed into a `u64`: the precision in the low byte and up
/// to seven ASCII name characters in the bytes above it.
#[derive(
    Encode, Decode, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[serde(transparent)]
pub struct AssetSymbol(pub u64);

/// The core asset: `DEIP` with three decimal places.
pub const DEIP_SYMBOL: AssetSymbol = AssetSymbol(
    3 | ((b'D' as u64) << 8) | ((b'E' as u64) << 16) | ((b'I' as u64) << 24) | ((b'P' as u64) << 32),
);

impl AssetSymbol {
    /// Packs a validated name and precision.
    pub fn new(precision: u8, name: &str) -> Result<Self, ValidationError> {
        validate_symbol_name(name)?;
        validate_precision(precision)?;
        let packed = name
            .bytes()
            .enumerate()
            .fold(u64::from(precision), |acc, (i, c)| {
                acc | (u64::from(c) << (8 * (i + 1)))
            });
        Ok(Self(packed))
    }

    /// Number of decimal places.
    pub fn precision(&self) -> u8 {
        (self.0 & 0xff) as u8
    }

    /// The ticker name, e.g. `DEIP`.
    pub fn name(&self) -> String {
        self.0
            .to_le_bytes()
            .iter()
            .skip(1)
            .take_while(|c| **c != 0)
            .map(|c| char::from(*c))
            .collect()
    }

    /// Checks that the packed value decodes to a valid name and precision.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_symbol_name(&self.name())?;
        validate_precision(self.precision())
    }
}

impl fmt::Display for AssetSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Checks a ticker name: 1 to 6 uppercase latin letters.
pub fn validate_symbol_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() || name.len() > DEIP_MAX_ASSET_SYMBOL_LENGTH {
        return Err(ValidationError::Constraint(format!(
            "Asset symbol must be 1 to {} characters long, got '{}'",
            DEIP_MAX_ASSET_SYMBOL_LENGTH, name
        )));
    }
    if !name.bytes().all(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::Constraint(format!(
            "Asset symbol must contain only uppercase latin letters, got '{}'",
            name
        )));
    }
    Ok(())
}

fn validate_precision(precision: u8) -> Result<(), ValidationError> {
    if precision > DEIP_MAX_ASSET_PRECISION {
        return Err(ValidationError::Constraint(format!(
            "Asset precision must be less than {}, got {}",
            DEIP_MAX_ASSET_PRECISION + 1,
            precision
        )));
    }
    Ok(())
}

/// An amount of a specific asset, in the asset's smallest unit.
#[derive(
    Encode, Decode, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default,
)]
pub struct Asset {
    /// Amount in the smallest unit (e.g. `1000` is `1.000 DEIP`).
    pub amount: i64,
    /// Which asset.
    pub symbol: AssetSymbol,
}

impl Asset {
    /// An amount of `symbol`.
    pub const fn new(amount: i64, symbol: AssetSymbol) -> Self {
        Self { amount, symbol }
    }

    /// An amount of the core asset.
    pub const fn core(amount: i64) -> Self {
        Self::new(amount, DEIP_SYMBOL)
    }

    /// Adds two amounts of the same asset. `None` on symbol mismatch or overflow.
    pub fn checked_add(&self, other: &Asset) -> Option<Asset> {
        if self.symbol != other.symbol {
            return None;
        }
        self.amount
            .checked_add(other.amount)
            .map(|amount| Asset::new(amount, self.symbol))
    }

    /// Subtracts an amount of the same asset. `None` on symbol mismatch or overflow.
    pub fn checked_sub(&self, other: &Asset) -> Option<Asset> {
        if self.symbol != other.symbol {
            return None;
        }
        self.amount
            .checked_sub(other.amount)
            .map(|amount| Asset::new(amount, self.symbol))
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = u32::from(self.symbol.precision());
        let sign = if self.amount < 0 { "-" } else { "" };
        let abs = self.amount.unsigned_abs();
        match 10u64.checked_pow(precision) {
            Some(scale) if precision > 0 => write!(
                f,
                "{}{}.{:0width$} {}",
                sign,
                abs / scale,
                abs % scale,
                self.symbol,
                width = precision as usize
            ),
            _ => write!(f, "{}{} {}", sign, abs, self.symbol),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_symbol_unpacks() {
        assert_eq!(DEIP_SYMBOL.name(), "DEIP");
        assert_eq!(DEIP_SYMBOL.precision(), 3);
        assert_eq!(AssetSymbol::new(3, "DEIP").unwrap(), DEIP_SYMBOL);
        assert!(DEIP_SYMBOL.validate().is_ok());
    }

    #[test]
    fn symbols_reject_bad_names_and_precision() {
        assert!(AssetSymbol::new(3, "").is_err());
        assert!(AssetSymbol::new(3, "TOOLONG").is_err());
        assert!(AssetSymbol::new(3, "deip").is_err());
        assert!(AssetSymbol::new(15, "USD").is_err());
        assert!(AssetSymbol::new(14, "USD").is_ok());
    }

    #[test]
    fn amounts_render_with_precision() {
        assert_eq!(Asset::core(1000).to_string(), "1.000 DEIP");
        assert_eq!(Asset::core(-5).to_string(), "-0.005 DEIP");
        let whole = AssetSymbol::new(0, "SEC").unwrap();
        assert_eq!(Asset::new(12, whole).to_string(), "12 SEC");
    }

    #[test]
    fn arithmetic_requires_matching_symbols() {
        let usd = AssetSymbol::new(2, "USD").unwrap();
        assert_eq!(Asset::core(5).checked_add(&Asset::core(7)), Some(Asset::core(12)));
        assert_eq!(Asset::core(5).checked_add(&Asset::new(1, usd)), None);
        assert_eq!(Asset::core(5).checked_sub(&Asset::core(7)), Some(Asset::core(-2)));
    }
}
