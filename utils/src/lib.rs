//! Shared utilities for the lending-cycle workspace.

use alloy::primitives::utils::{format_units, parse_units, UnitsError};
use alloy::primitives::U256;

/// Number of fractional digits kept by [`micros_to_units`].
pub const MICRO_DECIMALS: u8 = 6;

/// Micro-units in one whole token.
pub const MICROS_PER_UNIT: u64 = 1_000_000;

/// Scales a decimal string such as `"0.1"` to the token's smallest unit.
///
/// Negative amounts are rejected; the chain only deals in unsigned values.
pub fn to_smallest_unit(amount: &str, decimals: u8) -> Result<U256, UnitsError> {
    let parsed = parse_units(amount.trim(), decimals)?;
    if parsed.is_negative() {
        return Err(UnitsError::InvalidUnit(format!("negative amount: {amount}")));
    }
    Ok(parsed.get_absolute())
}

/// Formats a smallest-unit amount for display, e.g. `65000000` with 6 decimals is `"65.000000"`.
///
/// Falls back to the raw integer when the decimals are out of range.
pub fn display_units(value: U256, decimals: u8) -> String {
    format_units(value, decimals).unwrap_or_else(|_| value.to_string())
}

/// Converts an amount expressed in millionths of a whole token to the token's smallest unit.
///
/// Tokens with fewer than six decimals lose the extra precision (truncation).
/// Saturates at `U256::MAX` for absurdly large decimals.
pub fn micros_to_units(micros: u64, decimals: u8) -> U256 {
    let value = U256::from(micros);
    if decimals >= MICRO_DECIMALS {
        value.saturating_mul(U256::from(10u64).pow(U256::from(decimals - MICRO_DECIMALS)))
    } else {
        value / U256::from(10u64).pow(U256::from(MICRO_DECIMALS - decimals))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_decimal_strings() {
        assert_eq!(to_smallest_unit("100", 6).unwrap(), U256::from(100_000_000u64));
        assert_eq!(to_smallest_unit("0.1", 6).unwrap(), U256::from(100_000u64));
        assert_eq!(to_smallest_unit("0.00001", 8).unwrap(), U256::from(1_000u64));
        assert_eq!(
            to_smallest_unit("0.0002", 18).unwrap(),
            U256::from(200_000_000_000_000u64)
        );
    }

    #[test]
    fn rejects_negative_and_garbage() {
        assert!(to_smallest_unit("-1", 6).is_err());
        assert!(to_smallest_unit("abc", 6).is_err());
    }

    #[test]
    fn micros_scale_up_and_truncate() {
        assert_eq!(micros_to_units(65_123_456, 6), U256::from(65_123_456u64));
        assert_eq!(micros_to_units(65_123_456, 8), U256::from(6_512_345_600u64));
        assert_eq!(micros_to_units(65_123_456, 2), U256::from(6_512u64));
        assert_eq!(
            micros_to_units(50_000_000, 18),
            U256::from(50u64) * U256::from(10u64).pow(U256::from(18u64))
        );
    }

    #[test]
    fn display_keeps_all_decimals() {
        assert_eq!(display_units(U256::from(65_000_000u64), 6), "65.000000");
    }
}
