/*
 * Utility functions and helpers
 */

use ethers_core::types::Address;
use num_bigint::BigInt;
use num_traits::pow;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::math::Fraction;
use crate::models::{ConfluenceError, Result};

/// Largest scale `rust_decimal` can represent.
pub const MAX_DECIMAL_SCALE: u32 = 28;

/// Converts an exact fraction to a `Decimal`, truncating after `scale` digits.
pub fn fraction_to_decimal(fraction: &Fraction, scale: u32) -> Result<Decimal> {
    let scale = scale.min(MAX_DECIMAL_SCALE);
    let scaled = fraction.numerator() * pow(BigInt::from(10u8), scale as usize)
        / fraction.denominator();
    let mantissa = i128::try_from(&scaled).map_err(|e| {
        ConfluenceError::ConversionError(format!("{fraction} does not fit a decimal: {e}"))
    })?;
    Decimal::try_from_i128_with_scale(mantissa, scale)
        .map_err(|e| ConfluenceError::ConversionError(format!("{fraction}: {e}")))
}

/// `10^decimals` as a big integer.
#[must_use]
pub fn decimal_scale(decimals: u8) -> BigInt {
    pow(BigInt::from(10u8), usize::from(decimals))
}

pub fn format_address(address: &str) -> Result<Address> {
    if !address.starts_with("0x") || address.len() != 42 {
        return Err(ConfluenceError::ConfigError(format!(
            "Invalid address format: {address}"
        )));
    }
    Address::from_str(&address.to_lowercase())
        .map_err(|e| ConfluenceError::ConfigError(format!("Invalid address {address}: {e}")))
}
