/*
 * Currency-tagged integer amounts
 */

use std::fmt;

use num_bigint::{BigInt, BigUint};
use num_traits::Zero;
use rust_decimal::Decimal;

use super::Currency;
use crate::math::{Fraction, Rounding};
use crate::models::{ConfluenceError, Result};
use crate::utils::{decimal_scale, fraction_to_decimal};

/// An amount of one currency, in the currency's smallest unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CurrencyAmount {
    currency: Currency,
    raw: BigUint,
}

impl CurrencyAmount {
    #[must_use]
    pub fn from_raw(currency: Currency, raw: impl Into<BigUint>) -> Self {
        Self {
            currency,
            raw: raw.into(),
        }
    }

    #[must_use]
    pub fn zero(currency: Currency) -> Self {
        Self::from_raw(currency, BigUint::zero())
    }

    /// Collapses a non-negative fraction of raw units into an amount.
    pub fn from_fraction(currency: Currency, value: &Fraction, rounding: Rounding) -> Result<Self> {
        let raw = value
            .round(rounding)
            .to_biguint()
            .ok_or(ConfluenceError::Underflow)?;
        Ok(Self { currency, raw })
    }

    #[must_use]
    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    #[must_use]
    pub fn raw(&self) -> &BigUint {
        &self.raw
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    #[must_use]
    pub fn as_fraction(&self) -> Fraction {
        Fraction::from_integer(BigInt::from(self.raw.clone()))
    }

    pub fn add(&self, other: &CurrencyAmount) -> Result<Self> {
        self.ensure_same_currency(other)?;
        Ok(Self {
            currency: self.currency.clone(),
            raw: &self.raw + &other.raw,
        })
    }

    pub fn checked_sub(&self, other: &CurrencyAmount) -> Result<Self> {
        self.ensure_same_currency(other)?;
        if other.raw > self.raw {
            return Err(ConfluenceError::Underflow);
        }
        Ok(Self {
            currency: self.currency.clone(),
            raw: &self.raw - &other.raw,
        })
    }

    pub fn multiply(&self, factor: &Fraction, rounding: Rounding) -> Result<Self> {
        Self::from_fraction(self.currency.clone(), &(&self.as_fraction() * factor), rounding)
    }

    pub fn divide(&self, divisor: &Fraction, rounding: Rounding) -> Result<Self> {
        let value = self.as_fraction().checked_div(divisor)?;
        Self::from_fraction(self.currency.clone(), &value, rounding)
    }

    /// Re-tags the amount with the native/wrapped counterpart of its currency.
    pub fn with_currency(&self, currency: &Currency) -> Result<Self> {
        if !self.currency.is_fungible_with(currency) {
            return Err(ConfluenceError::Currency(format!(
                "{} cannot stand in for {}",
                self.currency, currency
            )));
        }
        Ok(Self {
            currency: currency.clone(),
            raw: self.raw.clone(),
        })
    }

    /// Human-denominated value, e.g. `1.5` for 1.5 WETH.
    pub fn to_exact_decimal(&self) -> Result<Decimal> {
        let decimals = self.currency.decimals();
        let value = Fraction::new(
            BigInt::from(self.raw.clone()),
            decimal_scale(decimals),
        )?;
        fraction_to_decimal(&value, u32::from(decimals))
    }

    fn ensure_same_currency(&self, other: &CurrencyAmount) -> Result<()> {
        if self.currency != other.currency {
            return Err(ConfluenceError::Currency(format!(
                "{} and {} amounts cannot be combined",
                self.currency, other.currency
            )));
        }
        Ok(())
    }
}

impl fmt::Display for CurrencyAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.raw, self.currency)
    }
}
