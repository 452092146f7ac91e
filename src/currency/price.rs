/*
 * Exchange rate between a base and a quote currency
 */

use std::fmt;

use num_bigint::{BigInt, BigUint};
use rust_decimal::Decimal;

use super::{Currency, CurrencyAmount};
use crate::math::{Fraction, Rounding};
use crate::models::{ConfluenceError, Result};
use crate::utils::{decimal_scale, fraction_to_decimal};

/// Raw quote units per raw base unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Price {
    base: Currency,
    quote: Currency,
    ratio: Fraction,
}

impl Price {
    pub fn new(
        base: Currency,
        quote: Currency,
        base_amount: impl Into<BigUint>,
        quote_amount: impl Into<BigUint>,
    ) -> Result<Self> {
        let ratio = Fraction::new(
            BigInt::from(quote_amount.into()),
            BigInt::from(base_amount.into()),
        )?;
        Ok(Self { base, quote, ratio })
    }

    #[must_use]
    pub fn from_ratio(base: Currency, quote: Currency, ratio: Fraction) -> Self {
        Self { base, quote, ratio }
    }

    /// `quote_amount / base_amount`, tagged with both amounts' currencies.
    pub fn from_amounts(
        base_amount: &CurrencyAmount,
        quote_amount: &CurrencyAmount,
    ) -> Result<Self> {
        Self::new(
            base_amount.currency().clone(),
            quote_amount.currency().clone(),
            base_amount.raw().clone(),
            quote_amount.raw().clone(),
        )
    }

    #[must_use]
    pub fn base_currency(&self) -> &Currency {
        &self.base
    }

    #[must_use]
    pub fn quote_currency(&self) -> &Currency {
        &self.quote
    }

    #[must_use]
    pub fn ratio(&self) -> &Fraction {
        &self.ratio
    }

    pub fn invert(&self) -> Result<Self> {
        Ok(Self {
            base: self.quote.clone(),
            quote: self.base.clone(),
            ratio: self.ratio.invert()?,
        })
    }

    /// Chains `base -> quote` with `quote -> other.quote`.
    pub fn multiply(&self, other: &Price) -> Result<Self> {
        if self.quote != other.base {
            return Err(ConfluenceError::Currency(format!(
                "cannot chain a {}/{} price with a {}/{} price",
                self.base, self.quote, other.base, other.quote
            )));
        }
        Ok(Self {
            base: self.base.clone(),
            quote: other.quote.clone(),
            ratio: &self.ratio * &other.ratio,
        })
    }

    /// Re-tags base and quote with native/wrapped counterparts (1:1).
    pub fn with_currencies(&self, base: &Currency, quote: &Currency) -> Result<Self> {
        if !self.base.is_fungible_with(base) || !self.quote.is_fungible_with(quote) {
            return Err(ConfluenceError::Currency(format!(
                "{}/{} price cannot be expressed as {}/{}",
                self.base, self.quote, base, quote
            )));
        }
        Ok(Self {
            base: base.clone(),
            quote: quote.clone(),
            ratio: self.ratio.clone(),
        })
    }

    /// Quote-currency value of `amount`, kept as an exact fraction of raw units.
    pub fn quote_exact(&self, amount: &CurrencyAmount) -> Result<Fraction> {
        if amount.currency() != &self.base {
            return Err(ConfluenceError::Currency(format!(
                "cannot quote {} with a {}/{} price",
                amount.currency(),
                self.base,
                self.quote
            )));
        }
        Ok(&amount.as_fraction() * &self.ratio)
    }

    pub fn quote(&self, amount: &CurrencyAmount) -> Result<CurrencyAmount> {
        let value = self.quote_exact(amount)?;
        CurrencyAmount::from_fraction(self.quote.clone(), &value, Rounding::Down)
    }

    /// Human-denominated price adjusted for both currencies' decimals.
    pub fn to_decimal(&self, scale: u32) -> Result<Decimal> {
        let adjustment = Fraction::new(
            decimal_scale(self.base.decimals()),
            decimal_scale(self.quote.decimals()),
        )?;
        fraction_to_decimal(&(&self.ratio * &adjustment), scale)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_decimal(6) {
            Ok(value) => write!(f, "{value} {}/{}", self.quote, self.base),
            Err(_) => write!(f, "{} {}/{}", self.ratio, self.quote, self.base),
        }
    }
}
