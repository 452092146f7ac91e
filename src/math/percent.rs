/*
 * Percentages expressed as exact fractions
 */

use std::fmt;

use num_bigint::BigInt;
use rust_decimal::Decimal;

use super::Fraction;
use crate::models::Result;
use crate::utils::fraction_to_decimal;

const BASIS_POINTS: u32 = 10_000;

/// A ratio where `1` means 100%.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Percent(Fraction);

impl Percent {
    pub fn new(numerator: impl Into<BigInt>, denominator: impl Into<BigInt>) -> Result<Self> {
        Ok(Self(Fraction::new(numerator, denominator)?))
    }

    #[must_use]
    pub fn from_fraction(fraction: Fraction) -> Self {
        Self(fraction)
    }

    /// Builds a percent from basis points, e.g. `50` is 0.5%.
    #[must_use]
    pub fn from_bps(bps: u32) -> Self {
        Self(Fraction::from_parts(bps.into(), BASIS_POINTS.into()))
    }

    #[must_use]
    pub fn zero() -> Self {
        Self(Fraction::zero())
    }

    #[must_use]
    pub fn one_hundred() -> Self {
        Self(Fraction::one())
    }

    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[must_use]
    pub fn as_fraction(&self) -> &Fraction {
        &self.0
    }

    /// Value in percent units (`0.05` renders as `5`).
    pub fn to_decimal(&self, scale: u32) -> Result<Decimal> {
        fraction_to_decimal(&(&self.0 * &Fraction::from_integer(100)), scale)
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_decimal(2) {
            Ok(value) => write!(f, "{value}%"),
            Err(_) => write!(f, "{}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn from_bps() {
        assert_eq!(Percent::from_bps(500), Percent::new(5, 100).unwrap());
        assert_eq!(Percent::from_bps(10_000), Percent::one_hundred());
    }

    #[test]
    fn negative_detection() {
        assert!(Percent::new(-1, 100).unwrap().is_negative());
        assert!(!Percent::zero().is_negative());
    }

    #[test]
    fn renders_as_percent_units() {
        let p = Percent::new(1, 3).unwrap();
        assert_eq!(p.to_decimal(2).unwrap(), Decimal::from_str("33.33").unwrap());
        assert_eq!(p.to_string(), "33.33%");
    }
}
