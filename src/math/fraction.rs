/*
 * Arbitrary-precision fraction
 */

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Sub};

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};

use crate::models::{ConfluenceError, Result};

/// Direction used when a fraction is collapsed to an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rounding {
    /// Truncate toward zero.
    Down,
    /// Round toward positive infinity.
    Up,
}

/// A rational number with a strictly positive denominator.
#[derive(Debug, Clone)]
pub struct Fraction {
    numerator: BigInt,
    denominator: BigInt,
}

impl Fraction {
    pub fn new(numerator: impl Into<BigInt>, denominator: impl Into<BigInt>) -> Result<Self> {
        let numerator = numerator.into();
        let denominator = denominator.into();
        if denominator.is_zero() {
            return Err(ConfluenceError::DivisionByZero);
        }
        if denominator.is_negative() {
            return Ok(Self {
                numerator: -numerator,
                denominator: -denominator,
            });
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    #[must_use]
    pub fn from_integer(value: impl Into<BigInt>) -> Self {
        Self {
            numerator: value.into(),
            denominator: BigInt::one(),
        }
    }

    /// Caller guarantees a positive denominator.
    pub(crate) fn from_parts(numerator: BigInt, denominator: BigInt) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    #[must_use]
    pub fn zero() -> Self {
        Self::from_integer(0)
    }

    #[must_use]
    pub fn one() -> Self {
        Self::from_integer(1)
    }

    #[must_use]
    pub fn numerator(&self) -> &BigInt {
        &self.numerator
    }

    #[must_use]
    pub fn denominator(&self) -> &BigInt {
        &self.denominator
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }

    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.numerator.is_negative()
    }

    /// Integer part, truncated toward zero.
    #[must_use]
    pub fn quotient(&self) -> BigInt {
        &self.numerator / &self.denominator
    }

    #[must_use]
    pub fn ceil_quotient(&self) -> BigInt {
        let quotient = self.quotient();
        let remainder = &self.numerator % &self.denominator;
        if remainder.is_positive() {
            quotient + 1
        } else {
            quotient
        }
    }

    #[must_use]
    pub fn round(&self, rounding: Rounding) -> BigInt {
        match rounding {
            Rounding::Down => self.quotient(),
            Rounding::Up => self.ceil_quotient(),
        }
    }

    pub fn invert(&self) -> Result<Self> {
        Self::new(self.denominator.clone(), self.numerator.clone())
    }

    pub fn checked_div(&self, other: &Fraction) -> Result<Self> {
        Self::new(
            &self.numerator * &other.denominator,
            &self.denominator * &other.numerator,
        )
    }
}

impl Add for &Fraction {
    type Output = Fraction;

    fn add(self, rhs: &Fraction) -> Fraction {
        if self.denominator == rhs.denominator {
            return Fraction {
                numerator: &self.numerator + &rhs.numerator,
                denominator: self.denominator.clone(),
            };
        }
        Fraction {
            numerator: &self.numerator * &rhs.denominator + &rhs.numerator * &self.denominator,
            denominator: &self.denominator * &rhs.denominator,
        }
    }
}

impl Sub for &Fraction {
    type Output = Fraction;

    fn sub(self, rhs: &Fraction) -> Fraction {
        if self.denominator == rhs.denominator {
            return Fraction {
                numerator: &self.numerator - &rhs.numerator,
                denominator: self.denominator.clone(),
            };
        }
        Fraction {
            numerator: &self.numerator * &rhs.denominator - &rhs.numerator * &self.denominator,
            denominator: &self.denominator * &rhs.denominator,
        }
    }
}

impl Mul for &Fraction {
    type Output = Fraction;

    fn mul(self, rhs: &Fraction) -> Fraction {
        Fraction {
            numerator: &self.numerator * &rhs.numerator,
            denominator: &self.denominator * &rhs.denominator,
        }
    }
}

impl Add for Fraction {
    type Output = Fraction;

    fn add(self, rhs: Fraction) -> Fraction {
        &self + &rhs
    }
}

impl Sub for Fraction {
    type Output = Fraction;

    fn sub(self, rhs: Fraction) -> Fraction {
        &self - &rhs
    }
}

impl Mul for Fraction {
    type Output = Fraction;

    fn mul(self, rhs: Fraction) -> Fraction {
        &self * &rhs
    }
}

impl PartialEq for Fraction {
    fn eq(&self, other: &Self) -> bool {
        &self.numerator * &other.denominator == &other.numerator * &self.denominator
    }
}

impl Eq for Fraction {}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fraction {
    // denominators are kept positive, so cross multiplication preserves order
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.numerator * &other.denominator).cmp(&(&other.numerator * &self.denominator))
    }
}

impl Default for Fraction {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}
