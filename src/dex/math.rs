/*
 * Swap math for a single active liquidity range (Q64.96 sqrt prices)
 */

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};
use once_cell::sync::Lazy;

use crate::math::Fraction;
use crate::models::{ConfluenceError, Result};

/// Fees are expressed in hundredths of a basis point.
pub const FEE_DENOMINATOR: u32 = 1_000_000;

pub static Q96: Lazy<BigUint> = Lazy::new(|| BigUint::one() << 96usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeState {
    pub sqrt_price_x96: BigUint,
    pub liquidity: BigUint,
    pub fee: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeStep {
    pub amount: BigUint,
    pub sqrt_price_x96: BigUint,
}

fn div_ceil(numerator: &BigUint, denominator: &BigUint) -> BigUint {
    let quotient = numerator / denominator;
    if (numerator % denominator).is_zero() {
        quotient
    } else {
        quotient + 1u32
    }
}

fn validate(state: &RangeState) -> Result<()> {
    if state.liquidity.is_zero() || state.sqrt_price_x96.is_zero() {
        return Err(ConfluenceError::InsufficientLiquidity(
            "range has no active liquidity".to_string(),
        ));
    }
    if state.fee >= FEE_DENOMINATOR {
        return Err(ConfluenceError::InsufficientInput);
    }
    Ok(())
}

/// Price of token0 in token1 raw units: `sqrtP^2 / 2^192`.
pub fn token0_price(sqrt_price_x96: &BigUint) -> Result<Fraction> {
    let q192: BigUint = &*Q96 * &*Q96;
    Fraction::new(
        BigInt::from(sqrt_price_x96 * sqrt_price_x96),
        BigInt::from(q192),
    )
}

pub fn swap_exact_in(
    state: &RangeState,
    zero_for_one: bool,
    amount_in: &BigUint,
) -> Result<RangeStep> {
    validate(state)?;
    let remaining_fee = BigUint::from(FEE_DENOMINATOR - state.fee);
    let amount_less_fee = amount_in * &remaining_fee / FEE_DENOMINATOR;
    if amount_less_fee.is_zero() {
        return Err(ConfluenceError::InsufficientInput);
    }
    let l = &state.liquidity;
    let sqrt_p = &state.sqrt_price_x96;
    let q96 = &*Q96;

    let (amount_out, next) = if zero_for_one {
        let numerator = l * q96 * sqrt_p;
        let denominator = l * q96 + &amount_less_fee * sqrt_p;
        let next = div_ceil(&numerator, &denominator);
        let out = l * (sqrt_p - &next) / q96;
        (out, next)
    } else {
        let next = sqrt_p + &amount_less_fee * q96 / l;
        let out = l * q96 * (&next - sqrt_p) / (&next * sqrt_p);
        (out, next)
    };
    if amount_out.is_zero() {
        return Err(ConfluenceError::InsufficientInput);
    }
    Ok(RangeStep {
        amount: amount_out,
        sqrt_price_x96: next,
    })
}

pub fn swap_exact_out(
    state: &RangeState,
    zero_for_one: bool,
    amount_out: &BigUint,
) -> Result<RangeStep> {
    validate(state)?;
    let l = &state.liquidity;
    let sqrt_p = &state.sqrt_price_x96;
    let q96 = &*Q96;

    let (amount_in_net, next) = if zero_for_one {
        // token1 leaves the range; its virtual reserve is L * sqrtP
        let available = l * sqrt_p / q96;
        if amount_out >= &available {
            return Err(ConfluenceError::InsufficientLiquidity(format!(
                "requested {amount_out}, range holds {available}"
            )));
        }
        let delta = div_ceil(&(amount_out * q96), l);
        if &delta >= sqrt_p {
            return Err(ConfluenceError::InsufficientLiquidity(
                "price would leave the active range".to_string(),
            ));
        }
        let next = sqrt_p - &delta;
        let amount_in = div_ceil(&(l * q96 * (sqrt_p - &next)), &(&next * sqrt_p));
        (amount_in, next)
    } else {
        // token0 leaves the range; its virtual reserve is L / sqrtP
        let available = l * q96 / sqrt_p;
        if amount_out >= &available {
            return Err(ConfluenceError::InsufficientLiquidity(format!(
                "requested {amount_out}, range holds {available}"
            )));
        }
        let denominator = l * q96 - amount_out * sqrt_p;
        let next = div_ceil(&(l * q96 * sqrt_p), &denominator);
        let amount_in = div_ceil(&(l * (&next - sqrt_p)), q96);
        (amount_in, next)
    };

    let gross = div_ceil(
        &(amount_in_net * FEE_DENOMINATOR),
        &BigUint::from(FEE_DENOMINATOR - state.fee),
    );
    Ok(RangeStep {
        amount: gross,
        sqrt_price_x96: next,
    })
}
