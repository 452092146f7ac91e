/*
 * Pool quoting capability and the constant-product, concentrated and singleton pools
 */

pub mod concentrated;
pub mod constant_product;
mod math;
pub mod singleton;

use async_trait::async_trait;
use ethers_core::types::{Address, H256};
use num_bigint::{BigInt, BigUint};
use std::fmt;
use std::sync::Arc;

use crate::currency::{Currency, CurrencyAmount, Price};
use crate::math::{Fraction, Percent};
use crate::models::{ConfluenceError, Protocol, Result};

pub use concentrated::ConcentratedPool;
pub use constant_product::Pair;
pub use singleton::{PoolKey, SingletonPool};

/// Stable identity of a pool, used to detect the same liquidity appearing twice in a trade.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PoolId {
    /// Pair or pool contract address.
    Address(Address),
    /// Pool id inside a singleton contract.
    Key(H256),
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolId::Address(address) => write!(f, "{address:?}"),
            PoolId::Key(key) => write!(f, "{key:?}"),
        }
    }
}

/// Result of quoting through a pool, with the pool state the swap would leave behind.
#[derive(Debug, Clone)]
pub struct PoolQuote {
    pub amount: CurrencyAmount,
    pub next_state: Arc<dyn Pool>,
}

#[async_trait]
pub trait Pool: Send + Sync + fmt::Debug {
    fn protocol(&self) -> Protocol;
    fn id(&self) -> PoolId;
    fn chain_id(&self) -> u64;
    fn currency0(&self) -> &Currency;
    fn currency1(&self) -> &Currency;

    fn involves_currency(&self, currency: &Currency) -> bool {
        self.currency0() == currency || self.currency1() == currency
    }

    /// Mid price of `currency` expressed in the pool's other currency.
    fn price_of(&self, currency: &Currency) -> Result<Price>;

    /// Amount received for selling exactly `amount_in`.
    async fn get_output_amount(&self, amount_in: &CurrencyAmount) -> Result<PoolQuote>;

    /// Amount that must be sold to receive exactly `amount_out`.
    async fn get_input_amount(&self, amount_out: &CurrencyAmount) -> Result<PoolQuote>;
}

/// The pool currency on the other side of `currency`.
pub fn other_currency(pool: &dyn Pool, currency: &Currency) -> Result<Currency> {
    if pool.currency0() == currency {
        Ok(pool.currency1().clone())
    } else if pool.currency1() == currency {
        Ok(pool.currency0().clone())
    } else {
        Err(ConfluenceError::Path(format!(
            "{currency} is not traded by pool {}",
            pool.id()
        )))
    }
}

/// The form of `currency` the pool actually holds: the currency itself, or its
/// native/wrapped counterpart.
pub fn path_currency(currency: &Currency, pool: &dyn Pool) -> Result<Currency> {
    if pool.involves_currency(currency) {
        return Ok(currency.clone());
    }
    [pool.currency0(), pool.currency1()]
        .into_iter()
        .find(|held| held.is_fungible_with(currency))
        .cloned()
        .ok_or_else(|| {
            ConfluenceError::Path(format!(
                "expected {currency} to be either {} or {}",
                pool.currency0(),
                pool.currency1()
            ))
        })
}

/// Rejects amounts whose currency the pool does not hold and reports the swap direction.
pub(crate) fn zero_for_one(pool: &dyn Pool, currency: &Currency) -> Result<bool> {
    if pool.currency0() == currency {
        Ok(true)
    } else if pool.currency1() == currency {
        Ok(false)
    } else {
        Err(ConfluenceError::Currency(format!(
            "pool {} does not trade {currency}",
            pool.id()
        )))
    }
}

/// Share of a transferred amount that arrives after the token's fee.
pub(crate) fn after_fee(fee: &Percent) -> Fraction {
    &Fraction::one() - fee.as_fraction()
}

fn to_unsigned(value: BigInt) -> Result<BigUint> {
    value.to_biguint().ok_or(ConfluenceError::Underflow)
}

fn whole(amount: &BigUint) -> Fraction {
    Fraction::from_integer(BigInt::from(amount.clone()))
}

/// Raw amount a pool receives when `amount` of `currency` is sent to it.
pub(crate) fn received_by_pool(currency: &Currency, amount: &BigUint) -> Result<BigUint> {
    to_unsigned((&whole(amount) * &after_fee(&currency.sell_fee())).quotient())
}

/// Raw amount the trader receives when the pool sends out `amount`.
pub(crate) fn delivered_by_pool(currency: &Currency, amount: &BigUint) -> Result<BigUint> {
    to_unsigned((&whole(amount) * &after_fee(&currency.buy_fee())).quotient())
}

/// Raw amount the pool has to send so that `amount` reaches the trader.
pub(crate) fn sent_for_delivery(currency: &Currency, amount: &BigUint) -> Result<BigUint> {
    let gross = whole(amount).checked_div(&after_fee(&currency.buy_fee()))?;
    to_unsigned(gross.ceil_quotient())
}

/// Raw amount the trader has to send so that the pool receives `amount`.
pub(crate) fn sent_for_receipt(currency: &Currency, amount: &BigUint) -> Result<BigUint> {
    let gross = whole(amount).checked_div(&after_fee(&currency.sell_fee()))?;
    to_unsigned(gross.ceil_quotient())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::{NativeCurrency, Token};

    fn weth() -> Token {
        Token::new(1, Address::repeat_byte(0xee), 18, Some("WETH"))
    }

    fn usdc() -> Token {
        Token::new(1, Address::repeat_byte(0x11), 6, Some("USDC"))
    }

    fn eth() -> Currency {
        NativeCurrency::new(1, "ETH", 18, weth()).into()
    }

    #[test]
    fn path_currency_prefers_exact_match() {
        let pair = Pair::new(weth(), usdc(), 1_000u32, 1_000u32).unwrap();
        let weth: Currency = weth().into();
        assert_eq!(path_currency(&weth, &pair).unwrap(), weth);
    }

    #[test]
    fn path_currency_wraps_native_for_token_pools() {
        let pair = Pair::new(weth(), usdc(), 1_000u32, 1_000u32).unwrap();
        let resolved = path_currency(&eth(), &pair).unwrap();
        assert_eq!(resolved, Currency::Token(weth()));
    }

    #[test]
    fn path_currency_unwraps_for_native_pools() {
        let pool = SingletonPool::new(
            eth(),
            usdc().into(),
            3_000,
            60,
            Address::zero(),
            math::Q96.clone(),
            1_000_000u32,
        )
        .unwrap();
        let resolved = path_currency(&Currency::Token(weth()), &pool).unwrap();
        assert!(resolved.is_native());
    }

    #[test]
    fn unrelated_currency_is_rejected() {
        let pair = Pair::new(weth(), usdc(), 1_000u32, 1_000u32).unwrap();
        let other: Currency = Token::new(1, Address::repeat_byte(0x22), 18, None).into();
        assert_eq!(path_currency(&other, &pair).unwrap_err().code(), "PATH");
    }
}
