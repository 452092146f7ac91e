/*
 * Concentrated-liquidity pool quoting within the active range
 */

use async_trait::async_trait;
use ethers_core::abi::{encode, Token as AbiToken};
use ethers_core::types::{Address, H256};
use ethers_core::utils::{get_create2_address_from_hash, keccak256};
use num_bigint::BigUint;
use std::str::FromStr;
use std::sync::Arc;

use super::{FACTORY_ADDRESS, POOL_INIT_CODE_HASH};
use crate::currency::{Currency, CurrencyAmount, Price, Token};
use crate::dex::math::{self, RangeState};
use crate::dex::{
    delivered_by_pool, received_by_pool, sent_for_delivery, sent_for_receipt, zero_for_one, Pool,
    PoolId, PoolQuote,
};
use crate::models::{ConfluenceError, Protocol, Result};
use crate::utils::format_address;

#[derive(Debug, Clone)]
pub struct ConcentratedPool {
    address: Address,
    currency0: Currency,
    currency1: Currency,
    state: RangeState,
}

impl ConcentratedPool {
    /// Builds a pool at its canonical factory address. `fee` is in hundredths of a bip.
    pub fn new(
        token_a: Token,
        token_b: Token,
        fee: u32,
        sqrt_price_x96: impl Into<BigUint>,
        liquidity: impl Into<BigUint>,
    ) -> Result<Self> {
        let factory = format_address(FACTORY_ADDRESS)?;
        let init_code_hash = H256::from_str(POOL_INIT_CODE_HASH)
            .map_err(|e| ConfluenceError::ConfigError(format!("Invalid init code hash: {e}")))?;
        let address = Self::compute_address(factory, &token_a, &token_b, fee, init_code_hash)?;
        Self::with_address(address, token_a, token_b, fee, sqrt_price_x96, liquidity)
    }

    /// `sqrt_price_x96` is the square root of the token0 price after sorting.
    pub fn with_address(
        address: Address,
        token_a: Token,
        token_b: Token,
        fee: u32,
        sqrt_price_x96: impl Into<BigUint>,
        liquidity: impl Into<BigUint>,
    ) -> Result<Self> {
        if token_a.chain_id != token_b.chain_id {
            return Err(ConfluenceError::ChainIds);
        }
        if token_a == token_b {
            return Err(ConfluenceError::Path(
                "pool tokens must be distinct".to_string(),
            ));
        }
        let (token0, token1) = if token_a.sorts_before(&token_b) {
            (token_a, token_b)
        } else {
            (token_b, token_a)
        };
        Ok(Self {
            address,
            currency0: token0.into(),
            currency1: token1.into(),
            state: RangeState {
                sqrt_price_x96: sqrt_price_x96.into(),
                liquidity: liquidity.into(),
                fee,
            },
        })
    }

    pub fn compute_address(
        factory: Address,
        token_a: &Token,
        token_b: &Token,
        fee: u32,
        init_code_hash: H256,
    ) -> Result<Address> {
        if token_a == token_b {
            return Err(ConfluenceError::Path(
                "pool tokens must be distinct".to_string(),
            ));
        }
        let (token0, token1) = if token_a.sorts_before(token_b) {
            (token_a, token_b)
        } else {
            (token_b, token_a)
        };
        let salt = keccak256(encode(&[
            AbiToken::Address(token0.address),
            AbiToken::Address(token1.address),
            AbiToken::Uint(fee.into()),
        ]));
        Ok(get_create2_address_from_hash(factory, salt, init_code_hash))
    }

    #[must_use]
    pub fn fee(&self) -> u32 {
        self.state.fee
    }

    #[must_use]
    pub fn sqrt_price_x96(&self) -> &BigUint {
        &self.state.sqrt_price_x96
    }

    #[must_use]
    pub fn liquidity(&self) -> &BigUint {
        &self.state.liquidity
    }

    /// Input and output currencies for a swap in the given direction.
    fn sides(&self, zero_for_one: bool) -> (&Currency, &Currency) {
        if zero_for_one {
            (&self.currency0, &self.currency1)
        } else {
            (&self.currency1, &self.currency0)
        }
    }

    fn with_sqrt_price(&self, sqrt_price_x96: BigUint) -> Arc<dyn Pool> {
        let mut next = self.clone();
        next.state.sqrt_price_x96 = sqrt_price_x96;
        Arc::new(next)
    }
}

#[async_trait]
impl Pool for ConcentratedPool {
    fn protocol(&self) -> Protocol {
        Protocol::V3
    }

    fn id(&self) -> PoolId {
        PoolId::Address(self.address)
    }

    fn chain_id(&self) -> u64 {
        self.currency0.chain_id()
    }

    fn currency0(&self) -> &Currency {
        &self.currency0
    }

    fn currency1(&self) -> &Currency {
        &self.currency1
    }

    fn price_of(&self, currency: &Currency) -> Result<Price> {
        let token0_price = Price::from_ratio(
            self.currency0.clone(),
            self.currency1.clone(),
            math::token0_price(&self.state.sqrt_price_x96)?,
        );
        if zero_for_one(self, currency)? {
            Ok(token0_price)
        } else {
            token0_price.invert()
        }
    }

    async fn get_output_amount(&self, amount_in: &CurrencyAmount) -> Result<PoolQuote> {
        let zero_for_one = zero_for_one(self, amount_in.currency())?;
        let (currency_in, currency_out) = self.sides(zero_for_one);
        let received = received_by_pool(currency_in, amount_in.raw())?;
        let step = math::swap_exact_in(&self.state, zero_for_one, &received)?;
        Ok(PoolQuote {
            amount: CurrencyAmount::from_raw(
                currency_out.clone(),
                delivered_by_pool(currency_out, &step.amount)?,
            ),
            next_state: self.with_sqrt_price(step.sqrt_price_x96),
        })
    }

    async fn get_input_amount(&self, amount_out: &CurrencyAmount) -> Result<PoolQuote> {
        let zero_for_one = !zero_for_one(self, amount_out.currency())?;
        let (currency_in, currency_out) = self.sides(zero_for_one);
        let requested = sent_for_delivery(currency_out, amount_out.raw())?;
        let step = math::swap_exact_out(&self.state, zero_for_one, &requested)?;
        Ok(PoolQuote {
            amount: CurrencyAmount::from_raw(
                currency_in.clone(),
                sent_for_receipt(currency_in, &step.amount)?,
            ),
            next_state: self.with_sqrt_price(step.sqrt_price_x96),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Fraction;
    use tokio_test::block_on;

    fn token(byte: u8) -> Token {
        Token::new(1, Address::repeat_byte(byte), 18, None)
    }

    fn pool() -> ConcentratedPool {
        ConcentratedPool::new(token(1), token(2), 3_000, math::Q96.clone(), 1_000_000u32).unwrap()
    }

    #[test]
    fn address_depends_on_fee() {
        let low = ConcentratedPool::new(token(1), token(2), 500, math::Q96.clone(), 1u32).unwrap();
        assert_ne!(pool().id(), low.id());
    }

    #[test]
    fn prices_are_reciprocal() {
        let p = pool();
        let p0 = p.price_of(&token(1).into()).unwrap();
        let p1 = p.price_of(&token(2).into()).unwrap();
        assert_eq!(p0.ratio(), &Fraction::one());
        assert_eq!(p1.base_currency(), &Currency::Token(token(2)));
    }

    #[test]
    fn quotes_both_directions() {
        let p = pool();
        let sold = CurrencyAmount::from_raw(token(2).into(), 1_000u32);
        let out = block_on(p.get_output_amount(&sold)).unwrap();
        assert_eq!(out.amount.currency(), &Currency::Token(token(1)));
        let back = block_on(p.get_input_amount(&out.amount)).unwrap();
        assert_eq!(back.amount.currency(), &Currency::Token(token(2)));
        assert!(back.amount.raw() <= &BigUint::from(1_000u32));
    }

    #[test]
    fn transfer_fees_apply_on_both_sides() {
        let taxed = token(1).with_transfer_fees(500, 500);
        let deep = |t: Token| {
            ConcentratedPool::new(t, token(2), 3_000, math::Q96.clone(), 1_000_000_000_000u64)
                .unwrap()
        };
        let (taxed_pool, plain_pool) = (deep(taxed.clone()), deep(token(1)));

        // 5% of the sold amount never reaches the pool
        let sold_amount = CurrencyAmount::from_raw(taxed.clone().into(), 1_000_000u32);
        let sold = block_on(taxed_pool.get_output_amount(&sold_amount)).unwrap();
        let net = block_on(
            plain_pool.get_output_amount(&CurrencyAmount::from_raw(token(1).into(), 950_000u32)),
        )
        .unwrap();
        assert_eq!(sold.amount.raw(), net.amount.raw());

        // the pool sends 1000 / 0.95 so that 1000 arrives
        let bought = block_on(
            taxed_pool.get_input_amount(&CurrencyAmount::from_raw(taxed.into(), 1_000u32)),
        )
        .unwrap();
        let gross = block_on(
            plain_pool.get_input_amount(&CurrencyAmount::from_raw(token(1).into(), 1_053u32)),
        )
        .unwrap();
        assert_eq!(bought.amount.raw(), gross.amount.raw());
    }

    #[test]
    fn unknown_currency_is_rejected() {
        let unknown = CurrencyAmount::from_raw(token(9).into(), 1u32);
        let err = block_on(pool().get_output_amount(&unknown)).unwrap_err();
        assert_eq!(err.code(), "CURRENCY");
    }
}
