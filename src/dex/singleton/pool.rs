/*
 * Singleton pool quoting; pools may hold the native currency directly
 */

use async_trait::async_trait;
use ethers_core::types::Address;
use num_bigint::BigUint;
use std::sync::Arc;

use super::types::PoolKey;
use crate::currency::{Currency, CurrencyAmount, Price};
use crate::dex::math::{self, RangeState};
use crate::dex::{
    delivered_by_pool, received_by_pool, sent_for_delivery, sent_for_receipt, zero_for_one, Pool,
    PoolId, PoolQuote,
};
use crate::models::{ConfluenceError, Protocol, Result};

#[derive(Debug, Clone)]
pub struct SingletonPool {
    key: PoolKey,
    currency0: Currency,
    currency1: Currency,
    state: RangeState,
}

impl SingletonPool {
    /// `sqrt_price_x96` is the square root of the currency0 price after sorting.
    pub fn new(
        currency_a: Currency,
        currency_b: Currency,
        fee: u32,
        tick_spacing: i32,
        hooks: Address,
        sqrt_price_x96: impl Into<BigUint>,
        liquidity: impl Into<BigUint>,
    ) -> Result<Self> {
        if currency_a.chain_id() != currency_b.chain_id() {
            return Err(ConfluenceError::ChainIds);
        }
        if currency_a == currency_b {
            return Err(ConfluenceError::Path(
                "pool currencies must be distinct".to_string(),
            ));
        }
        let key = PoolKey::new(&currency_a, &currency_b, fee, tick_spacing, hooks);
        let (currency0, currency1) = if currency_a.address() == key.currency0 {
            (currency_a, currency_b)
        } else {
            (currency_b, currency_a)
        };
        Ok(Self {
            key,
            currency0,
            currency1,
            state: RangeState {
                sqrt_price_x96: sqrt_price_x96.into(),
                liquidity: liquidity.into(),
                fee,
            },
        })
    }

    #[must_use]
    pub fn key(&self) -> &PoolKey {
        &self.key
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
impl Pool for SingletonPool {
    fn protocol(&self) -> Protocol {
        Protocol::V4
    }

    fn id(&self) -> PoolId {
        PoolId::Key(self.key.to_id())
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
        let currency0_price = Price::from_ratio(
            self.currency0.clone(),
            self.currency1.clone(),
            math::token0_price(&self.state.sqrt_price_x96)?,
        );
        if zero_for_one(self, currency)? {
            Ok(currency0_price)
        } else {
            currency0_price.invert()
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
