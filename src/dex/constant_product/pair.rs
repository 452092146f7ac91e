/*
 * Constant-product pair with transfer-fee aware quoting
 */

use async_trait::async_trait;
use ethers_core::types::{Address, H256};
use ethers_core::utils::{get_create2_address_from_hash, keccak256};
use num_bigint::BigUint;
use num_traits::Zero;
use std::str::FromStr;
use std::sync::Arc;

use super::{FACTORY_ADDRESS, FEE_DENOMINATOR, FEE_NUMERATOR, INIT_CODE_HASH};
use crate::currency::{Currency, CurrencyAmount, Price, Token};
use crate::dex::{
    delivered_by_pool, received_by_pool, sent_for_delivery, sent_for_receipt, zero_for_one, Pool,
    PoolId, PoolQuote,
};
use crate::models::{ConfluenceError, Protocol, Result};
use crate::utils::format_address;

#[derive(Debug, Clone)]
pub struct Pair {
    address: Address,
    currency0: Currency,
    currency1: Currency,
    reserve0: BigUint,
    reserve1: BigUint,
}

impl Pair {
    /// Builds a pair at its canonical factory address. Tokens may be given in either order.
    pub fn new(
        token_a: Token,
        token_b: Token,
        reserve_a: impl Into<BigUint>,
        reserve_b: impl Into<BigUint>,
    ) -> Result<Self> {
        let factory = format_address(FACTORY_ADDRESS)?;
        let init_code_hash = H256::from_str(INIT_CODE_HASH)
            .map_err(|e| ConfluenceError::ConfigError(format!("Invalid init code hash: {e}")))?;
        let address = Self::compute_address(factory, &token_a, &token_b, init_code_hash)?;
        Self::with_address(address, token_a, token_b, reserve_a, reserve_b)
    }

    pub fn with_address(
        address: Address,
        token_a: Token,
        token_b: Token,
        reserve_a: impl Into<BigUint>,
        reserve_b: impl Into<BigUint>,
    ) -> Result<Self> {
        if token_a.chain_id != token_b.chain_id {
            return Err(ConfluenceError::ChainIds);
        }
        if token_a == token_b {
            return Err(ConfluenceError::Path(
                "pair tokens must be distinct".to_string(),
            ));
        }
        let (reserve_a, reserve_b) = (reserve_a.into(), reserve_b.into());
        let (token0, token1, reserve0, reserve1) = if token_a.sorts_before(&token_b) {
            (token_a, token_b, reserve_a, reserve_b)
        } else {
            (token_b, token_a, reserve_b, reserve_a)
        };
        Ok(Self {
            address,
            currency0: token0.into(),
            currency1: token1.into(),
            reserve0,
            reserve1,
        })
    }

    /// CREATE2 address of the pair for `factory`.
    pub fn compute_address(
        factory: Address,
        token_a: &Token,
        token_b: &Token,
        init_code_hash: H256,
    ) -> Result<Address> {
        if token_a == token_b {
            return Err(ConfluenceError::Path(
                "pair tokens must be distinct".to_string(),
            ));
        }
        let (token0, token1) = if token_a.sorts_before(token_b) {
            (token_a, token_b)
        } else {
            (token_b, token_a)
        };
        let mut packed = Vec::with_capacity(40);
        packed.extend_from_slice(token0.address.as_bytes());
        packed.extend_from_slice(token1.address.as_bytes());
        let salt = keccak256(packed);
        Ok(get_create2_address_from_hash(factory, salt, init_code_hash))
    }

    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    #[must_use]
    pub fn reserve_of(&self, currency: &Currency) -> Option<&BigUint> {
        if &self.currency0 == currency {
            Some(&self.reserve0)
        } else if &self.currency1 == currency {
            Some(&self.reserve1)
        } else {
            None
        }
    }

    fn reserves(&self, zero_for_one: bool) -> Result<(&BigUint, &BigUint)> {
        if self.reserve0.is_zero() || self.reserve1.is_zero() {
            return Err(ConfluenceError::InsufficientLiquidity(format!(
                "pair {:?} has no liquidity",
                self.address
            )));
        }
        Ok(if zero_for_one {
            (&self.reserve0, &self.reserve1)
        } else {
            (&self.reserve1, &self.reserve0)
        })
    }

    fn sides(&self, zero_for_one: bool) -> (&Currency, &Currency) {
        if zero_for_one {
            (&self.currency0, &self.currency1)
        } else {
            (&self.currency1, &self.currency0)
        }
    }

    fn next_state(
        &self,
        zero_for_one: bool,
        reserve_in: BigUint,
        reserve_out: BigUint,
    ) -> Arc<dyn Pool> {
        let mut next = self.clone();
        if zero_for_one {
            next.reserve0 = reserve_in;
            next.reserve1 = reserve_out;
        } else {
            next.reserve1 = reserve_in;
            next.reserve0 = reserve_out;
        }
        Arc::new(next)
    }

    fn get_amount_out(
        &self,
        amount_in: &BigUint,
        reserve_in: &BigUint,
        reserve_out: &BigUint,
    ) -> BigUint {
        let amount_in_with_fee = amount_in * FEE_NUMERATOR;
        let numerator = &amount_in_with_fee * reserve_out;
        let denominator = reserve_in * FEE_DENOMINATOR + &amount_in_with_fee;
        numerator / denominator
    }
}

#[async_trait]
impl Pool for Pair {
    fn protocol(&self) -> Protocol {
        Protocol::V2
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
        let zero_for_one = zero_for_one(self, currency)?;
        let (reserve_base, reserve_quote) = self.reserves(zero_for_one)?;
        let (base, quote) = self.sides(zero_for_one);
        Price::new(
            base.clone(),
            quote.clone(),
            reserve_base.clone(),
            reserve_quote.clone(),
        )
    }

    async fn get_output_amount(&self, amount_in: &CurrencyAmount) -> Result<PoolQuote> {
        let zero_for_one = zero_for_one(self, amount_in.currency())?;
        let (reserve_in, reserve_out) = self.reserves(zero_for_one)?;
        let (currency_in, currency_out) = self.sides(zero_for_one);

        // the input token's sell fee is taken before the pair sees the amount
        let received = received_by_pool(currency_in, amount_in.raw())?;
        let amount_out = self.get_amount_out(&received, reserve_in, reserve_out);
        if amount_out.is_zero() {
            return Err(ConfluenceError::InsufficientInput);
        }
        let delivered = CurrencyAmount::from_raw(
            currency_out.clone(),
            delivered_by_pool(currency_out, &amount_out)?,
        );

        let next_state = self.next_state(
            zero_for_one,
            reserve_in + &received,
            reserve_out - &amount_out,
        );
        Ok(PoolQuote {
            amount: delivered,
            next_state,
        })
    }

    async fn get_input_amount(&self, amount_out: &CurrencyAmount) -> Result<PoolQuote> {
        let zero_for_one = !zero_for_one(self, amount_out.currency())?;
        let (reserve_in, reserve_out) = self.reserves(zero_for_one)?;
        let (currency_in, currency_out) = self.sides(zero_for_one);

        let requested = sent_for_delivery(currency_out, amount_out.raw())?;
        if &requested >= reserve_out {
            return Err(ConfluenceError::InsufficientLiquidity(format!(
                "requested {requested}, pair {:?} holds {reserve_out}",
                self.address
            )));
        }

        let numerator = reserve_in * &requested * FEE_DENOMINATOR;
        let denominator = (reserve_out - &requested) * FEE_NUMERATOR;
        let amount_in: BigUint = numerator / denominator + 1u32;

        let sent = sent_for_receipt(currency_in, &amount_in)?;

        let next_state = self.next_state(
            zero_for_one,
            reserve_in + &amount_in,
            reserve_out - &requested,
        );
        Ok(PoolQuote {
            amount: CurrencyAmount::from_raw(currency_in.clone(), sent),
            next_state,
        })
    }
}
