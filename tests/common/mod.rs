/*
 * Shared fixtures for integration tests
 */

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use confluence::dex::{ConcentratedPool, Pair, Pool, SingletonPool};
use confluence::{
    Currency, CurrencyAmount, NativeCurrency, Price, Protocol, Result, Route, SwapRoute, Token,
};
use ethers_core::types::Address;
use num_bigint::BigUint;
use num_traits::One;
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn token(byte: u8, symbol: &str) -> Token {
    Token::new(1, Address::repeat_byte(byte), 18, Some(symbol))
}

pub fn usdc() -> Token {
    token(0x11, "USDC")
}

pub fn dai() -> Token {
    token(0x22, "DAI")
}

pub fn wbtc() -> Token {
    token(0x33, "WBTC")
}

pub fn weth() -> Token {
    token(0xee, "WETH")
}

pub fn eth() -> Currency {
    NativeCurrency::new(1, "ETH", 18, weth()).into()
}

pub fn q96() -> BigUint {
    BigUint::one() << 96usize
}

pub fn pair(a: Token, b: Token, reserve_a: u64, reserve_b: u64) -> Arc<dyn Pool> {
    Arc::new(Pair::new(a, b, reserve_a, reserve_b).unwrap())
}

pub fn concentrated(a: Token, b: Token, fee: u32, liquidity: u64) -> Arc<dyn Pool> {
    Arc::new(ConcentratedPool::new(a, b, fee, q96(), liquidity).unwrap())
}

pub fn singleton(a: Currency, b: Currency, fee: u32, liquidity: u64) -> Arc<dyn Pool> {
    Arc::new(SingletonPool::new(a, b, fee, 60, Address::zero(), q96(), liquidity).unwrap())
}

pub fn route(
    pools: Vec<Arc<dyn Pool>>,
    input: impl Into<Currency>,
    output: impl Into<Currency>,
) -> Arc<dyn SwapRoute> {
    Route::new(pools, input.into(), output.into()).unwrap().into_shared()
}

pub fn amount(currency: impl Into<Currency>, raw: u64) -> CurrencyAmount {
    CurrencyAmount::from_raw(currency.into(), raw)
}

pub fn raw(value: u64) -> BigUint {
    BigUint::from(value)
}

/// Route wrapper that counts mid price derivations.
#[derive(Debug)]
pub struct CountingRoute {
    inner: Route,
    pub mid_price_calls: AtomicUsize,
}

impl CountingRoute {
    pub fn new(inner: Route) -> Self {
        Self {
            inner,
            mid_price_calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.mid_price_calls.load(Ordering::SeqCst)
    }
}

impl SwapRoute for CountingRoute {
    fn protocol(&self) -> Protocol {
        self.inner.protocol()
    }

    fn pools(&self) -> &[Arc<dyn Pool>] {
        self.inner.pools()
    }

    fn input(&self) -> &Currency {
        self.inner.input()
    }

    fn output(&self) -> &Currency {
        self.inner.output()
    }

    fn path(&self) -> &[Currency] {
        self.inner.path()
    }

    fn path_input(&self) -> &Currency {
        self.inner.path_input()
    }

    fn path_output(&self) -> &Currency {
        self.inner.path_output()
    }

    fn mid_price(&self) -> Result<Price> {
        self.mid_price_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.mid_price()
    }
}
