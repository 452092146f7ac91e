/*
 * Singleton pool key and id derivation
 */

use ethers_core::abi::{encode, Token};
use ethers_core::types::{Address, H256};
use ethers_core::utils::keccak256;
use serde::{Deserialize, Serialize};

use crate::currency::Currency;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolKey {
    pub currency0: Address,
    pub currency1: Address,
    pub fee: u32,
    pub tick_spacing: i32,
    pub hooks: Address,
}

impl PoolKey {
    /// Orders the currencies by address; the native currency is the zero address
    /// and therefore always `currency0`.
    #[must_use]
    pub fn new(a: &Currency, b: &Currency, fee: u32, tick_spacing: i32, hooks: Address) -> Self {
        let (currency0, currency1) = if a.address() < b.address() {
            (a.address(), b.address())
        } else {
            (b.address(), a.address())
        };
        Self {
            currency0,
            currency1,
            fee,
            tick_spacing,
            hooks,
        }
    }

    #[must_use]
    pub fn to_id(&self) -> H256 {
        let encoded = encode(&[
            Token::Address(self.currency0),
            Token::Address(self.currency1),
            Token::Uint(self.fee.into()),
            Token::Int(self.tick_spacing.into()),
            Token::Address(self.hooks),
        ]);

        H256::from(keccak256(encoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::{NativeCurrency, Token as Erc20};

    fn usdc() -> Currency {
        Erc20::new(
            1,
            "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".parse().unwrap(),
            6,
            Some("USDC"),
        )
        .into()
    }

    fn eth() -> Currency {
        let weth = Erc20::new(
            1,
            "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2".parse().unwrap(),
            18,
            Some("WETH"),
        );
        NativeCurrency::new(1, "ETH", 18, weth).into()
    }

    #[test]
    fn native_sorts_first() {
        let key = PoolKey::new(&usdc(), &eth(), 500, 10, Address::zero());
        assert_eq!(key.currency0, Address::zero());
        assert_eq!(key.currency1, usdc().address());
    }

    #[test]
    fn id_is_order_independent_and_fee_sensitive() {
        let a = PoolKey::new(&usdc(), &eth(), 500, 10, Address::zero());
        let b = PoolKey::new(&eth(), &usdc(), 500, 10, Address::zero());
        let c = PoolKey::new(&eth(), &usdc(), 3_000, 60, Address::zero());
        assert_eq!(a.to_id(), b.to_id());
        assert_ne!(a.to_id(), c.to_id());
    }
}
