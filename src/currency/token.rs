/*
 * Native and token currencies
 */

use std::fmt;
use std::hash::{Hash, Hasher};

use ethers_core::types::Address;
use serde::{Deserialize, Serialize};

use crate::math::Percent;

/// A fungible token contract on one chain.
///
/// Identity is `(chain_id, address)`; symbol and transfer fees are metadata.
/// `buy_fee_bps` is taken by the token contract when it is transferred out of
/// a pool, `sell_fee_bps` when it is transferred into one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub chain_id: u64,
    pub address: Address,
    pub decimals: u8,
    pub symbol: Option<String>,
    pub buy_fee_bps: Option<u32>,
    pub sell_fee_bps: Option<u32>,
}

impl Token {
    #[must_use]
    pub fn new(chain_id: u64, address: Address, decimals: u8, symbol: Option<&str>) -> Self {
        Self {
            chain_id,
            address,
            decimals,
            symbol: symbol.map(str::to_string),
            buy_fee_bps: None,
            sell_fee_bps: None,
        }
    }

    #[must_use]
    pub fn with_transfer_fees(mut self, buy_fee_bps: u32, sell_fee_bps: u32) -> Self {
        self.buy_fee_bps = Some(buy_fee_bps);
        self.sell_fee_bps = Some(sell_fee_bps);
        self
    }

    /// Pool ordering: the token with the lower address is `token0`.
    #[must_use]
    pub fn sorts_before(&self, other: &Token) -> bool {
        self.address < other.address
    }

    #[must_use]
    pub fn buy_fee(&self) -> Percent {
        Percent::from_bps(self.buy_fee_bps.unwrap_or(0))
    }

    #[must_use]
    pub fn sell_fee(&self) -> Percent {
        Percent::from_bps(self.sell_fee_bps.unwrap_or(0))
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.chain_id == other.chain_id && self.address == other.address
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.chain_id.hash(state);
        self.address.hash(state);
    }
}

/// The chain's gas currency, together with the token that wraps it 1:1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub chain_id: u64,
    pub decimals: u8,
    pub symbol: String,
    pub wrapped: Token,
}

impl NativeCurrency {
    #[must_use]
    pub fn new(chain_id: u64, symbol: &str, decimals: u8, wrapped: Token) -> Self {
        Self {
            chain_id,
            decimals,
            symbol: symbol.to_string(),
            wrapped,
        }
    }
}

impl PartialEq for NativeCurrency {
    fn eq(&self, other: &Self) -> bool {
        self.chain_id == other.chain_id
    }
}

impl Eq for NativeCurrency {}

/// Either the native currency or a token. The native currency and its wrapped
/// token are distinct currencies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Currency {
    Native(NativeCurrency),
    Token(Token),
}

impl Currency {
    #[must_use]
    pub fn chain_id(&self) -> u64 {
        match self {
            Currency::Native(native) => native.chain_id,
            Currency::Token(token) => token.chain_id,
        }
    }

    #[must_use]
    pub fn decimals(&self) -> u8 {
        match self {
            Currency::Native(native) => native.decimals,
            Currency::Token(token) => token.decimals,
        }
    }

    #[must_use]
    pub fn symbol(&self) -> String {
        match self {
            Currency::Native(native) => native.symbol.clone(),
            Currency::Token(token) => token
                .symbol
                .clone()
                .unwrap_or_else(|| format!("{:?}", token.address)),
        }
    }

    #[must_use]
    pub fn is_native(&self) -> bool {
        matches!(self, Currency::Native(_))
    }

    #[must_use]
    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Currency::Native(_) => None,
            Currency::Token(token) => Some(token),
        }
    }

    /// The token form of this currency: itself for tokens, the wrapped token for native.
    #[must_use]
    pub fn wrapped(&self) -> &Token {
        match self {
            Currency::Native(native) => &native.wrapped,
            Currency::Token(token) => token,
        }
    }

    /// True when `self` and `other` are the same currency or a native/wrapped pair.
    #[must_use]
    pub fn is_fungible_with(&self, other: &Currency) -> bool {
        self.wrapped() == other.wrapped()
    }

    /// Address used on-chain; the native currency is the zero address.
    #[must_use]
    pub fn address(&self) -> Address {
        match self {
            Currency::Native(_) => Address::zero(),
            Currency::Token(token) => token.address,
        }
    }

    #[must_use]
    pub fn buy_fee(&self) -> Percent {
        self.as_token().map(Token::buy_fee).unwrap_or_default()
    }

    #[must_use]
    pub fn sell_fee(&self) -> Percent {
        self.as_token().map(Token::sell_fee).unwrap_or_default()
    }
}

impl PartialEq for Currency {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Currency::Native(a), Currency::Native(b)) => a == b,
            (Currency::Token(a), Currency::Token(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Currency {}

impl Hash for Currency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Currency::Native(native) => {
                0u8.hash(state);
                native.chain_id.hash(state);
            }
            Currency::Token(token) => {
                1u8.hash(state);
                token.hash(state);
            }
        }
    }
}

impl From<Token> for Currency {
    fn from(token: Token) -> Self {
        Currency::Token(token)
    }
}

impl From<NativeCurrency> for Currency {
    fn from(native: NativeCurrency) -> Self {
        Currency::Native(native)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
