/*
 * Configuration management for the trade engine
 */

use config::{Config, Environment};
use serde::{Deserialize, Serialize};

use crate::currency::{Currency, NativeCurrency, Token};
use crate::math::Percent;
use crate::models::Result;
use crate::utils::format_address;

const ENV_PREFIX: &str = "CONFLUENCE";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EngineConfig {
    pub chain: ChainConfig,
    pub trading: TradingConfig,
    pub quoting: QuotingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub native_symbol: String,
    pub native_decimals: u8,
    pub wrapped_native_address: String,
    pub wrapped_native_symbol: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TradingConfig {
    pub default_slippage_bps: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuotingConfig {
    /// Upper bound on legs quoted at the same time.
    pub max_concurrent_legs: usize,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: 1,
            native_symbol: "ETH".to_string(),
            native_decimals: 18,
            wrapped_native_address: "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2".to_string(),
            wrapped_native_symbol: "WETH".to_string(),
        }
    }
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            default_slippage_bps: 50,
        }
    }
}

impl Default for QuotingConfig {
    fn default() -> Self {
        Self {
            max_concurrent_legs: 16,
        }
    }
}

impl EngineConfig {
    /// Loads `.env` if present, then overlays `CONFLUENCE__SECTION__KEY`
    /// variables on the defaults.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_environment(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        )
    }

    fn from_environment(environment: Environment) -> Result<Self> {
        let config = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(environment)
            .build()?
            .try_deserialize::<Self>()?;
        // wrapped native address must parse
        config.chain.native_currency()?;
        Ok(config)
    }
}

impl ChainConfig {
    pub fn wrapped_native(&self) -> Result<Token> {
        let address = format_address(&self.wrapped_native_address)?;
        Ok(Token::new(
            self.chain_id,
            address,
            self.native_decimals,
            Some(&self.wrapped_native_symbol),
        ))
    }

    pub fn native_currency(&self) -> Result<Currency> {
        Ok(NativeCurrency::new(
            self.chain_id,
            &self.native_symbol,
            self.native_decimals,
            self.wrapped_native()?,
        )
        .into())
    }
}

impl TradingConfig {
    #[must_use]
    pub fn default_slippage(&self) -> Percent {
        Percent::from_bps(self.default_slippage_bps)
    }
}
