/*
 * Shared models: error codes, trade/protocol tags and the trade summary
 */

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeType {
    ExactInput,
    ExactOutput,
}

/// AMM protocol family a pool or route belongs to.
///
/// The declaration order is the order in which legs are grouped inside a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Constant-product pairs.
    V2,
    /// Concentrated-liquidity pools.
    V3,
    /// Routes whose pools span more than one protocol.
    Mixed,
    /// Singleton-style pools keyed by pool id.
    V4,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeSummary {
    pub timestamp_utc: DateTime<Utc>,
    pub trade_type: TradeType,
    pub input_symbol: String,
    pub output_symbol: String,
    pub input_amount: Decimal,
    pub output_amount: Decimal,
    pub execution_price: Decimal,
    pub price_impact_percent: Decimal,
    pub slippage_tolerance_percent: Decimal,
    pub minimum_amount_out: Decimal,
    pub maximum_amount_in: Decimal,
    pub legs: Vec<LegSummary>,
    pub wrap_plan: WrapPlan,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegSummary {
    pub protocol: Protocol,
    pub hops: usize,
    pub input_amount: Decimal,
    pub output_amount: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrapPlan {
    pub input_wraps: usize,
    pub input_unwraps: usize,
    pub output_wraps: usize,
    pub output_unwraps: usize,
}

#[derive(Debug, Error)]
pub enum ConfluenceError {
    #[error("amount currency does not match route input")]
    Input,

    #[error("amount currency does not match route output")]
    Output,

    #[error("swaps do not share one input currency")]
    InputCurrencyMatch,

    #[error("swaps do not share one output currency")]
    OutputCurrencyMatch,

    #[error("pool {0} is used by more than one swap")]
    PoolsDuplicated(String),

    #[error("mixed routes only support exact input trades")]
    TradeType,

    #[error("slippage tolerance must not be negative")]
    SlippageTolerance,

    #[error("currency mismatch: {0}")]
    Currency(String),

    #[error("route pools span more than one chain")]
    ChainIds,

    #[error("route has no pools")]
    Pools,

    #[error("invalid path: {0}")]
    Path(String),

    #[error("trade has no swaps")]
    NoSwaps,

    #[error("trade is split across {0} routes")]
    MultipleRoutes(usize),

    #[error("insufficient liquidity: {0}")]
    InsufficientLiquidity(String),

    #[error("insufficient input amount")]
    InsufficientInput,

    #[error("division by zero")]
    DivisionByZero,

    #[error("amount underflow")]
    Underflow,

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("conversion error: {0}")]
    ConversionError(String),
}

impl ConfluenceError {
    /// Short stable code identifying the failure.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Input => "INPUT",
            Self::Output => "OUTPUT",
            Self::InputCurrencyMatch => "INPUT_CURRENCY_MATCH",
            Self::OutputCurrencyMatch => "OUTPUT_CURRENCY_MATCH",
            Self::PoolsDuplicated(_) => "POOLS_DUPLICATED",
            Self::TradeType => "TRADE_TYPE",
            Self::SlippageTolerance => "SLIPPAGE_TOLERANCE",
            Self::Currency(_) => "CURRENCY",
            Self::ChainIds => "CHAIN_IDS",
            Self::Pools => "POOLS",
            Self::Path(_) => "PATH",
            Self::NoSwaps => "NO_SWAPS",
            Self::MultipleRoutes(_) => "MULTIPLE_ROUTES",
            Self::InsufficientLiquidity(_) => "INSUFFICIENT_LIQUIDITY",
            Self::InsufficientInput => "INSUFFICIENT_INPUT",
            Self::DivisionByZero => "DIVISION_BY_ZERO",
            Self::Underflow => "UNDERFLOW",
            Self::ConfigError(_) => "CONFIG",
            Self::ConversionError(_) => "CONVERSION",
        }
    }
}

impl From<config::ConfigError> for ConfluenceError {
    fn from(e: config::ConfigError) -> Self {
        ConfluenceError::ConfigError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConfluenceError>;
