/*
 * Confluence - multi-protocol trade aggregation
 * Core library exports and module declarations
 */

pub mod analytics;
pub mod config;
pub mod currency;
pub mod dex;
pub mod math;
pub mod models;
pub mod route;
pub mod trade;
pub mod utils;

pub use config::EngineConfig;
pub use currency::{Currency, CurrencyAmount, NativeCurrency, Price, Token};
pub use math::{Fraction, Percent, Rounding};
pub use models::*;
pub use route::{Route, SwapRoute};
pub use trade::{trade_comparator, Leg, ProtocolGroups, Swap, Trade};
