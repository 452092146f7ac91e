/*
 * Currencies, currency-tagged amounts and prices
 */

mod amount;
mod price;
mod token;

pub use amount::CurrencyAmount;
pub use price::Price;
pub use token::{Currency, NativeCurrency, Token};
