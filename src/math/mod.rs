/*
 * Exact rational arithmetic used for amounts, prices and percentages
 */

mod fraction;
mod percent;

pub use fraction::{Fraction, Rounding};
pub use percent::Percent;
