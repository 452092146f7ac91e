/*
 * Constant-product pair integration
 */

mod pair;

pub use pair::Pair;

pub const FACTORY_ADDRESS: &str = "0x5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f";
pub const INIT_CODE_HASH: &str = "0x96e8ac4277198ff8b6f785478aa9a39f403cb768dd02cbee326c3e7da348845f";

/// LP fee kept by the pair, out of 1000.
pub const FEE_NUMERATOR: u32 = 997;
pub const FEE_DENOMINATOR: u32 = 1000;
