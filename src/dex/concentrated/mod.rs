/*
 * Concentrated-liquidity pool integration
 */

mod pool;

pub use pool::ConcentratedPool;

pub const FACTORY_ADDRESS: &str = "0x1F98431c8aD98523631AE4a59f267346ea31F984";
pub const POOL_INIT_CODE_HASH: &str = "0xe34f199b19b2b4f47f68442619d555527d244f78a3297ea89325f843f87b8b54";
