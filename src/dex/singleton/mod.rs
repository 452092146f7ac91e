/*
 * Singleton pool integration
 */

mod pool;
mod types;

pub use pool::SingletonPool;
pub use types::PoolKey;
