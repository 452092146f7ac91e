/*
 * Route facade: one read-only view over routes of every protocol
 */

use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

use crate::currency::{Currency, Price};
use crate::dex::{other_currency, path_currency, Pool, PoolId};
use crate::models::{ConfluenceError, Protocol, Result};

/// What the trade engine needs from a route, whatever protocol built it.
///
/// `path_input`/`path_output` are the currencies touching the first and last
/// pool; they may be the native/wrapped counterpart of `input`/`output`.
pub trait SwapRoute: Send + Sync + fmt::Debug {
    fn protocol(&self) -> Protocol;
    fn pools(&self) -> &[Arc<dyn Pool>];
    fn input(&self) -> &Currency;
    fn output(&self) -> &Currency;
    fn path(&self) -> &[Currency];
    fn path_input(&self) -> &Currency;
    fn path_output(&self) -> &Currency;
    /// Zero-size price of `input` in `output`.
    fn mid_price(&self) -> Result<Price>;

    fn chain_id(&self) -> u64 {
        self.input().chain_id()
    }
}

impl PartialEq for dyn SwapRoute {
    fn eq(&self, other: &Self) -> bool {
        self.protocol() == other.protocol()
            && self.input() == other.input()
            && self.output() == other.output()
            && self.pools().len() == other.pools().len()
            && self
                .pools()
                .iter()
                .zip(other.pools())
                .all(|(a, b)| a.id() == b.id())
    }
}

/// A path of pools from `input` to `output`. Pools from more than one protocol
/// make a mixed route.
#[derive(Debug)]
pub struct Route {
    protocol: Protocol,
    pools: Vec<Arc<dyn Pool>>,
    input: Currency,
    output: Currency,
    path: Vec<Currency>,
    mid_price: OnceCell<Price>,
}

impl Route {
    pub fn new(pools: Vec<Arc<dyn Pool>>, input: Currency, output: Currency) -> Result<Self> {
        let first = pools.first().ok_or(ConfluenceError::Pools)?;
        let chain_id = first.chain_id();
        if input.chain_id() != chain_id
            || output.chain_id() != chain_id
            || pools.iter().any(|pool| pool.chain_id() != chain_id)
        {
            return Err(ConfluenceError::ChainIds);
        }

        let path_input = path_currency(&input, first.as_ref()).map_err(|_| ConfluenceError::Input)?;
        let mut path = Vec::with_capacity(pools.len() + 1);
        path.push(path_input);
        for (hop, pool) in pools.iter().enumerate() {
            let current = &path[hop];
            if !pool.involves_currency(current) {
                return Err(ConfluenceError::Path(format!(
                    "pool {} at hop {hop} does not trade {current}",
                    pool.id()
                )));
            }
            let next = other_currency(pool.as_ref(), current)?;
            path.push(next);
        }

        let reached = &path[pools.len()];
        if !reached.is_fungible_with(&output) {
            return Err(ConfluenceError::Output);
        }

        let protocol = match first.protocol() {
            p if pools.iter().all(|pool| pool.protocol() == p) => p,
            _ => Protocol::Mixed,
        };

        Ok(Self {
            protocol,
            pools,
            input,
            output,
            path,
            mid_price: OnceCell::new(),
        })
    }

    #[must_use]
    pub fn pool_ids(&self) -> Vec<PoolId> {
        self.pools.iter().map(|pool| pool.id()).collect()
    }

    #[must_use]
    pub fn into_shared(self) -> Arc<dyn SwapRoute> {
        Arc::new(self)
    }

    fn compute_mid_price(&self) -> Result<Price> {
        let mut price: Option<Price> = None;
        for (pool, currency) in self.pools.iter().zip(&self.path) {
            let hop = pool.price_of(currency)?;
            price = Some(match price {
                Some(acc) => acc.multiply(&hop)?,
                None => hop,
            });
        }
        price
            .ok_or(ConfluenceError::Pools)?
            .with_currencies(&self.input, &self.output)
    }
}

impl SwapRoute for Route {
    fn protocol(&self) -> Protocol {
        self.protocol
    }

    fn pools(&self) -> &[Arc<dyn Pool>] {
        &self.pools
    }

    fn input(&self) -> &Currency {
        &self.input
    }

    fn output(&self) -> &Currency {
        &self.output
    }

    fn path(&self) -> &[Currency] {
        &self.path
    }

    fn path_input(&self) -> &Currency {
        &self.path[0]
    }

    fn path_output(&self) -> &Currency {
        &self.path[self.path.len() - 1]
    }

    fn mid_price(&self) -> Result<Price> {
        self.mid_price
            .get_or_try_init(|| self.compute_mid_price())
            .cloned()
    }
}
