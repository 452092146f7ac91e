/*
 * Quoting orchestration: walking routes through pools, one leg or many at once
 */

use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{ProtocolGroups, Swap, Trade};
use crate::config::QuotingConfig;
use crate::currency::CurrencyAmount;
use crate::models::{ConfluenceError, Protocol, Result, TradeType};
use crate::route::SwapRoute;

/// A route and the fixed amount to quote through it: the input for exact-input
/// trades, the output for exact-output trades.
#[derive(Debug, Clone)]
pub struct Leg {
    pub route: Arc<dyn SwapRoute>,
    pub amount: CurrencyAmount,
}

impl Leg {
    #[must_use]
    pub fn new(route: Arc<dyn SwapRoute>, amount: CurrencyAmount) -> Self {
        Self { route, amount }
    }
}

/// Quotes one leg through its route's pools.
///
/// Exact-input legs run first pool to last, exact-output legs last pool to
/// first. The amount must be in the route's declared currency for the fixed side.
pub async fn quote_leg(leg: Leg, trade_type: TradeType) -> Result<Swap> {
    let Leg { route, amount } = leg;
    match trade_type {
        TradeType::ExactInput => {
            if amount.currency() != route.input() {
                return Err(ConfluenceError::Input);
            }
            let mut running = amount.with_currency(route.path_input())?;
            for pool in route.pools() {
                running = pool.get_output_amount(&running).await?.amount;
            }
            let output_amount = running.with_currency(route.output())?;
            Ok(Swap::new(route, amount, output_amount))
        }
        TradeType::ExactOutput => {
            if amount.currency() != route.output() {
                return Err(ConfluenceError::Output);
            }
            let mut running = amount.with_currency(route.path_output())?;
            for pool in route.pools().iter().rev() {
                running = pool.get_input_amount(&running).await?.amount;
            }
            let input_amount = running.with_currency(route.input())?;
            Ok(Swap::new(route, input_amount, amount))
        }
    }
}

impl Trade {
    /// Quotes `amount` through a single route.
    pub async fn from_route(
        route: Arc<dyn SwapRoute>,
        amount: CurrencyAmount,
        trade_type: TradeType,
    ) -> Result<Self> {
        let swap = quote_leg(Leg::new(route, amount), trade_type).await?;
        Self::from_ordered_swaps(vec![swap], trade_type)
    }

    pub async fn exact_in(route: Arc<dyn SwapRoute>, amount_in: CurrencyAmount) -> Result<Self> {
        Self::from_route(route, amount_in, TradeType::ExactInput).await
    }

    pub async fn exact_out(route: Arc<dyn SwapRoute>, amount_out: CurrencyAmount) -> Result<Self> {
        Self::from_route(route, amount_out, TradeType::ExactOutput).await
    }

    /// Quotes every leg and aggregates the results with default quoting settings.
    pub async fn from_routes(legs: ProtocolGroups<Leg>, trade_type: TradeType) -> Result<Self> {
        Self::from_routes_with_config(legs, trade_type, &QuotingConfig::default()).await
    }

    /// Quotes legs concurrently, at most `max_concurrent_legs` at a time. The
    /// first failing leg aborts the whole batch.
    pub async fn from_routes_with_config(
        legs: ProtocolGroups<Leg>,
        trade_type: TradeType,
        config: &QuotingConfig,
    ) -> Result<Self> {
        if trade_type == TradeType::ExactOutput
            && (!legs.mixed.is_empty()
                || legs.iter().any(|leg| leg.route.protocol() == Protocol::Mixed))
        {
            warn!(
                code = ConfluenceError::TradeType.code(),
                "mixed legs cannot be quoted for exact output"
            );
            return Err(ConfluenceError::TradeType);
        }

        let legs = legs.into_ordered();
        let count = legs.len();
        info!(legs = count, ?trade_type, "quoting legs");

        let swaps: Vec<Swap> = stream::iter(legs)
            .map(|leg| quote_leg(leg, trade_type))
            .buffered(config.max_concurrent_legs.max(1))
            .try_collect()
            .await
            .map_err(|e| {
                warn!(code = e.code(), "leg quote failed: {}", e);
                e
            })?;

        debug!(legs = count, "all legs quoted");
        Self::from_ordered_swaps(swaps, trade_type)
    }
}
