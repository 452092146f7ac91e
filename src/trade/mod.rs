/*
 * Trade aggregation: legs from every protocol combined into one validated trade
 */

mod boundary;
mod economics;
mod quote;

use once_cell::sync::OnceCell;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::currency::{Currency, CurrencyAmount, Price};
use crate::math::Percent;
use crate::models::{ConfluenceError, Protocol, Result, TradeType};
use crate::route::SwapRoute;

pub use quote::{quote_leg, Leg};

/// One resolved leg of a trade.
#[derive(Debug, Clone)]
pub struct Swap {
    pub route: Arc<dyn SwapRoute>,
    pub input_amount: CurrencyAmount,
    pub output_amount: CurrencyAmount,
}

impl Swap {
    #[must_use]
    pub fn new(
        route: Arc<dyn SwapRoute>,
        input_amount: CurrencyAmount,
        output_amount: CurrencyAmount,
    ) -> Self {
        Self {
            route,
            input_amount,
            output_amount,
        }
    }
}

/// Items grouped by protocol. Iteration order is v2, v3, mixed, v4.
#[derive(Debug, Clone)]
pub struct ProtocolGroups<T> {
    pub v2: Vec<T>,
    pub v3: Vec<T>,
    pub mixed: Vec<T>,
    pub v4: Vec<T>,
}

impl<T> Default for ProtocolGroups<T> {
    fn default() -> Self {
        Self {
            v2: Vec::new(),
            v3: Vec::new(),
            mixed: Vec::new(),
            v4: Vec::new(),
        }
    }
}

impl<T> ProtocolGroups<T> {
    /// Places `item` in the group for `protocol`.
    pub fn push(&mut self, protocol: Protocol, item: T) {
        match protocol {
            Protocol::V2 => self.v2.push(item),
            Protocol::V3 => self.v3.push(item),
            Protocol::Mixed => self.mixed.push(item),
            Protocol::V4 => self.v4.push(item),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.v2.len() + self.v3.len() + self.mixed.len() + self.v4.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Items in protocol order, by reference.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.v2
            .iter()
            .chain(&self.v3)
            .chain(&self.mixed)
            .chain(&self.v4)
    }

    #[must_use]
    pub fn into_ordered(self) -> Vec<T> {
        let mut ordered = Vec::with_capacity(self.len());
        ordered.extend(self.v2);
        ordered.extend(self.v3);
        ordered.extend(self.mixed);
        ordered.extend(self.v4);
        ordered
    }
}

/// An immutable trade split across one or more routes.
///
/// All swaps share one input and one output currency and no pool is used twice.
/// Amounts are summed at construction; execution price and price impact are
/// computed on first read and kept for the trade's lifetime.
#[derive(Debug)]
pub struct Trade {
    swaps: Vec<Swap>,
    trade_type: TradeType,
    input_amount: CurrencyAmount,
    output_amount: CurrencyAmount,
    execution_price: OnceCell<Price>,
    price_impact: OnceCell<Percent>,
}

impl Trade {
    /// Aggregates already-quoted swaps.
    pub fn new(swaps: ProtocolGroups<Swap>, trade_type: TradeType) -> Result<Self> {
        Self::from_ordered_swaps(swaps.into_ordered(), trade_type)
    }

    /// Single pre-quoted leg, e.g. simulated elsewhere.
    pub fn create_unchecked_trade(
        route: Arc<dyn SwapRoute>,
        input_amount: CurrencyAmount,
        output_amount: CurrencyAmount,
        trade_type: TradeType,
    ) -> Result<Self> {
        let mut swaps = ProtocolGroups::default();
        swaps.push(route.protocol(), Swap::new(route, input_amount, output_amount));
        Self::new(swaps, trade_type)
    }

    pub(crate) fn from_ordered_swaps(swaps: Vec<Swap>, trade_type: TradeType) -> Result<Self> {
        if let Err(e) = validate(&swaps, trade_type) {
            warn!(code = e.code(), legs = swaps.len(), "rejected trade aggregation: {}", e);
            return Err(e);
        }

        let (first, rest) = swaps.split_first().ok_or(ConfluenceError::NoSwaps)?;
        let mut input_amount = first.input_amount.clone();
        let mut output_amount = first.output_amount.clone();
        for swap in rest {
            input_amount = input_amount.add(&swap.input_amount)?;
            output_amount = output_amount.add(&swap.output_amount)?;
        }

        debug!(
            legs = swaps.len(),
            ?trade_type,
            input = %input_amount,
            output = %output_amount,
            "trade assembled"
        );

        Ok(Self {
            swaps,
            trade_type,
            input_amount,
            output_amount,
            execution_price: OnceCell::new(),
            price_impact: OnceCell::new(),
        })
    }

    #[must_use]
    pub fn swaps(&self) -> &[Swap] {
        &self.swaps
    }

    #[must_use]
    pub fn trade_type(&self) -> TradeType {
        self.trade_type
    }

    #[must_use]
    pub fn routes(&self) -> Vec<Arc<dyn SwapRoute>> {
        self.swaps.iter().map(|swap| swap.route.clone()).collect()
    }

    /// The route of a single-leg trade.
    pub fn route(&self) -> Result<&Arc<dyn SwapRoute>> {
        match self.swaps.as_slice() {
            [only] => Ok(&only.route),
            swaps => Err(ConfluenceError::MultipleRoutes(swaps.len())),
        }
    }

    #[must_use]
    pub fn input_currency(&self) -> &Currency {
        self.input_amount.currency()
    }

    #[must_use]
    pub fn output_currency(&self) -> &Currency {
        self.output_amount.currency()
    }

    #[must_use]
    pub fn input_amount(&self) -> &CurrencyAmount {
        &self.input_amount
    }

    #[must_use]
    pub fn output_amount(&self) -> &CurrencyAmount {
        &self.output_amount
    }

    fn hops(&self) -> usize {
        self.swaps.iter().map(|swap| swap.route.pools().len()).sum()
    }
}

fn validate(swaps: &[Swap], trade_type: TradeType) -> Result<()> {
    let first = swaps.first().ok_or(ConfluenceError::NoSwaps)?;
    let input_currency = first.route.input();
    let output_currency = first.route.output();

    if swaps.iter().any(|swap| {
        swap.route.input() != input_currency || swap.input_amount.currency() != input_currency
    }) {
        return Err(ConfluenceError::InputCurrencyMatch);
    }
    if swaps.iter().any(|swap| {
        swap.route.output() != output_currency || swap.output_amount.currency() != output_currency
    }) {
        return Err(ConfluenceError::OutputCurrencyMatch);
    }

    let mut seen = HashSet::new();
    for pool in swaps.iter().flat_map(|swap| swap.route.pools()) {
        let id = pool.id();
        if !seen.insert(id.clone()) {
            return Err(ConfluenceError::PoolsDuplicated(id.to_string()));
        }
    }

    if trade_type == TradeType::ExactOutput
        && swaps.iter().any(|swap| swap.route.protocol() == Protocol::Mixed)
    {
        return Err(ConfluenceError::TradeType);
    }
    Ok(())
}

/// Orders trades between the same currencies: more output first, then less
/// input, then fewer hops.
pub fn trade_comparator(a: &Trade, b: &Trade) -> Result<Ordering> {
    if a.input_currency() != b.input_currency() {
        return Err(ConfluenceError::InputCurrencyMatch);
    }
    if a.output_currency() != b.output_currency() {
        return Err(ConfluenceError::OutputCurrencyMatch);
    }
    let ordering = b
        .output_amount
        .raw()
        .cmp(a.output_amount.raw())
        .then_with(|| a.input_amount.raw().cmp(b.input_amount.raw()))
        .then_with(|| a.hops().cmp(&b.hops()));
    Ok(ordering)
}
