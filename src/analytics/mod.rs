/*
 * Trade summaries for reporting and calldata layers
 */

use chrono::Utc;
use tracing::info;

use crate::math::Percent;
use crate::models::{LegSummary, Result, TradeSummary};
use crate::trade::Trade;

const PRICE_SCALE: u32 = 12;
const PERCENT_SCALE: u32 = 4;

/// Flattens a trade into human-denominated decimals.
///
/// Fails with `SLIPPAGE_TOLERANCE` for a negative tolerance, like the bounds
/// it reports.
pub fn summarize(trade: &Trade, slippage_tolerance: &Percent) -> Result<TradeSummary> {
    let minimum_amount_out = trade.minimum_amount_out(slippage_tolerance)?;
    let maximum_amount_in = trade.maximum_amount_in(slippage_tolerance)?;

    let legs = trade
        .swaps()
        .iter()
        .map(|swap| {
            Ok(LegSummary {
                protocol: swap.route.protocol(),
                hops: swap.route.pools().len(),
                input_amount: swap.input_amount.to_exact_decimal()?,
                output_amount: swap.output_amount.to_exact_decimal()?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let summary = TradeSummary {
        timestamp_utc: Utc::now(),
        trade_type: trade.trade_type(),
        input_symbol: trade.input_currency().symbol(),
        output_symbol: trade.output_currency().symbol(),
        input_amount: trade.input_amount().to_exact_decimal()?,
        output_amount: trade.output_amount().to_exact_decimal()?,
        execution_price: trade.execution_price()?.to_decimal(PRICE_SCALE)?,
        price_impact_percent: trade.price_impact()?.to_decimal(PERCENT_SCALE)?,
        slippage_tolerance_percent: slippage_tolerance.to_decimal(PERCENT_SCALE)?,
        minimum_amount_out: minimum_amount_out.to_exact_decimal()?,
        maximum_amount_in: maximum_amount_in.to_exact_decimal()?,
        legs,
        wrap_plan: trade.wrap_plan(),
    };

    info!(
        input = %summary.input_symbol,
        output = %summary.output_symbol,
        legs = summary.legs.len(),
        impact = %summary.price_impact_percent,
        "trade summarized"
    );
    Ok(summary)
}
