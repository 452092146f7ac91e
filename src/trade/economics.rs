/*
 * Trade economics: execution price, price impact and slippage bounds
 */

use tracing::debug;

use super::Trade;
use crate::currency::{Currency, CurrencyAmount, Price};
use crate::dex::after_fee;
use crate::math::{Fraction, Percent, Rounding};
use crate::models::{ConfluenceError, Result, TradeType};

impl Trade {
    /// Average price realized by the whole trade, in output per input.
    pub fn execution_price(&self) -> Result<&Price> {
        self.execution_price
            .get_or_try_init(|| Price::from_amounts(&self.input_amount, &self.output_amount))
    }

    /// Transfer fee charged when the input currency leaves the trader.
    #[must_use]
    pub fn input_tax(&self) -> Percent {
        self.input_currency().sell_fee()
    }

    /// Transfer fee charged when the output currency reaches the trader.
    #[must_use]
    pub fn output_tax(&self) -> Percent {
        self.output_currency().buy_fee()
    }

    /// Deviation of the realized output from what the routes' mid prices promise
    /// for the same inputs. Transfer fees, including those paid between hops, are
    /// taken out of both sides so only the pools' curvature shows up.
    pub fn price_impact(&self) -> Result<&Percent> {
        self.price_impact.get_or_try_init(|| self.compute_price_impact())
    }

    fn compute_price_impact(&self) -> Result<Percent> {
        let one = Fraction::one();
        let output_tax = self.output_tax();
        if output_tax.as_fraction() >= &one {
            return Ok(Percent::zero());
        }
        let input_keep = after_fee(&self.input_tax());

        let mut spot = Fraction::zero();
        for swap in &self.swaps {
            let mid_price = swap.route.mid_price()?;
            let quoted = mid_price.quote_exact(&swap.input_amount)?;
            let keep = &input_keep * &hop_keep(swap.route.path());
            spot = &spot + &(&quoted * &keep);
        }
        if spot.is_zero() {
            return Ok(Percent::zero());
        }

        let pre_tax_output = self
            .output_amount
            .as_fraction()
            .checked_div(&(&one - output_tax.as_fraction()))?;
        let impact = (&spot - &pre_tax_output).checked_div(&spot)?;
        let impact = Percent::from_fraction(impact);
        debug!(legs = self.swaps.len(), %impact, "price impact computed");
        Ok(impact)
    }

    /// Least output acceptable under `slippage_tolerance`. Exact-output trades
    /// return the output unchanged.
    pub fn minimum_amount_out(&self, slippage_tolerance: &Percent) -> Result<CurrencyAmount> {
        ensure_tolerance(slippage_tolerance)?;
        match self.trade_type {
            TradeType::ExactOutput => Ok(self.output_amount.clone()),
            TradeType::ExactInput => self
                .output_amount
                .divide(&tolerance_factor(slippage_tolerance), Rounding::Down),
        }
    }

    /// Most input acceptable under `slippage_tolerance`. Exact-input trades
    /// return the input unchanged.
    pub fn maximum_amount_in(&self, slippage_tolerance: &Percent) -> Result<CurrencyAmount> {
        ensure_tolerance(slippage_tolerance)?;
        match self.trade_type {
            TradeType::ExactInput => Ok(self.input_amount.clone()),
            TradeType::ExactOutput => self
                .input_amount
                .multiply(&tolerance_factor(slippage_tolerance), Rounding::Up),
        }
    }

    /// Execution price with the slippage-adjusted side substituted in.
    pub fn worst_execution_price(&self, slippage_tolerance: &Percent) -> Result<Price> {
        match self.trade_type {
            TradeType::ExactInput => Price::from_amounts(
                &self.input_amount,
                &self.minimum_amount_out(slippage_tolerance)?,
            ),
            TradeType::ExactOutput => Price::from_amounts(
                &self.maximum_amount_in(slippage_tolerance)?,
                &self.output_amount,
            ),
        }
    }
}

/// Share of a leg's amount left after the transfers between its pools. Every
/// intermediate currency is bought out of one pool and sold into the next.
fn hop_keep(path: &[Currency]) -> Fraction {
    let last = path.len().saturating_sub(1);
    path.iter()
        .take(last)
        .skip(1)
        .fold(Fraction::one(), |keep, currency| {
            &(&keep * &after_fee(&currency.buy_fee())) * &after_fee(&currency.sell_fee())
        })
}

fn ensure_tolerance(slippage_tolerance: &Percent) -> Result<()> {
    if slippage_tolerance.is_negative() {
        return Err(ConfluenceError::SlippageTolerance);
    }
    Ok(())
}

fn tolerance_factor(slippage_tolerance: &Percent) -> Fraction {
    &Fraction::one() + slippage_tolerance.as_fraction()
}
