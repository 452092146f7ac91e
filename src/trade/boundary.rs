/*
 * Native/wrapped boundary classification for the calldata layer
 */

use std::sync::Arc;

use super::Trade;
use crate::currency::{Currency, Token};
use crate::models::WrapPlan;
use crate::route::SwapRoute;

impl Trade {
    /// Routes whose first pool takes the native currency.
    #[must_use]
    pub fn native_input_routes(&self) -> Vec<Arc<dyn SwapRoute>> {
        self.routes_where(|route| route.path_input().is_native())
    }

    /// Routes whose first pool takes the wrapped native token. Only populated
    /// when the trade also enters some pool natively.
    #[must_use]
    pub fn weth_input_routes(&self) -> Vec<Arc<dyn SwapRoute>> {
        if !self.swaps.iter().any(|swap| swap.route.path_input().is_native()) {
            return Vec::new();
        }
        let wrapped = self.input_currency().wrapped().clone();
        self.routes_where(|route| is_wrapped(route.path_input(), &wrapped))
    }

    /// Routes whose last pool pays out the native currency.
    #[must_use]
    pub fn native_output_routes(&self) -> Vec<Arc<dyn SwapRoute>> {
        self.routes_where(|route| route.path_output().is_native())
    }

    /// Routes whose last pool pays out the wrapped native token. Only populated
    /// when some other route pays out natively.
    #[must_use]
    pub fn weth_output_routes(&self) -> Vec<Arc<dyn SwapRoute>> {
        if !self.swaps.iter().any(|swap| swap.route.path_output().is_native()) {
            return Vec::new();
        }
        let wrapped = self.output_currency().wrapped().clone();
        self.routes_where(|route| is_wrapped(route.path_output(), &wrapped))
    }

    /// Wraps needed before entry: the trader pays native, the pool wants the token.
    #[must_use]
    pub fn number_of_input_wraps(&self) -> usize {
        if !self.input_currency().is_native() {
            return 0;
        }
        self.count_where(|route| !route.path_input().is_native())
    }

    /// Unwraps needed before entry: the trader pays the token, the pool wants native.
    #[must_use]
    pub fn number_of_input_unwraps(&self) -> usize {
        if self.input_currency().is_native() {
            return 0;
        }
        self.count_where(|route| route.path_input().is_native())
    }

    /// Wraps needed after exit: the pool pays native, the trader wants the token.
    #[must_use]
    pub fn number_of_output_wraps(&self) -> usize {
        if self.output_currency().is_native() {
            return 0;
        }
        self.count_where(|route| route.path_output().is_native())
    }

    /// Unwraps needed after exit: the pool pays the token, the trader wants native.
    #[must_use]
    pub fn number_of_output_unwraps(&self) -> usize {
        if !self.output_currency().is_native() {
            return 0;
        }
        self.count_where(|route| !route.path_output().is_native())
    }

    #[must_use]
    pub fn wrap_plan(&self) -> WrapPlan {
        WrapPlan {
            input_wraps: self.number_of_input_wraps(),
            input_unwraps: self.number_of_input_unwraps(),
            output_wraps: self.number_of_output_wraps(),
            output_unwraps: self.number_of_output_unwraps(),
        }
    }

    fn routes_where(&self, pred: impl Fn(&dyn SwapRoute) -> bool) -> Vec<Arc<dyn SwapRoute>> {
        self.swaps
            .iter()
            .filter(|swap| pred(swap.route.as_ref()))
            .map(|swap| swap.route.clone())
            .collect()
    }

    fn count_where(&self, pred: impl Fn(&dyn SwapRoute) -> bool) -> usize {
        self.swaps.iter().filter(|swap| pred(swap.route.as_ref())).count()
    }
}

fn is_wrapped(currency: &Currency, wrapped: &Token) -> bool {
    currency.as_token() == Some(wrapped)
}
