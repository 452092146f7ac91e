/*
 * Aggregating quoted legs across protocols into one trade
 */

mod common;

use std::sync::Arc;

use common::*;
use confluence::config::QuotingConfig;
use confluence::{
    trade_comparator, Leg, Protocol, ProtocolGroups, Swap, SwapRoute, Trade, TradeType,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[tokio::test]
async fn single_constant_product_leg() {
    init_tracing();
    let r = route(vec![pair(usdc(), dai(), 100_000, 100_000)], usdc(), dai());
    let trade = Trade::exact_in(r.clone(), amount(usdc(), 1_000)).await.unwrap();

    assert_eq!(trade.swaps().len(), 1);
    assert_eq!(trade.routes().len(), 1);
    assert_eq!(trade.input_amount(), &amount(usdc(), 1_000));
    assert_eq!(trade.output_amount(), &amount(dai(), 987));
    assert!(**trade.route().unwrap() == *r);
}

#[tokio::test]
async fn exact_output_single_leg_keeps_requested_output() {
    let r = route(vec![pair(usdc(), dai(), 100_000, 100_000)], usdc(), dai());
    let trade = Trade::exact_out(r, amount(dai(), 987)).await.unwrap();
    assert_eq!(trade.trade_type(), TradeType::ExactOutput);
    assert_eq!(trade.output_amount(), &amount(dai(), 987));
    assert!(trade.input_amount().raw() > &raw(987));
}

#[tokio::test]
async fn legs_from_every_protocol_sum_exactly() {
    init_tracing();
    let mut legs = ProtocolGroups::default();
    legs.v4.push(Leg::new(
        route(vec![singleton(usdc().into(), dai().into(), 500, 1_000_000_000)], usdc(), dai()),
        amount(usdc(), 400),
    ));
    legs.mixed.push(Leg::new(
        route(
            vec![
                pair(usdc(), wbtc(), 1_000_000, 1_000_000),
                concentrated(wbtc(), dai(), 3_000, 1_000_000_000),
            ],
            usdc(),
            dai(),
        ),
        amount(usdc(), 300),
    ));
    legs.v3.push(Leg::new(
        route(vec![concentrated(usdc(), dai(), 500, 1_000_000_000)], usdc(), dai()),
        amount(usdc(), 200),
    ));
    legs.v2.push(Leg::new(
        route(vec![pair(usdc(), dai(), 1_000_000, 1_000_000)], usdc(), dai()),
        amount(usdc(), 100),
    ));

    let trade = Trade::from_routes(legs, TradeType::ExactInput).await.unwrap();

    let protocols: Vec<Protocol> = trade.swaps().iter().map(|s| s.route.protocol()).collect();
    assert_eq!(protocols, vec![Protocol::V2, Protocol::V3, Protocol::Mixed, Protocol::V4]);

    let total_in = trade
        .swaps()
        .iter()
        .fold(raw(0), |acc, s| acc + s.input_amount.raw());
    let total_out = trade
        .swaps()
        .iter()
        .fold(raw(0), |acc, s| acc + s.output_amount.raw());
    assert_eq!(trade.input_amount().raw(), &total_in);
    assert_eq!(trade.input_amount().raw(), &raw(1_000));
    assert_eq!(trade.output_amount().raw(), &total_out);
    assert_eq!(trade.route().unwrap_err().code(), "MULTIPLE_ROUTES");
}

#[tokio::test]
async fn concurrency_limit_does_not_change_the_result() {
    let build = || {
        let mut legs = ProtocolGroups::default();
        legs.v2.push(Leg::new(
            route(vec![pair(usdc(), dai(), 1_000_000, 1_000_000)], usdc(), dai()),
            amount(usdc(), 100),
        ));
        legs.v3.push(Leg::new(
            route(vec![concentrated(usdc(), dai(), 500, 1_000_000_000)], usdc(), dai()),
            amount(usdc(), 200),
        ));
        legs
    };
    let serial = Trade::from_routes_with_config(
        build(),
        TradeType::ExactInput,
        &QuotingConfig { max_concurrent_legs: 1 },
    )
    .await
    .unwrap();
    let wide = Trade::from_routes(build(), TradeType::ExactInput).await.unwrap();
    assert_eq!(serial.output_amount(), wide.output_amount());
}

fn swap_of(r: Arc<dyn SwapRoute>, input: u64, output: u64) -> Swap {
    let (i, o) = (r.input().clone(), r.output().clone());
    Swap::new(r, amount(i, input), amount(o, output))
}

/// usdc -> wbtc -> weth -> usdc -> dai, ending in the direct usdc/dai pair.
fn detour_through_direct_pair() -> Arc<dyn SwapRoute> {
    route(
        vec![
            pair(usdc(), wbtc(), 1_000_000, 1_000_000),
            pair(wbtc(), weth(), 1_000_000, 1_000_000),
            pair(weth(), usdc(), 1_000_000, 1_000_000),
            pair(usdc(), dai(), 1_000_000, 1_000_000),
        ],
        usdc(),
        dai(),
    )
}

#[rstest]
#[case::same_group(Protocol::V2)]
#[case::other_group(Protocol::V4)]
fn reused_pool_fails_aggregation(#[case] group: Protocol) {
    let direct = route(vec![pair(usdc(), dai(), 1_000_000, 1_000_000)], usdc(), dai());
    let mut swaps = ProtocolGroups::default();
    swaps.v2.push(swap_of(direct, 100, 98));
    swaps.push(group, swap_of(detour_through_direct_pair(), 100, 96));

    let err = Trade::new(swaps, TradeType::ExactInput).unwrap_err();
    assert_eq!(err.code(), "POOLS_DUPLICATED");
}

fn singleton_direct() -> Arc<dyn SwapRoute> {
    route(vec![singleton(usdc().into(), dai().into(), 500, 1_000_000_000)], usdc(), dai())
}

fn concentrated_direct() -> Arc<dyn SwapRoute> {
    route(vec![concentrated(usdc(), dai(), 500, 1_000_000_000)], usdc(), dai())
}

/// usdc -> wbtc -> usdc -> dai, ending in the direct concentrated pool.
fn mixed_through_concentrated() -> Arc<dyn SwapRoute> {
    route(
        vec![
            pair(usdc(), wbtc(), 1_000_000, 1_000_000),
            concentrated(wbtc(), usdc(), 3_000, 1_000_000_000),
            concentrated(usdc(), dai(), 500, 1_000_000_000),
        ],
        usdc(),
        dai(),
    )
}

#[rstest]
#[case::singleton_in_two_v4_legs(
    Protocol::V4,
    singleton_direct(),
    Protocol::V4,
    singleton_direct()
)]
#[case::concentrated_in_v3_and_mixed(
    Protocol::V3,
    concentrated_direct(),
    Protocol::Mixed,
    mixed_through_concentrated()
)]
fn reused_pool_fails_for_every_pool_kind(
    #[case] first_group: Protocol,
    #[case] first: Arc<dyn SwapRoute>,
    #[case] second_group: Protocol,
    #[case] second: Arc<dyn SwapRoute>,
) {
    assert_eq!(second.protocol(), second_group);
    let mut swaps = ProtocolGroups::default();
    swaps.push(first_group, swap_of(first, 100, 98));
    swaps.push(second_group, swap_of(second, 100, 97));

    let err = Trade::new(swaps, TradeType::ExactInput).unwrap_err();
    assert_eq!(err.code(), "POOLS_DUPLICATED");
}

#[tokio::test]
async fn reused_singleton_fails_after_quoting() {
    let mut legs = ProtocolGroups::default();
    legs.v4.push(Leg::new(singleton_direct(), amount(usdc(), 100)));
    legs.v4.push(Leg::new(singleton_direct(), amount(usdc(), 200)));
    let err = Trade::from_routes(legs, TradeType::ExactInput).await.unwrap_err();
    assert_eq!(err.code(), "POOLS_DUPLICATED");
}

#[tokio::test]
async fn reused_pool_fails_after_quoting() {
    let mut legs = ProtocolGroups::default();
    legs.v2.push(Leg::new(
        route(vec![pair(usdc(), dai(), 1_000_000, 1_000_000)], usdc(), dai()),
        amount(usdc(), 100),
    ));
    legs.v2.push(Leg::new(detour_through_direct_pair(), amount(usdc(), 100)));
    let err = Trade::from_routes(legs, TradeType::ExactInput).await.unwrap_err();
    assert_eq!(err.code(), "POOLS_DUPLICATED");
}

#[tokio::test]
async fn mixed_route_cannot_be_exact_output() {
    let mixed = route(
        vec![
            pair(usdc(), wbtc(), 1_000_000, 1_000_000),
            concentrated(wbtc(), dai(), 3_000, 1_000_000_000),
        ],
        usdc(),
        dai(),
    );
    assert_eq!(mixed.protocol(), Protocol::Mixed);

    let err = Trade::create_unchecked_trade(
        mixed.clone(),
        amount(usdc(), 10),
        amount(dai(), 9),
        TradeType::ExactOutput,
    )
    .unwrap_err();
    assert_eq!(err.code(), "TRADE_TYPE");

    let mut legs = ProtocolGroups::default();
    legs.mixed.push(Leg::new(mixed, amount(dai(), 10)));
    let err = Trade::from_routes(legs, TradeType::ExactOutput).await.unwrap_err();
    assert_eq!(err.code(), "TRADE_TYPE");
}

#[tokio::test]
async fn mismatched_amount_currency_fails_quoting() {
    let r = route(vec![pair(usdc(), dai(), 100_000, 100_000)], usdc(), dai());
    let err = Trade::from_route(r.clone(), amount(dai(), 10), TradeType::ExactInput)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INPUT");
    let err = Trade::from_route(r, amount(usdc(), 10), TradeType::ExactOutput)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "OUTPUT");
}

#[tokio::test]
async fn native_and_wrapped_inputs_do_not_mix() {
    let mut legs = ProtocolGroups::default();
    legs.v2.push(Leg::new(
        route(vec![pair(weth(), dai(), 1_000_000, 1_000_000)], eth(), dai()),
        amount(eth(), 10),
    ));
    legs.v3.push(Leg::new(
        route(vec![concentrated(weth(), dai(), 500, 1_000_000_000)], weth(), dai()),
        amount(weth(), 10),
    ));
    let err = Trade::from_routes(legs, TradeType::ExactInput).await.unwrap_err();
    assert_eq!(err.code(), "INPUT_CURRENCY_MATCH");
}

#[tokio::test]
async fn insufficient_liquidity_aborts_the_batch() {
    let mut legs = ProtocolGroups::default();
    legs.v2.push(Leg::new(
        route(vec![pair(usdc(), dai(), 1_000, 1_000)], usdc(), dai()),
        amount(dai(), 5_000),
    ));
    legs.v3.push(Leg::new(
        route(vec![concentrated(usdc(), dai(), 500, 1_000_000_000)], usdc(), dai()),
        amount(dai(), 10),
    ));
    let err = Trade::from_routes(legs, TradeType::ExactOutput).await.unwrap_err();
    assert_eq!(err.code(), "INSUFFICIENT_LIQUIDITY");
}

#[tokio::test]
async fn comparator_ranks_by_output_then_input_then_hops() {
    let direct = Trade::create_unchecked_trade(
        route(vec![pair(usdc(), dai(), 1, 1)], usdc(), dai()),
        amount(usdc(), 100),
        amount(dai(), 95),
        TradeType::ExactInput,
    )
    .unwrap();
    let hopping = Trade::create_unchecked_trade(
        route(vec![pair(usdc(), wbtc(), 1, 1), pair(wbtc(), dai(), 1, 1)], usdc(), dai()),
        amount(usdc(), 100),
        amount(dai(), 95),
        TradeType::ExactInput,
    )
    .unwrap();
    let better = Trade::create_unchecked_trade(
        route(vec![pair(usdc(), wbtc(), 1, 1), pair(wbtc(), dai(), 1, 1)], usdc(), dai()),
        amount(usdc(), 100),
        amount(dai(), 96),
        TradeType::ExactInput,
    )
    .unwrap();

    let mut trades = vec![&hopping, &direct, &better];
    trades.sort_by(|a, b| trade_comparator(a, b).unwrap());
    assert_eq!(trades[0].output_amount(), &amount(dai(), 96));
    assert_eq!(trades[1].swaps()[0].route.pools().len(), 1);
    assert_eq!(trades[2].swaps()[0].route.pools().len(), 2);

    let other = Trade::create_unchecked_trade(
        route(vec![pair(usdc(), wbtc(), 1, 1)], usdc(), wbtc()),
        amount(usdc(), 100),
        amount(wbtc(), 1),
        TradeType::ExactInput,
    )
    .unwrap();
    assert_eq!(trade_comparator(&direct, &other).unwrap_err().code(), "OUTPUT_CURRENCY_MATCH");
}
