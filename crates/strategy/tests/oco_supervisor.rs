//! Synthetic OCO state machine scenarios: sibling cancellation, the
//! double-fill race, cancel failures, and startup unwinding.

mod common;

use common::{ExchangeErrorKind, MockExchange};
use futures_bot_core::{ExchangeClient, OrderStatus, PollConfig, Side};
use futures_bot_strategy::{shutdown_channel, OcoConfig, OcoState, OcoSupervisor};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

fn oco_supervisor(client: Arc<dyn ExchangeClient>) -> OcoSupervisor {
    let config = OcoConfig {
        symbol: "ABCUSD".to_string(),
        entry_side: Side::Buy,
        quantity: dec!(1),
        take_profit_price: dec!(120),
        stop_loss_price: dec!(95),
    };
    let (_tx, rx) = shutdown_channel();
    OcoSupervisor::new(client, config, PollConfig::oco(), rx)
}

fn mock() -> Arc<MockExchange> {
    Arc::new(MockExchange::new(Decimal::from(100)))
}

#[tokio::test]
async fn both_legs_rest_after_startup() {
    let mock = mock();
    let mut supervisor = oco_supervisor(mock.clone());

    supervisor.place_legs().await.unwrap();

    assert_eq!(supervisor.state(), OcoState::Active);
    assert_eq!(mock.open_order_count(), 2);
    // Nothing filled yet: a poll changes nothing and cancels nothing.
    assert_eq!(supervisor.poll_once().await.unwrap(), OcoState::Active);
    assert!(mock.cancel_calls().is_empty());
}

#[tokio::test]
async fn take_profit_fill_cancels_stop_loss() {
    let mock = mock();
    let mut supervisor = oco_supervisor(mock.clone());
    supervisor.place_legs().await.unwrap();

    // Leg ids are assigned in placement order: tp = "1", sl = "2".
    mock.set_status("1", OrderStatus::Filled);
    let state = supervisor.poll_once().await.unwrap();

    assert_eq!(state, OcoState::Done);
    assert_eq!(mock.cancel_calls(), vec!["2".to_string()]);
}

#[tokio::test]
async fn stop_loss_fill_cancels_take_profit() {
    let mock = mock();
    let mut supervisor = oco_supervisor(mock.clone());
    supervisor.place_legs().await.unwrap();

    mock.set_status("2", OrderStatus::Filled);
    let state = supervisor.poll_once().await.unwrap();

    assert_eq!(state, OcoState::Done);
    assert_eq!(mock.cancel_calls(), vec!["1".to_string()]);
}

#[tokio::test]
async fn double_fill_race_cancels_nothing() {
    let mock = mock();
    let mut supervisor = oco_supervisor(mock.clone());
    supervisor.place_legs().await.unwrap();

    // Both legs filled between two polls: the known race surface.
    mock.set_status("1", OrderStatus::Filled);
    mock.set_status("2", OrderStatus::Filled);
    let state = supervisor.poll_once().await.unwrap();

    assert_eq!(state, OcoState::Done);
    assert!(mock.cancel_calls().is_empty());
}

#[tokio::test]
async fn failed_sibling_cancel_still_retires_the_pair() {
    let mock = mock();
    let mut supervisor = oco_supervisor(mock.clone());
    supervisor.place_legs().await.unwrap();

    mock.set_status("1", OrderStatus::Filled);
    mock.fail_cancels();
    let state = supervisor.poll_once().await.unwrap();

    assert_eq!(state, OcoState::Done);
    assert_eq!(mock.cancel_calls().len(), 1);
}

#[tokio::test]
async fn done_pair_issues_no_further_exchange_calls() {
    let mock = mock();
    let mut supervisor = oco_supervisor(mock.clone());
    supervisor.place_legs().await.unwrap();

    mock.set_status("1", OrderStatus::Filled);
    supervisor.poll_once().await.unwrap();
    let status_calls = mock.get_order_calls();
    let cancels = mock.cancel_calls().len();

    for _ in 0..3 {
        assert_eq!(supervisor.poll_once().await.unwrap(), OcoState::Done);
    }
    assert_eq!(mock.get_order_calls(), status_calls);
    assert_eq!(mock.cancel_calls().len(), cancels);
}

#[tokio::test]
async fn externally_cancelled_leg_retires_the_pair() {
    let mock = mock();
    let mut supervisor = oco_supervisor(mock.clone());
    supervisor.place_legs().await.unwrap();

    mock.set_status("2", OrderStatus::Cancelled);
    let state = supervisor.poll_once().await.unwrap();

    assert_eq!(state, OcoState::Done);
    // The surviving take-profit leg is pulled.
    assert_eq!(mock.cancel_calls(), vec!["1".to_string()]);
}

#[tokio::test]
async fn rejected_second_leg_unwinds_the_first() {
    let mock = mock();
    let mut supervisor = oco_supervisor(mock.clone());

    // Take-profit placement succeeds, stop-loss is rejected at startup.
    mock.fail_place_at(2, ExchangeErrorKind::Rejection);
    let err = supervisor.place_legs().await.unwrap_err();

    assert!(!err.is_transient());
    // The already-placed take-profit leg was cancelled best-effort.
    assert_eq!(mock.cancel_calls(), vec!["1".to_string()]);
    assert_eq!(mock.open_order_count(), 0);
}
