//! Scripted exchange double for supervisor tests.
//!
//! Unlike the paper venue, this mock records every call and can be told to
//! fail specific operations, which is what the failure-path tests need.

use async_trait::async_trait;
use chrono::Utc;
use futures_bot_core::{
    ExchangeClient, ExchangeError, Order, OrderRequest, OrderStatus,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct State {
    next_id: u64,
    orders: HashMap<String, Order>,
    cancel_calls: Vec<String>,
    get_order_calls: usize,
    get_open_orders_calls: usize,
    fail_next_open_orders: bool,
    open_orders_delay: Option<std::time::Duration>,
    place_calls: u64,
    place_failures: HashMap<u64, ExchangeErrorKind>,
    fail_cancels: bool,
    price: Decimal,
}

/// Which error `fail_next_place` should produce.
#[derive(Clone, Copy)]
pub enum ExchangeErrorKind {
    Rejection,
    Transport,
}

pub struct MockExchange {
    state: Mutex<State>,
}

impl MockExchange {
    pub fn new(price: Decimal) -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 1,
                price,
                ..State::default()
            }),
        }
    }

    pub fn set_status(&self, order_id: &str, status: OrderStatus) {
        let mut state = self.state.lock().unwrap();
        state
            .orders
            .get_mut(order_id)
            .expect("unknown order id in test script")
            .status = status;
    }

    pub fn fail_next_open_orders(&self) {
        self.state.lock().unwrap().fail_next_open_orders = true;
    }

    /// Fails the next `place_order` call.
    pub fn fail_next_place(&self, kind: ExchangeErrorKind) {
        let mut state = self.state.lock().unwrap();
        let next = state.place_calls + 1;
        state.place_failures.insert(next, kind);
    }

    /// Fails the `nth` `place_order` call counted from now (1-based).
    pub fn fail_place_at(&self, nth: u64, kind: ExchangeErrorKind) {
        let mut state = self.state.lock().unwrap();
        let at = state.place_calls + nth;
        state.place_failures.insert(at, kind);
    }

    /// Makes the next `get_open_orders` call hang for `delay` before
    /// answering, to exercise per-call deadlines.
    pub fn delay_next_open_orders(&self, delay: std::time::Duration) {
        self.state.lock().unwrap().open_orders_delay = Some(delay);
    }

    pub fn fail_cancels(&self) {
        self.state.lock().unwrap().fail_cancels = true;
    }

    pub fn cancel_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().cancel_calls.clone()
    }

    pub fn get_order_calls(&self) -> usize {
        self.state.lock().unwrap().get_order_calls
    }

    pub fn get_open_orders_calls(&self) -> usize {
        self.state.lock().unwrap().get_open_orders_calls
    }

    pub fn open_order_count(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .orders
            .values()
            .filter(|o| o.is_open())
            .count()
    }
}

#[async_trait]
impl ExchangeClient for MockExchange {
    async fn place_order(&self, request: &OrderRequest) -> Result<Order, ExchangeError> {
        let mut state = self.state.lock().unwrap();
        state.place_calls += 1;
        let call = state.place_calls;
        if let Some(kind) = state.place_failures.remove(&call) {
            return Err(match kind {
                ExchangeErrorKind::Rejection => ExchangeError::Api {
                    code: -1013,
                    message: "Filter failure: PRICE_FILTER".to_string(),
                },
                ExchangeErrorKind::Transport => {
                    ExchangeError::Transport("connection reset".to_string())
                }
            });
        }
        let order_id = state.next_id.to_string();
        state.next_id += 1;
        let order = Order {
            order_id: order_id.clone(),
            symbol: request.symbol.clone(),
            side: request.side,
            order_type: request.order_type,
            quantity: request.quantity,
            price: request.price,
            stop_price: request.stop_price,
            status: OrderStatus::Open,
            updated_at: Utc::now(),
        };
        state.orders.insert(order_id, order.clone());
        Ok(order)
    }

    async fn cancel_order(&self, _symbol: &str, order_id: &str) -> Result<(), ExchangeError> {
        let mut state = self.state.lock().unwrap();
        state.cancel_calls.push(order_id.to_string());
        if state.fail_cancels {
            return Err(ExchangeError::Api {
                code: -2011,
                message: "Unknown order sent.".to_string(),
            });
        }
        if let Some(order) = state.orders.get_mut(order_id) {
            order.status = OrderStatus::Cancelled;
        }
        Ok(())
    }

    async fn get_order(&self, _symbol: &str, order_id: &str) -> Result<Order, ExchangeError> {
        let mut state = self.state.lock().unwrap();
        state.get_order_calls += 1;
        state
            .orders
            .get(order_id)
            .cloned()
            .ok_or_else(|| ExchangeError::Api {
                code: -2013,
                message: "Order does not exist.".to_string(),
            })
    }

    async fn get_open_orders(&self, symbol: &str) -> Result<Vec<Order>, ExchangeError> {
        // The lock is not held across the simulated latency.
        let delay = self.state.lock().unwrap().open_orders_delay.take();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state.lock().unwrap();
        state.get_open_orders_calls += 1;
        if state.fail_next_open_orders {
            state.fail_next_open_orders = false;
            return Err(ExchangeError::Transport("connection reset".to_string()));
        }
        Ok(state
            .orders
            .values()
            .filter(|o| o.symbol == symbol && o.is_open())
            .cloned()
            .collect())
    }

    async fn get_price(&self, _symbol: &str) -> Result<Decimal, ExchangeError> {
        Ok(self.state.lock().unwrap().price)
    }
}
