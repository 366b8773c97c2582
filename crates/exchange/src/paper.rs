//! In-process paper venue implementing the order-entry client.
//!
//! Orders go through the same lifecycle a live venue would report (open,
//! filled, cancelled) but every fill is simulated locally. Tests and the
//! CLI's dry runs drive fills either by moving the mark price or by filling
//! an order directly.

use async_trait::async_trait;
use chrono::Utc;
use futures_bot_core::{
    ExchangeClient, ExchangeError, Order, OrderRequest, OrderStatus, OrderType, Side,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::info;

/// Simulated exchange holding a single mark price and an order book of
/// resting orders.
///
/// # Safety
///
/// This connector makes **zero network calls**. It is impossible to place a
/// real order through it.
pub struct PaperExchange {
    inner: Mutex<Inner>,
}

struct Inner {
    next_id: u64,
    mark_price: Decimal,
    orders: HashMap<String, Order>,
}

impl PaperExchange {
    /// Creates a paper venue with the given starting mark price.
    #[must_use]
    pub fn new(mark_price: Decimal) -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 1,
                mark_price,
                orders: HashMap::new(),
            }),
        }
    }

    /// Moves the mark price, filling any limit order whose price is crossed
    /// and triggering any stop order whose trigger is touched.
    ///
    /// Buy limits fill when the mark trades at or below their price, sell
    /// limits at or above. Buy stops trigger at or above their trigger, sell
    /// stops at or below. A triggered stop-market fills at the new mark; a
    /// triggered stop-limit fills at its limit price (resting after trigger
    /// is not modelled).
    pub async fn set_price(&self, price: Decimal) {
        let mut inner = self.inner.lock().await;
        inner.mark_price = price;
        for order in inner.orders.values_mut() {
            if order.status != OrderStatus::Open {
                continue;
            }
            let filled = match order.order_type {
                OrderType::Limit => order.price.is_some_and(|limit| match order.side {
                    Side::Buy => price <= limit,
                    Side::Sell => price >= limit,
                }),
                OrderType::StopMarket | OrderType::StopLimit => {
                    order.stop_price.is_some_and(|stop| match order.side {
                        Side::Buy => price >= stop,
                        Side::Sell => price <= stop,
                    })
                }
                OrderType::Market => false,
            };
            if filled {
                order.status = OrderStatus::Filled;
                if order.order_type == OrderType::StopMarket {
                    order.price = Some(price);
                }
                order.updated_at = Utc::now();
                info!(order_id = %order.order_id, side = %order.side, "paper order filled");
            }
        }
    }

    /// Marks one order filled directly, regardless of the mark price.
    ///
    /// Returns false if the order is unknown or no longer open.
    pub async fn fill_order(&self, order_id: &str) -> bool {
        let mut inner = self.inner.lock().await;
        match inner.orders.get_mut(order_id) {
            Some(order) if order.status == OrderStatus::Open => {
                order.status = OrderStatus::Filled;
                order.updated_at = Utc::now();
                true
            }
            _ => false,
        }
    }

    /// Number of orders the venue has ever accepted.
    pub async fn order_count(&self) -> usize {
        self.inner.lock().await.orders.len()
    }
}

#[async_trait]
impl ExchangeClient for PaperExchange {
    async fn place_order(&self, request: &OrderRequest) -> Result<Order, ExchangeError> {
        if request.quantity <= Decimal::ZERO {
            return Err(ExchangeError::Api {
                code: -1013,
                message: "Invalid quantity.".to_string(),
            });
        }
        if request.price.is_some_and(|p| p <= Decimal::ZERO) {
            return Err(ExchangeError::Api {
                code: -1013,
                message: "Invalid price.".to_string(),
            });
        }

        let mut inner = self.inner.lock().await;
        let order_id = inner.next_id.to_string();
        inner.next_id += 1;

        let status = if request.order_type == OrderType::Market {
            OrderStatus::Filled
        } else {
            OrderStatus::Open
        };
        let price = if request.order_type == OrderType::Market {
            Some(inner.mark_price)
        } else {
            request.price
        };

        let order = Order {
            order_id: order_id.clone(),
            symbol: request.symbol.clone(),
            side: request.side,
            order_type: request.order_type,
            quantity: request.quantity,
            price,
            stop_price: request.stop_price,
            status,
            updated_at: Utc::now(),
        };
        inner.orders.insert(order_id, order.clone());
        info!(
            order_id = %order.order_id,
            symbol = %order.symbol,
            side = %order.side,
            order_type = %order.order_type,
            "paper order accepted"
        );
        Ok(order)
    }

    async fn cancel_order(&self, _symbol: &str, order_id: &str) -> Result<(), ExchangeError> {
        let mut inner = self.inner.lock().await;
        match inner.orders.get_mut(order_id) {
            Some(order) if order.status == OrderStatus::Open => {
                order.status = OrderStatus::Cancelled;
                order.updated_at = Utc::now();
                info!(order_id, "paper order cancelled");
                Ok(())
            }
            // Already filled/cancelled or never existed: same rejection a
            // live venue gives when a cancel races a fill.
            _ => Err(ExchangeError::Api {
                code: -2011,
                message: "Unknown order sent.".to_string(),
            }),
        }
    }

    async fn get_order(&self, _symbol: &str, order_id: &str) -> Result<Order, ExchangeError> {
        let inner = self.inner.lock().await;
        inner
            .orders
            .get(order_id)
            .cloned()
            .ok_or_else(|| ExchangeError::Api {
                code: -2013,
                message: "Order does not exist.".to_string(),
            })
    }

    async fn get_open_orders(&self, symbol: &str) -> Result<Vec<Order>, ExchangeError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .orders
            .values()
            .filter(|o| o.symbol == symbol && o.is_open())
            .cloned()
            .collect())
    }

    async fn get_price(&self, _symbol: &str) -> Result<Decimal, ExchangeError> {
        Ok(self.inner.lock().await.mark_price)
    }
}
