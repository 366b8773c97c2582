//! The order-entry interface every connector must provide.
//!
//! Transport, authentication, signing, and rate limiting live behind this
//! boundary; the strategies only ever see these five calls.

use crate::error::ExchangeError;
use crate::order::{Order, OrderRequest};
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Order-entry capability of a derivatives exchange.
///
/// `get_open_orders` is the authoritative and cheap view used by the
/// reconciliation loops; `get_order` is only fetched for orders that have
/// left the open set, to learn their final state.
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    /// Submits a new order; the returned [`Order`] carries the
    /// exchange-assigned id.
    async fn place_order(&self, request: &OrderRequest) -> Result<Order, ExchangeError>;

    /// Cancels a resting order. Fails with an API error if the order has
    /// already filled or been cancelled.
    async fn cancel_order(&self, symbol: &str, order_id: &str) -> Result<(), ExchangeError>;

    /// Fetches the current state of a single order.
    async fn get_order(&self, symbol: &str, order_id: &str) -> Result<Order, ExchangeError>;

    /// Fetches all orders currently open for `symbol`.
    async fn get_open_orders(&self, symbol: &str) -> Result<Vec<Order>, ExchangeError>;

    /// Fetches the current market price for `symbol`.
    async fn get_price(&self, symbol: &str) -> Result<Decimal, ExchangeError>;
}
