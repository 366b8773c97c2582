//! One-shot good-till-cancel limit order.

use anyhow::{Context, Result};
use futures_bot_core::{ConfigError, ExchangeClient, OrderRequest, Side};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

pub async fn run(
    client: Arc<dyn ExchangeClient>,
    symbol: &str,
    side: Side,
    quantity: Decimal,
    price: Decimal,
) -> Result<()> {
    if quantity <= Decimal::ZERO {
        return Err(ConfigError::InvalidQuantity(quantity).into());
    }
    if price <= Decimal::ZERO {
        return Err(ConfigError::InvalidPrice(price).into());
    }
    let symbol = symbol.to_uppercase();
    info!(%symbol, %side, %quantity, %price, "placing limit order");

    let order = client
        .place_order(&OrderRequest::limit(symbol, side, quantity, price))
        .await
        .context("placing limit order")?;

    info!(
        order_id = %order.order_id,
        status = ?order.status,
        "order placed, resting until filled or cancelled"
    );
    Ok(())
}
