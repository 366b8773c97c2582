//! One-shot stop-limit order: rests as a limit order once the trigger trades.

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
    stop_price: Decimal,
    limit_price: Decimal,
) -> Result<()> {
    if quantity <= Decimal::ZERO {
        return Err(ConfigError::InvalidQuantity(quantity).into());
    }
    if stop_price <= Decimal::ZERO {
        return Err(ConfigError::InvalidPrice(stop_price).into());
    }
    if limit_price <= Decimal::ZERO {
        return Err(ConfigError::InvalidPrice(limit_price).into());
    }
    let symbol = symbol.to_uppercase();
    info!(%symbol, %side, %quantity, %stop_price, %limit_price, "placing stop-limit order");

    let order = client
        .place_order(&OrderRequest::stop_limit(
            symbol,
            side,
            quantity,
            stop_price,
            limit_price,
        ))
        .await
        .context("placing stop-limit order")?;

    info!(
        order_id = %order.order_id,
        status = ?order.status,
        stop_price = ?order.stop_price,
        "order placed"
    );
    Ok(())
}
