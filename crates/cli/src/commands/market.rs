//! One-shot market order: place and report, no follow-up monitoring.

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
) -> Result<()> {
    if quantity <= Decimal::ZERO {
        return Err(ConfigError::InvalidQuantity(quantity).into());
    }
    let symbol = symbol.to_uppercase();
    info!(%symbol, %side, %quantity, "placing market order");

    let order = client
        .place_order(&OrderRequest::market(symbol, side, quantity))
        .await
        .context("placing market order")?;

    info!(
        order_id = %order.order_id,
        status = ?order.status,
        price = ?order.price,
        "order placed"
    );
    Ok(())
}
