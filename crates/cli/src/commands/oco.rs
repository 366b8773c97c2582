//! Synthetic OCO command: place both exit legs, then supervise until one
//! fills or the process is interrupted.

use super::shutdown_on_ctrl_c;
use anyhow::{Context, Result};
use futures_bot_core::{ExchangeClient, PollConfig, Side};
use futures_bot_strategy::{OcoConfig, OcoSupervisor};
use rust_decimal::Decimal;
use std::sync::Arc;

pub async fn run(
    client: Arc<dyn ExchangeClient>,
    symbol: &str,
    side: Side,
    quantity: Decimal,
    take_profit_price: Decimal,
    stop_loss_price: Decimal,
) -> Result<()> {
    let config = OcoConfig {
        symbol: symbol.to_uppercase(),
        entry_side: side,
        quantity,
        take_profit_price,
        stop_loss_price,
    };
    config.validate()?;

    let shutdown = shutdown_on_ctrl_c();
    let mut supervisor = OcoSupervisor::new(client, config, PollConfig::oco(), shutdown);

    supervisor
        .place_legs()
        .await
        .context("placing OCO legs")?;
    supervisor.run().await
}
