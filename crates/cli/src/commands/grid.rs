//! Grid command: place the ladder, then supervise it until interrupted.

use super::shutdown_on_ctrl_c;
use anyhow::{Context, Result};
use futures_bot_core::{ExchangeClient, PollConfig};
use futures_bot_strategy::{GridPlan, GridSupervisor};
use rust_decimal::Decimal;
use std::sync::Arc;

pub async fn run(
    client: Arc<dyn ExchangeClient>,
    symbol: &str,
    lower_price: Decimal,
    upper_price: Decimal,
    num_grids: u32,
    quantity_per_grid: Decimal,
) -> Result<()> {
    let plan = GridPlan::new(lower_price, upper_price, num_grids, quantity_per_grid)?;

    let shutdown = shutdown_on_ctrl_c();
    let mut supervisor = GridSupervisor::new(
        client,
        symbol.to_uppercase(),
        plan,
        PollConfig::default(),
        shutdown,
    );

    supervisor
        .place_initial_orders()
        .await
        .context("placing initial grid orders")?;
    supervisor.run().await
}
