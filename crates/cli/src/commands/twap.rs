//! TWAP command: slice a parent quantity into timed market orders.

use super::shutdown_on_ctrl_c;
use anyhow::Result;
use futures_bot_core::{ConfigError, ExchangeClient, PollConfig, Side};
use futures_bot_strategy::{TwapConfig, TwapExecutor};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

pub async fn run(
    client: Arc<dyn ExchangeClient>,
    symbol: &str,
    side: Side,
    total_quantity: Decimal,
    duration_minutes: f64,
) -> Result<()> {
    if !duration_minutes.is_finite() || duration_minutes <= 0.0 {
        return Err(ConfigError::InvalidDuration.into());
    }
    let duration = Duration::from_secs_f64(duration_minutes * 60.0);
    let config = TwapConfig::new(symbol.to_uppercase(), side, total_quantity, duration)?;

    let shutdown = shutdown_on_ctrl_c();
    let mut executor = TwapExecutor::new(client, config, PollConfig::default(), shutdown);
    executor.run().await?;
    Ok(())
}
