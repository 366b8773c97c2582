//! Time-weighted slicing: a parent quantity split into equal market orders
//! spread evenly across a duration. No resting orders, so nothing to
//! reconcile — each slice is placed and forgotten.

use crate::with_call_timeout;
use anyhow::Result;
use futures_bot_core::{
    ConfigError, ExchangeClient, OrderRequest, PollConfig, Side,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};

/// Default number of sub-orders a parent order is sliced into.
pub const DEFAULT_SLICES: u32 = 10;

/// Parameters of one TWAP execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwapConfig {
    pub symbol: String,
    pub side: Side,
    pub total_quantity: Decimal,
    pub duration: Duration,
    pub slices: u32,
}

impl TwapConfig {
    /// Builds a config with the default slice count.
    ///
    /// # Errors
    /// Rejects a non-positive total quantity or a zero duration.
    pub fn new(
        symbol: impl Into<String>,
        side: Side,
        total_quantity: Decimal,
        duration: Duration,
    ) -> Result<Self, ConfigError> {
        Self::with_slices(symbol, side, total_quantity, duration, DEFAULT_SLICES)
    }

    /// Builds a config with an explicit slice count.
    ///
    /// # Errors
    /// Rejects a non-positive total quantity, a zero duration, or zero
    /// slices.
    pub fn with_slices(
        symbol: impl Into<String>,
        side: Side,
        total_quantity: Decimal,
        duration: Duration,
        slices: u32,
    ) -> Result<Self, ConfigError> {
        if total_quantity <= Decimal::ZERO {
            return Err(ConfigError::InvalidQuantity(total_quantity));
        }
        if duration.is_zero() {
            return Err(ConfigError::InvalidDuration);
        }
        if slices == 0 {
            return Err(ConfigError::InvalidSliceCount(slices));
        }
        Ok(Self {
            symbol: symbol.into(),
            side,
            total_quantity,
            duration,
            slices,
        })
    }

    /// Quantity of each sub-order.
    #[must_use]
    pub fn slice_quantity(&self) -> Decimal {
        self.total_quantity / Decimal::from(self.slices)
    }

    /// Delay between consecutive sub-orders.
    #[must_use]
    pub fn slice_delay(&self) -> Duration {
        self.duration / self.slices
    }
}

/// Places the slices of one TWAP parent order on schedule.
pub struct TwapExecutor {
    client: Arc<dyn ExchangeClient>,
    config: TwapConfig,
    poll: PollConfig,
    shutdown: watch::Receiver<bool>,
}

impl TwapExecutor {
    #[must_use]
    pub fn new(
        client: Arc<dyn ExchangeClient>,
        config: TwapConfig,
        poll: PollConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            client,
            config,
            poll,
            shutdown,
        }
    }

    /// Works through the slice schedule, sleeping between placements.
    ///
    /// A failed sub-order is logged and the schedule continues — the
    /// executor is designed to run unattended and degrade rather than
    /// abort. Returns the number of slices successfully placed.
    ///
    /// # Errors
    /// Never fails after startup; the `Result` mirrors the other
    /// strategies' entry points.
    pub async fn run(&mut self) -> Result<u32> {
        let slice_quantity = self.config.slice_quantity();
        let delay = self.config.slice_delay();
        info!(
            symbol = %self.config.symbol,
            side = %self.config.side,
            total_quantity = %self.config.total_quantity,
            slices = self.config.slices,
            slice_quantity = %slice_quantity,
            delay_secs = delay.as_secs_f64(),
            "starting TWAP execution"
        );

        let mut placed = 0;
        for slice in 1..=self.config.slices {
            info!(slice, of = self.config.slices, "placing TWAP sub-order");
            let request = OrderRequest::market(
                self.config.symbol.clone(),
                self.config.side,
                slice_quantity,
            );
            match with_call_timeout(self.poll.call_timeout(), self.client.place_order(&request))
                .await
            {
                Ok(order) => {
                    placed += 1;
                    info!(
                        order_id = %order.order_id,
                        status = ?order.status,
                        price = ?order.price,
                        "TWAP sub-order placed"
                    );
                }
                Err(e) => {
                    error!(slice, error = %e, "TWAP sub-order failed, continuing schedule");
                }
            }

            if slice < self.config.slices {
                tokio::select! {
                    changed = self.shutdown.changed() => {
                        if changed.is_err() || *self.shutdown.borrow() {
                            info!(placed, "TWAP execution stopped early");
                            return Ok(placed);
                        }
                    }
                    () = tokio::time::sleep(delay) => {}
                }
            }
        }

        info!(placed, "TWAP execution complete, all sub-orders placed");
        Ok(placed)
    }
}
