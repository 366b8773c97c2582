//! Synthetic one-cancels-other: a take-profit limit leg and a stop-loss
//! stop-market leg placed against one entry position, supervised by polling.
//!
//! The exchange is never asked for native linked-order semantics. Mutual
//! exclusion between the legs is enforced here: the first observed fill
//! retires the pair and cancels the sibling best-effort. Because detection
//! is poll-based, both legs can fill between two cycles; both statuses are
//! read before any cancel is issued, and a double fill cancels nothing.

use crate::with_call_timeout;
use anyhow::Result;
use futures_bot_core::{
    ConfigError, ExchangeClient, ExchangeError, Order, OrderRequest, OrderStatus, PollConfig, Side,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};

// =============================================================================
// Configuration
// =============================================================================

/// Parameters of one synthetic OCO pair.
///
/// Both legs share the symbol and quantity and sit on the side opposite the
/// entry: a long entry is exited by a sell take-profit and a sell stop-loss.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcoConfig {
    pub symbol: String,
    pub entry_side: Side,
    pub quantity: Decimal,
    pub take_profit_price: Decimal,
    pub stop_loss_price: Decimal,
}

impl OcoConfig {
    /// Validates quantities and prices.
    ///
    /// # Errors
    /// Rejects non-positive quantity or prices.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quantity <= Decimal::ZERO {
            return Err(ConfigError::InvalidQuantity(self.quantity));
        }
        if self.take_profit_price <= Decimal::ZERO {
            return Err(ConfigError::InvalidPrice(self.take_profit_price));
        }
        if self.stop_loss_price <= Decimal::ZERO {
            return Err(ConfigError::InvalidPrice(self.stop_loss_price));
        }
        Ok(())
    }

    /// Side both exit legs are placed on.
    #[must_use]
    pub fn exit_side(&self) -> Side {
        self.entry_side.opposite()
    }
}

// =============================================================================
// State machine
// =============================================================================

/// Lifecycle of the pair. `Done` is terminal: once reached, no poll issues
/// any further exchange call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OcoState {
    /// Both legs resting; polling continues.
    Active,
    /// Take-profit filled; cancelling the stop-loss leg.
    TpFilledCancelling,
    /// Stop-loss filled; cancelling the take-profit leg.
    SlFilledCancelling,
    /// Pair retired, regardless of cancellation outcome.
    Done,
}

// =============================================================================
// Supervisor
// =============================================================================

/// Places and supervises one synthetic OCO pair until either leg fills.
pub struct OcoSupervisor {
    client: Arc<dyn ExchangeClient>,
    config: OcoConfig,
    poll: PollConfig,
    state: OcoState,
    take_profit: Option<Order>,
    stop_loss: Option<Order>,
    shutdown: watch::Receiver<bool>,
}

impl OcoSupervisor {
    #[must_use]
    pub fn new(
        client: Arc<dyn ExchangeClient>,
        config: OcoConfig,
        poll: PollConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            client,
            config,
            poll,
            state: OcoState::Active,
            take_profit: None,
            stop_loss: None,
            shutdown,
        }
    }

    #[must_use]
    pub const fn state(&self) -> OcoState {
        self.state
    }

    /// Places both legs: the take-profit as a good-till-cancel limit order,
    /// the stop-loss as a stop-market order.
    ///
    /// # Errors
    /// Either leg failing at startup is fatal — the pair cannot function
    /// one-legged. If the second leg fails, the first is cancelled
    /// best-effort before the error is returned.
    pub async fn place_legs(&mut self) -> Result<(), ExchangeError> {
        let timeout = self.poll.call_timeout();
        let exit_side = self.config.exit_side();
        info!(
            symbol = %self.config.symbol,
            quantity = %self.config.quantity,
            take_profit = %self.config.take_profit_price,
            stop_loss = %self.config.stop_loss_price,
            "placing synthetic OCO pair"
        );

        let tp_request = OrderRequest::limit(
            self.config.symbol.clone(),
            exit_side,
            self.config.quantity,
            self.config.take_profit_price,
        );
        let tp = with_call_timeout(timeout, self.client.place_order(&tp_request)).await?;
        info!(order_id = %tp.order_id, price = %self.config.take_profit_price, "take-profit leg placed");

        let sl_request = OrderRequest::stop_market(
            self.config.symbol.clone(),
            exit_side,
            self.config.quantity,
            self.config.stop_loss_price,
        );
        let sl = match with_call_timeout(timeout, self.client.place_order(&sl_request)).await {
            Ok(order) => order,
            Err(e) => {
                error!(error = %e, "stop-loss leg failed, unwinding take-profit leg");
                if let Err(cancel_err) = self
                    .client
                    .cancel_order(&self.config.symbol, &tp.order_id)
                    .await
                {
                    warn!(error = %cancel_err, "failed to unwind take-profit leg");
                }
                return Err(e);
            }
        };
        info!(order_id = %sl.order_id, trigger = %self.config.stop_loss_price, "stop-loss leg placed");

        self.take_profit = Some(tp);
        self.stop_loss = Some(sl);
        Ok(())
    }

    /// One poll cycle: query both legs directly, then react.
    ///
    /// With only two orders to track, a direct status read per leg is
    /// simpler than the open-order set difference the grid uses. Both
    /// statuses are read before any cancel so a double fill between polls
    /// is recognized instead of cancelling an already-filled sibling.
    ///
    /// # Errors
    /// Returns transient errors to the caller for back-off; the state is
    /// unchanged in that case.
    pub async fn poll_once(&mut self) -> Result<OcoState, ExchangeError> {
        if self.state == OcoState::Done {
            return Ok(OcoState::Done);
        }
        let (Some(tp), Some(sl)) = (self.take_profit.clone(), self.stop_loss.clone()) else {
            return Ok(self.state);
        };

        let timeout = self.poll.call_timeout();
        let tp_now =
            with_call_timeout(timeout, self.client.get_order(&self.config.symbol, &tp.order_id))
                .await?;
        let sl_now =
            with_call_timeout(timeout, self.client.get_order(&self.config.symbol, &sl.order_id))
                .await?;

        match (tp_now.status, sl_now.status) {
            (OrderStatus::Filled, OrderStatus::Filled) => {
                // Known race surface of poll-based synthetic OCO: both legs
                // filled between two cycles. Nothing left to cancel.
                warn!(
                    tp_order_id = %tp.order_id,
                    sl_order_id = %sl.order_id,
                    "both legs filled between polls, no cancel issued"
                );
                self.state = OcoState::Done;
            }
            (OrderStatus::Filled, _) => {
                info!(order_id = %tp.order_id, "take-profit filled, cancelling stop-loss");
                self.state = OcoState::TpFilledCancelling;
                self.cancel_leg(&sl.order_id, "stop-loss").await;
                self.state = OcoState::Done;
            }
            (_, OrderStatus::Filled) => {
                info!(order_id = %sl.order_id, "stop-loss filled, cancelling take-profit");
                self.state = OcoState::SlFilledCancelling;
                self.cancel_leg(&tp.order_id, "take-profit").await;
                self.state = OcoState::Done;
            }
            (OrderStatus::Cancelled, _) | (_, OrderStatus::Cancelled) => {
                // A leg vanished outside our control (manual cancel,
                // expiry). The pair cannot function one-legged; retire it
                // and pull the survivor.
                warn!("a leg was cancelled externally, retiring the pair");
                if tp_now.is_open() {
                    self.cancel_leg(&tp.order_id, "take-profit").await;
                }
                if sl_now.is_open() {
                    self.cancel_leg(&sl.order_id, "stop-loss").await;
                }
                self.state = OcoState::Done;
            }
            _ => {}
        }
        Ok(self.state)
    }

    /// Best-effort sibling cancel: a failure (the sibling raced to filled)
    /// is logged and the pair still retires.
    async fn cancel_leg(&self, order_id: &str, leg: &str) {
        match self.client.cancel_order(&self.config.symbol, order_id).await {
            Ok(()) => info!(order_id, leg, "sibling leg cancelled"),
            Err(e) => warn!(order_id, leg, error = %e, "sibling cancel failed, retiring pair anyway"),
        }
    }

    /// Polls until the pair retires or the shutdown channel fires.
    ///
    /// Transient query failures are logged and followed by the extended
    /// back-off; they never end the loop.
    ///
    /// # Errors
    /// Only startup can fail; the monitoring loop itself logs its way
    /// through degraded conditions.
    pub async fn run(&mut self) -> Result<()> {
        info!(
            symbol = %self.config.symbol,
            interval_secs = self.poll.interval_secs,
            "synthetic OCO active, monitoring for fills"
        );
        let mut interval = tokio::time::interval(self.poll.interval());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        info!(symbol = %self.config.symbol, "OCO supervisor stopping");
                        break;
                    }
                }
                _ = interval.tick() => {
                    match self.poll_once().await {
                        Ok(OcoState::Done) => {
                            info!(symbol = %self.config.symbol, "synthetic OCO complete");
                            break;
                        }
                        Ok(_) => {}
                        Err(e) => {
                            warn!(error = %e, backoff_secs = self.poll.error_backoff_secs, "poll cycle failed, backing off");
                            tokio::select! {
                                changed = self.shutdown.changed() => {
                                    if changed.is_err() || *self.shutdown.borrow() {
                                        info!(symbol = %self.config.symbol, "OCO supervisor stopping");
                                        break;
                                    }
                                }
                                () = tokio::time::sleep(self.poll.error_backoff()) => {}
                            }
                            interval.reset();
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
