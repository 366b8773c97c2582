//! Grid strategy: a static ladder of limit orders, replenished after fills.
//!
//! The planner computes the rungs once; the supervisor then runs the
//! reconciliation loop, replacing each filled buy with a sell one step above
//! the fill price and each filled sell with a buy one step below, so the
//! ladder profits from mean-reverting oscillation. Replacements that would
//! land outside the configured range are skipped — the grid contracts at
//! that rung rather than chase price beyond its bounds.

use crate::tracker::OrderTracker;
use crate::with_call_timeout;
use anyhow::Result;
use futures_bot_core::{
    ConfigError, ExchangeClient, ExchangeError, Order, OrderRequest, PollConfig, Side,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

// =============================================================================
// Grid Plan
// =============================================================================

/// The immutable ladder geometry, computed once at start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridPlan {
    lower: Decimal,
    upper: Decimal,
    count: u32,
    quantity: Decimal,
}

impl GridPlan {
    /// Builds a plan over `[lower, upper]` with `count` rungs of `quantity`
    /// each.
    ///
    /// # Errors
    /// Rejects a degenerate range (`upper <= lower`), a zero grid count, and
    /// a non-positive per-rung quantity.
    pub fn new(
        lower: Decimal,
        upper: Decimal,
        count: u32,
        quantity: Decimal,
    ) -> Result<Self, ConfigError> {
        if upper <= lower {
            return Err(ConfigError::InvalidGridRange { lower, upper });
        }
        if count == 0 {
            return Err(ConfigError::InvalidGridCount(count));
        }
        if quantity <= Decimal::ZERO {
            return Err(ConfigError::InvalidQuantity(quantity));
        }
        Ok(Self {
            lower,
            upper,
            count,
            quantity,
        })
    }

    #[must_use]
    pub const fn lower(&self) -> Decimal {
        self.lower
    }

    #[must_use]
    pub const fn upper(&self) -> Decimal {
        self.upper
    }

    #[must_use]
    pub const fn quantity(&self) -> Decimal {
        self.quantity
    }

    /// Price distance between adjacent rungs: `(upper − lower) / count`.
    #[must_use]
    pub fn step(&self) -> Decimal {
        (self.upper - self.lower) / Decimal::from(self.count)
    }

    /// The rung prices, in ascending order.
    ///
    /// Level `i` is `lower + (upper − lower) · i / count` for `i = 1..=count`,
    /// so the first rung sits one step above the lower bound and the last
    /// rung is exactly the upper bound.
    #[must_use]
    pub fn levels(&self) -> Vec<Decimal> {
        let span = self.upper - self.lower;
        (1..=self.count)
            .map(|i| self.lower + span * Decimal::from(i) / Decimal::from(self.count))
            .collect()
    }

    /// Side for the initial placement at `level`: buy below the current
    /// market price, sell at or above it.
    #[must_use]
    pub fn initial_side(&self, level: Decimal, market_price: Decimal) -> Side {
        if level < market_price {
            Side::Buy
        } else {
            Side::Sell
        }
    }

    /// Replacement decision for one filled order.
    ///
    /// A filled buy is replaced by a sell one step above the fill price, a
    /// filled sell by a buy one step below. The step is recomputed from the
    /// plan each time, keeping the ladder geometrically regular after any
    /// number of replacements. Returns `None` when the computed price falls
    /// outside `[lower, upper]`.
    #[must_use]
    pub fn replacement_for(&self, filled_side: Side, fill_price: Decimal) -> Option<(Side, Decimal)> {
        let (side, price) = match filled_side {
            Side::Buy => (Side::Sell, fill_price + self.step()),
            Side::Sell => (Side::Buy, fill_price - self.step()),
        };
        if price < self.lower || price > self.upper {
            return None;
        }
        Some((side, price))
    }
}

// =============================================================================
// Grid Supervisor
// =============================================================================

/// Drives the grid: places the initial ladder, then reconciles and
/// replenishes until told to stop.
///
/// One instance, one symbol, one tracked order set. The loop has no natural
/// termination; it runs until the shutdown channel fires.
pub struct GridSupervisor {
    client: Arc<dyn ExchangeClient>,
    symbol: String,
    plan: GridPlan,
    poll: PollConfig,
    tracker: OrderTracker,
    shutdown: watch::Receiver<bool>,
}

impl GridSupervisor {
    #[must_use]
    pub fn new(
        client: Arc<dyn ExchangeClient>,
        symbol: impl Into<String>,
        plan: GridPlan,
        poll: PollConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            client,
            symbol: symbol.into(),
            plan,
            poll,
            tracker: OrderTracker::new(),
            shutdown,
        }
    }

    /// Number of orders currently tracked.
    #[must_use]
    pub fn tracked_orders(&self) -> usize {
        self.tracker.len()
    }

    /// Places the initial ladder of limit orders.
    ///
    /// Rungs below the current market price are buys, the rest sells. A
    /// per-rung exchange rejection is logged and skipped (that rung is
    /// simply absent); a transport failure is returned and aborts the
    /// remaining rungs. Rungs already accepted by then stay resting on the
    /// exchange, unsupervised until the caller retries or cancels them.
    ///
    /// # Errors
    /// Returns the first transient error encountered.
    pub async fn place_initial_orders(&mut self) -> Result<usize, ExchangeError> {
        let timeout = self.poll.call_timeout();
        let market_price =
            with_call_timeout(timeout, self.client.get_price(&self.symbol)).await?;
        info!(
            symbol = %self.symbol,
            market_price = %market_price,
            step = %self.plan.step(),
            rungs = self.plan.count,
            "placing initial grid"
        );

        let mut placed = 0;
        for level in self.plan.levels() {
            let side = self.plan.initial_side(level, market_price);
            let request =
                OrderRequest::limit(self.symbol.clone(), side, self.plan.quantity(), level);
            match with_call_timeout(timeout, self.client.place_order(&request)).await {
                Ok(order) => {
                    info!(
                        order_id = %order.order_id,
                        side = %side,
                        price = %level,
                        "placed initial grid order"
                    );
                    self.tracker.insert(order);
                    placed += 1;
                }
                Err(e) if !e.is_transient() => {
                    warn!(price = %level, error = %e, "rejected placing grid order, skipping rung");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(placed)
    }

    /// One reconciliation cycle: detect fills, react, adopt the exchange's
    /// open-order snapshot.
    ///
    /// Every fill found in the cycle is handled before the method returns;
    /// the relative order of reactions within a cycle is unspecified.
    ///
    /// # Errors
    /// Returns the first transient error; the caller backs off and retries
    /// the whole cycle. A fill stays tracked until its reaction has
    /// settled, so a cycle interrupted mid-replacement re-detects the fill
    /// on retry and finishes it; settled fills are dropped from tracking
    /// immediately and are not re-processed.
    pub async fn poll_once(&mut self) -> Result<(), ExchangeError> {
        let timeout = self.poll.call_timeout();
        let open_orders =
            with_call_timeout(timeout, self.client.get_open_orders(&self.symbol)).await?;
        let open_ids: HashSet<String> =
            open_orders.iter().map(|o| o.order_id.clone()).collect();

        let filled = self.tracker.detect_filled(&open_ids);
        if filled.is_empty() {
            return Ok(());
        }
        info!(count = filled.len(), "detected filled grid orders");

        for order_id in &filled {
            let order =
                with_call_timeout(timeout, self.client.get_order(&self.symbol, order_id)).await?;
            info!(
                order_id = %order.order_id,
                side = %order.side,
                price = ?order.price,
                "grid order filled"
            );
            let Some(fill_price) = order.price else {
                warn!(order_id = %order.order_id, "filled order reported no price, skipping");
                self.tracker.remove(order_id);
                continue;
            };
            self.react_to_fill(&order, fill_price).await?;
            // Dropped only after the reaction settles: a transient failure
            // above leaves the fill tracked, so the retried cycle
            // re-detects it and places the missing replacement.
            self.tracker.remove(order_id);
        }

        // Re-read the snapshot after reacting so replacements are included,
        // then let the exchange's view win over our bookkeeping.
        let snapshot =
            with_call_timeout(timeout, self.client.get_open_orders(&self.symbol)).await?;
        self.tracker.sync_open(snapshot);
        Ok(())
    }

    /// Places the replacement for one filled order, if the plan allows one.
    async fn react_to_fill(&mut self, filled: &Order, fill_price: Decimal) -> Result<(), ExchangeError> {
        let Some((side, price)) = self.plan.replacement_for(filled.side, fill_price) else {
            warn!(
                fill_price = %fill_price,
                lower = %self.plan.lower(),
                upper = %self.plan.upper(),
                "replacement price outside grid range, skipping"
            );
            return Ok(());
        };

        let request = OrderRequest::limit(self.symbol.clone(), side, self.plan.quantity(), price);
        match with_call_timeout(self.poll.call_timeout(), self.client.place_order(&request)).await {
            Ok(order) => {
                info!(
                    order_id = %order.order_id,
                    side = %side,
                    price = %price,
                    "placed replacement grid order"
                );
                self.tracker.insert(order);
                Ok(())
            }
            Err(e) if !e.is_transient() => {
                warn!(price = %price, error = %e, "replacement rejected, rung left empty");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Runs the reconciliation loop until the shutdown channel fires.
    ///
    /// Transient query failures are logged and followed by the extended
    /// back-off; they never end the loop.
    ///
    /// # Errors
    /// Only startup can fail; once looping, this returns `Ok` at shutdown.
    pub async fn run(&mut self) -> Result<()> {
        info!(
            symbol = %self.symbol,
            interval_secs = self.poll.interval_secs,
            "grid supervisor active, monitoring for fills"
        );
        let mut interval = tokio::time::interval(self.poll.interval());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        info!(symbol = %self.symbol, "grid supervisor stopping");
                        break;
                    }
                }
                _ = interval.tick() => {
                    if let Err(e) = self.poll_once().await {
                        warn!(error = %e, backoff_secs = self.poll.error_backoff_secs, "poll cycle failed, backing off");
                        tokio::select! {
                            changed = self.shutdown.changed() => {
                                if changed.is_err() || *self.shutdown.borrow() {
                                    info!(symbol = %self.symbol, "grid supervisor stopping");
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
        Ok(())
    }
}
