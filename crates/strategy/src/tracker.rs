//! The tracked order set and the reconciliation primitive.
//!
//! A supervisor owns exactly one tracker. Every key in it came back from a
//! successful placement call or an order-status query — never a speculative
//! entry. Fills are detected by set difference against the exchange's
//! open-order snapshot, which is authoritative and cheaper than querying
//! each order individually.

use futures_bot_core::Order;
use std::collections::{HashMap, HashSet};

/// Last-known snapshots of the orders a supervisor placed or observed,
/// keyed by exchange-assigned order id.
#[derive(Debug, Default)]
pub struct OrderTracker {
    orders: HashMap<String, Order>,
}

impl OrderTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a confirmed order under its exchange-assigned id.
    pub fn insert(&mut self, order: Order) {
        self.orders.insert(order.order_id.clone(), order);
    }

    /// Drops an order once its consequence has been processed.
    pub fn remove(&mut self, order_id: &str) -> Option<Order> {
        self.orders.remove(order_id)
    }

    #[must_use]
    pub fn get(&self, order_id: &str) -> Option<&Order> {
        self.orders.get(order_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Ids of all tracked orders.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.orders.keys().map(String::as_str)
    }

    /// Orders tracked here but absent from the exchange's open set.
    ///
    /// This is the reconciliation primitive: `tracked − open`. Running it
    /// again on an unchanged open set yields nothing new, so no fill is ever
    /// double-processed.
    #[must_use]
    pub fn detect_filled(&self, open_ids: &HashSet<String>) -> Vec<String> {
        self.orders
            .keys()
            .filter(|id| !open_ids.contains(*id))
            .cloned()
            .collect()
    }

    /// Replaces the tracked set with the exchange's open-order snapshot.
    ///
    /// Called at the end of a poll cycle so that if cumulative bookkeeping
    /// ever diverges from the exchange's view, the exchange wins.
    pub fn sync_open(&mut self, snapshot: Vec<Order>) {
        self.orders = snapshot
            .into_iter()
            .map(|o| (o.order_id.clone(), o))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use futures_bot_core::{OrderStatus, OrderType, Side};
    use rust_decimal_macros::dec;

    fn open_order(id: &str) -> Order {
        Order {
            order_id: id.to_string(),
            symbol: "BTCUSDT".to_string(),
            side: Side::Buy,
            order_type: OrderType::Limit,
            quantity: dec!(1),
            price: Some(dec!(100)),
            stop_price: None,
            status: OrderStatus::Open,
            updated_at: Utc::now(),
        }
    }

    fn ids(values: &[&str]) -> HashSet<String> {
        values.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn detects_orders_missing_from_open_set() {
        let mut tracker = OrderTracker::new();
        for id in ["1", "2", "3"] {
            tracker.insert(open_order(id));
        }

        let mut filled = tracker.detect_filled(&ids(&["1", "3"]));
        filled.sort();
        assert_eq!(filled, vec!["2".to_string()]);
    }

    #[test]
    fn unchanged_open_set_yields_no_fills() {
        let mut tracker = OrderTracker::new();
        tracker.insert(open_order("1"));
        tracker.insert(open_order("2"));

        let open = ids(&["1", "2"]);
        assert!(tracker.detect_filled(&open).is_empty());
        // Reconciliation is idempotent: a second pass finds nothing either.
        assert!(tracker.detect_filled(&open).is_empty());
    }

    #[test]
    fn sync_open_adopts_exchange_view() {
        let mut tracker = OrderTracker::new();
        tracker.insert(open_order("1"));
        tracker.insert(open_order("2"));

        tracker.sync_open(vec![open_order("2"), open_order("4")]);

        assert_eq!(tracker.len(), 2);
        assert!(tracker.get("1").is_none());
        assert!(tracker.get("2").is_some());
        assert!(tracker.get("4").is_some());
    }
}
