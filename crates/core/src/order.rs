//! Order domain types shared by every strategy and connector.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The opposing side (used to close out an entry position).
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BUY" => Ok(Self::Buy),
            "SELL" => Ok(Self::Sell),
            other => Err(format!("side must be BUY or SELL, got '{other}'")),
        }
    }
}

/// Order type as understood by the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Market,
    Limit,
    /// Stop order that rests as a limit order once triggered.
    StopLimit,
    /// Stop order that executes at market once triggered.
    StopMarket,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Market => write!(f, "MARKET"),
            Self::Limit => write!(f, "LIMIT"),
            Self::StopLimit => write!(f, "STOP"),
            Self::StopMarket => write!(f, "STOP_MARKET"),
        }
    }
}

/// Time-in-force for resting orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Good-till-cancel.
    Gtc,
    /// Immediate-or-cancel.
    Ioc,
    /// Fill-or-kill.
    Fok,
}

/// Order status, collapsed to the three states the supervisors distinguish.
///
/// Exchanges report a richer vocabulary (partially filled, expired, rejected);
/// the monitoring loops only care whether an order is still resting, done, or
/// gone. Partial fills are treated as still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Open,
    Filled,
    Cancelled,
}

impl OrderStatus {
    /// Maps a raw exchange status string onto the collapsed model.
    #[must_use]
    pub fn from_exchange(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "FILLED" => Self::Filled,
            "CANCELED" | "CANCELLED" | "EXPIRED" | "REJECTED" => Self::Cancelled,
            // NEW, PARTIALLY_FILLED, PENDING_NEW, anything unknown: still live
            _ => Self::Open,
        }
    }
}

/// A request to place a new order.
///
/// Optional fields apply only to certain order types; the constructors keep
/// call sites from building nonsensical combinations by hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub stop_price: Option<Decimal>,
    pub time_in_force: Option<TimeInForce>,
}

impl OrderRequest {
    /// A market order: fills immediately at the prevailing price.
    #[must_use]
    pub fn market(symbol: impl Into<String>, side: Side, quantity: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type: OrderType::Market,
            quantity,
            price: None,
            stop_price: None,
            time_in_force: None,
        }
    }

    /// A good-till-cancel limit order resting at `price`.
    #[must_use]
    pub fn limit(symbol: impl Into<String>, side: Side, quantity: Decimal, price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type: OrderType::Limit,
            quantity,
            price: Some(price),
            stop_price: None,
            time_in_force: Some(TimeInForce::Gtc),
        }
    }

    /// A stop-limit order: once `stop_price` trades, rests at `price`.
    #[must_use]
    pub fn stop_limit(
        symbol: impl Into<String>,
        side: Side,
        quantity: Decimal,
        stop_price: Decimal,
        price: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type: OrderType::StopLimit,
            quantity,
            price: Some(price),
            stop_price: Some(stop_price),
            time_in_force: Some(TimeInForce::Gtc),
        }
    }

    /// A stop-market order: once `stop_price` trades, executes at market.
    #[must_use]
    pub fn stop_market(
        symbol: impl Into<String>,
        side: Side,
        quantity: Decimal,
        stop_price: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type: OrderType::StopMarket,
            quantity,
            price: None,
            stop_price: Some(stop_price),
            time_in_force: None,
        }
    }
}

/// An order as last reported by the exchange.
///
/// `order_id` is exchange-assigned and opaque; it is unique per symbol and is
/// the key under which supervisors track the order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub stop_price: Option<Decimal>,
    pub status: OrderStatus,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Whether the order is still resting on the book.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == OrderStatus::Open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn side_round_trips_through_str() {
        assert_eq!("buy".parse::<Side>().unwrap(), Side::Buy);
        assert_eq!("SELL".parse::<Side>().unwrap(), Side::Sell);
        assert_eq!(Side::Buy.to_string(), "BUY");
        assert!("HOLD".parse::<Side>().is_err());
    }

    #[test]
    fn side_opposite_flips() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn exchange_status_collapses_to_three_states() {
        assert_eq!(OrderStatus::from_exchange("NEW"), OrderStatus::Open);
        assert_eq!(
            OrderStatus::from_exchange("PARTIALLY_FILLED"),
            OrderStatus::Open
        );
        assert_eq!(OrderStatus::from_exchange("FILLED"), OrderStatus::Filled);
        assert_eq!(
            OrderStatus::from_exchange("CANCELED"),
            OrderStatus::Cancelled
        );
        assert_eq!(
            OrderStatus::from_exchange("EXPIRED"),
            OrderStatus::Cancelled
        );
    }

    #[test]
    fn limit_request_carries_gtc_and_price() {
        let req = OrderRequest::limit("BTCUSDT", Side::Buy, dec!(0.5), dec!(60000));
        assert_eq!(req.order_type, OrderType::Limit);
        assert_eq!(req.price, Some(dec!(60000)));
        assert_eq!(req.time_in_force, Some(TimeInForce::Gtc));
        assert!(req.stop_price.is_none());
    }

    #[test]
    fn stop_market_request_has_no_limit_price() {
        let req = OrderRequest::stop_market("BTCUSDT", Side::Sell, dec!(1), dec!(58000));
        assert_eq!(req.order_type, OrderType::StopMarket);
        assert_eq!(req.stop_price, Some(dec!(58000)));
        assert!(req.price.is_none());
    }
}
