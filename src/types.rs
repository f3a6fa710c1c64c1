//! Core data models for the bond marketplace (orders, trades, requests).
//!
//! [`Order`] and [`Trade`] serialize to the JSON documents held in the store;
//! field names and enum spellings are part of the wire format and must not
//! change. [`OrderRequest`] is the submission payload accepted by the API.

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Order side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The side an aggressor matches against.
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Order lifecycle status. `Cancelled` is reserved; the engine never produces it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Open,
    PartiallyFilled,
    Filled,
    Cancelled,
}

/// A bond order. Persisted as `bonds:orders:{id}` and, while resting,
/// snapshotted into the per-instrument book.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub instrument: String,
    pub side: Side,
    pub price: Decimal,
    /// Quantity at submission. Immutable after creation.
    pub initial_quantity: Decimal,
    /// Quantity yet to be filled. Decreases as the order executes.
    pub remaining_quantity: Decimal,
    /// ISO-8601 creation time. Audit only; matching priority comes from book insertion order.
    pub timestamp: String,
    pub status: OrderStatus,
    pub user_id: String,
}

impl Order {
    /// Builds a fresh order: generated id, full remaining quantity, `Open` status.
    pub fn new(
        instrument: impl Into<String>,
        side: Side,
        price: Decimal,
        quantity: Decimal,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            instrument: instrument.into(),
            side,
            price,
            initial_quantity: quantity,
            remaining_quantity: quantity,
            timestamp: now_iso(),
            status: OrderStatus::Open,
            user_id: user_id.into(),
        }
    }

    pub fn filled_quantity(&self) -> Decimal {
        self.initial_quantity - self.remaining_quantity
    }

    pub fn is_completely_filled(&self) -> bool {
        self.remaining_quantity.is_zero()
    }

    pub fn is_partially_filled(&self) -> bool {
        self.remaining_quantity > Decimal::ZERO && self.remaining_quantity < self.initial_quantity
    }
}

/// Submission payload for a new order.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub instrument: String,
    pub side: Side,
    pub price: Decimal,
    pub quantity: Decimal,
    pub user_id: String,
}

impl From<OrderRequest> for Order {
    fn from(req: OrderRequest) -> Self {
        Order::new(req.instrument, req.side, req.price, req.quantity, req.user_id)
    }
}

/// An executed match between two orders. Persisted as `bonds:trades:{id}`;
/// immutable once written.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: String,
    pub instrument: String,
    /// Execution price: always the resting order's price.
    pub price: Decimal,
    pub quantity: Decimal,
    pub aggressor_order_id: String,
    pub resting_order_id: String,
    pub buyer_order_id: String,
    pub seller_order_id: String,
    pub timestamp: String,
}

impl Trade {
    /// Builds the trade for one fill. The buyer is whichever order is `Buy`.
    pub fn from_match(aggressor: &Order, resting: &Order, price: Decimal, quantity: Decimal) -> Self {
        let (buyer_order_id, seller_order_id) = match aggressor.side {
            Side::Buy => (aggressor.id.clone(), resting.id.clone()),
            Side::Sell => (resting.id.clone(), aggressor.id.clone()),
        };
        Self {
            id: Uuid::new_v4().to_string(),
            instrument: aggressor.instrument.clone(),
            price,
            quantity,
            aggressor_order_id: aggressor.id.clone(),
            resting_order_id: resting.id.clone(),
            buyer_order_id,
            seller_order_id,
            timestamp: now_iso(),
        }
    }

    /// Monetary value of the trade: price × quantity.
    pub fn amount(&self) -> Decimal {
        self.price * self.quantity
    }
}

/// Current UTC time as an ISO-8601 string (microsecond precision).
pub(crate) fn now_iso() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}
