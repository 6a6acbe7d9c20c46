//! Execution records.
//!
//! A `Trade` is written once when an order fills and never mutated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::order::{new_entity_id, Order, OrderSide};
use crate::{Price, Quantity};

/// Immutable record of a simulated fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub id: String,
    pub order_id: String,
    /// Trade-ledger group: the order's parent, or the order itself when top-level.
    pub parent_id: String,
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: Quantity,
    pub price: Price,
    pub trade_time: DateTime<Utc>,
}

impl Trade {
    /// Record a full fill of `order` at its own price.
    #[must_use]
    pub fn from_fill(order: &Order) -> Self {
        Self {
            id: new_entity_id(),
            order_id: order.id.clone(),
            parent_id: order.trade_group().to_string(),
            symbol: order.symbol.clone(),
            side: order.side,
            quantity: order.quantity,
            price: order.price,
            trade_time: Utc::now(),
        }
    }
}
