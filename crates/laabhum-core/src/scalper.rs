//! Scalping and close-the-cycle (CTC) order records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::order::{OrderSide, OrderStatus, OrderType};
use crate::{Price, Quantity};

/// High-frequency order sized from a risk budget.
///
/// `quantity` is computed by the order service, never taken from the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalperOrder {
    #[serde(default)]
    pub id: String,
    pub symbol: String,
    #[serde(default)]
    pub quantity: Quantity,
    /// Entry price.
    pub price: Price,
    pub stop_loss: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<Price>,
    /// Fraction of capital at risk (0.01 = 1%).
    pub risk_percentage: Decimal,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl ScalperOrder {
    #[must_use]
    pub fn new(symbol: impl Into<String>, price: Price, stop_loss: Price, risk_percentage: Decimal) -> Self {
        Self {
            id: String::new(),
            symbol: symbol.into(),
            quantity: Quantity::ZERO,
            price,
            stop_loss,
            take_profit: None,
            risk_percentage,
            created_at: 0,
            expires_at: None,
        }
    }
}

/// Closing order tied to a parent order or position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CtcOrder {
    #[serde(default)]
    pub id: String,
    pub parent_id: String,
    #[serde(default)]
    pub description: String,
    pub quantity: Quantity,
    pub price: Price,
    pub symbol: String,
    /// Requested execution style of the close.
    pub order_type: OrderType,
    pub side: OrderSide,
    #[serde(default)]
    pub client_id: String,
    /// Submission time (Unix seconds).
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub status: OrderStatus,
}

impl CtcOrder {
    #[must_use]
    pub fn new(
        parent_id: impl Into<String>,
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: Quantity,
        price: Price,
    ) -> Self {
        Self {
            id: String::new(),
            parent_id: parent_id.into(),
            description: String::new(),
            quantity,
            price,
            symbol: symbol.into(),
            order_type: OrderType::Limit,
            side,
            client_id: String::new(),
            timestamp: 0,
            status: OrderStatus::Pending,
        }
    }
}
