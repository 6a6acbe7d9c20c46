//! Order-related types and identifiers.
//!
//! Provides order side, type, status and strategy enums, the `Order`
//! entity, and id generation for every entity the store owns.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::{Price, Quantity};

/// Generate a new globally unique entity id.
pub fn new_entity_id() -> String {
    Uuid::new_v4().to_string()
}

/// Order side: buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    #[default]
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    /// Limit order, waits for an execution trigger.
    Limit,
    /// Market order, filled immediately by the simulator.
    Market,
    /// Stop order, waits for an execution trigger.
    Stop,
    /// Closing order tied to a parent (see `CtcOrder`).
    Ctc,
}

impl OrderType {
    /// Status an order of this type takes on creation or execution.
    ///
    /// Market orders are filled instantly; everything else waits.
    #[must_use]
    pub fn initial_status(&self) -> OrderStatus {
        match self {
            Self::Market => OrderStatus::Executed,
            Self::Limit | Self::Stop | Self::Ctc => OrderStatus::Pending,
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limit => write!(f, "LIMIT"),
            Self::Market => write!(f, "MARKET"),
            Self::Stop => write!(f, "STOP"),
            Self::Ctc => write!(f, "CTC"),
        }
    }
}

/// State of an order in its lifecycle.
///
/// Statuses are ordered: `Pending < Executed < Cancelled < Deleted`.
/// An order may only move forward along that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Executed,
    Cancelled,
    Deleted,
}

impl OrderStatus {
    /// Returns true if moving from `self` to `next` is allowed.
    ///
    /// Same-status moves are allowed so that re-driving an operation is a
    /// no-op rather than an error.
    #[must_use]
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        next >= *self
    }

    /// Returns true if the order can still change price or quantity.
    #[must_use]
    pub fn is_modifiable(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Executed => write!(f, "EXECUTED"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Deleted => write!(f, "DELETED"),
        }
    }
}

/// Trading strategy an order or position belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeStrategy {
    DayTrading,
    PositionTrading,
    Scalping,
}

impl fmt::Display for TradeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DayTrading => write!(f, "DAY_TRADING"),
            Self::PositionTrading => write!(f, "POSITION_TRADING"),
            Self::Scalping => write!(f, "SCALPING"),
        }
    }
}

/// An order known to the order-management core.
///
/// An empty `id` means "not assigned yet"; the store fills it in.
/// An empty `parent_id` marks a top-level order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    #[serde(default)]
    pub id: String,
    pub symbol: String,
    pub quantity: Quantity,
    pub price: Price,
    #[serde(default)]
    pub side: OrderSide,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<Price>,
    /// Initial stop loss for the position a buy fill opens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<Price>,
    #[serde(default)]
    pub strategy: Option<TradeStrategy>,
    /// Fraction of capital at risk (0.01 = 1%).
    #[serde(default)]
    pub risk_percentage: Decimal,
    #[serde(default)]
    pub stop_loss_activated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<Price>,
    /// Creation time (Unix seconds). Zero until assigned.
    #[serde(default)]
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub parent_id: String,
}

impl Order {
    /// Create an unassigned order with the required fields.
    #[must_use]
    pub fn new(
        symbol: impl Into<String>,
        side: OrderSide,
        order_type: OrderType,
        quantity: Quantity,
        price: Price,
    ) -> Self {
        Self {
            id: String::new(),
            symbol: symbol.into(),
            quantity,
            price,
            side,
            order_type,
            status: OrderStatus::Pending,
            stop_price: None,
            stop_loss: None,
            strategy: None,
            risk_percentage: Decimal::ZERO,
            stop_loss_activated: false,
            take_profit: None,
            created_at: 0,
            expires_at: None,
            parent_id: String::new(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = parent_id.into();
        self
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: TradeStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    #[must_use]
    pub fn with_stop_loss(mut self, stop_loss: Price) -> Self {
        self.stop_loss = Some(stop_loss);
        self
    }

    #[must_use]
    pub fn with_take_profit(mut self, take_profit: Price) -> Self {
        self.take_profit = Some(take_profit);
        self
    }

    #[must_use]
    pub fn is_child(&self) -> bool {
        !self.parent_id.is_empty()
    }

    /// Key under which fills of this order are grouped in the trade ledger.
    ///
    /// Children group under their parent, top-level orders under themselves.
    #[must_use]
    pub fn trade_group(&self) -> &str {
        if self.is_child() {
            &self.parent_id
        } else {
            &self.id
        }
    }
}
