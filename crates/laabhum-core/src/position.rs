//! Position entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::order::{Order, TradeStrategy};
use crate::{Price, Quantity};

/// Position lifecycle: `Open` until closed, `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionStatus {
    #[default]
    Open,
    Closed,
}

impl fmt::Display for PositionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Closed => write!(f, "CLOSED"),
        }
    }
}

/// An open (or closed) position in a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub id: String,
    /// Order whose fill opened this position.
    pub order_id: String,
    pub symbol: String,
    pub quantity: Quantity,
    pub entry_price: Price,
    pub current_price: Price,
    /// Trailing stop. Only ever moves up.
    pub stop_loss: Price,
    /// Entry-to-stop distance at open. The trailing stop follows the
    /// price by this amount.
    #[serde(default)]
    pub trail_distance: Price,
    /// Profit level that closes the position. `None` disables auto-close.
    #[serde(default)]
    pub take_profit: Option<Price>,
    #[serde(default)]
    pub strategy: Option<TradeStrategy>,
    pub opened_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
    #[serde(default)]
    pub status: PositionStatus,
}

impl Position {
    /// Create an open position with no id assigned yet.
    #[must_use]
    pub fn new(
        order_id: impl Into<String>,
        symbol: impl Into<String>,
        quantity: Quantity,
        entry_price: Price,
        stop_loss: Price,
        take_profit: Option<Price>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            order_id: order_id.into(),
            symbol: symbol.into(),
            quantity,
            entry_price,
            current_price: entry_price,
            stop_loss,
            trail_distance: entry_price - stop_loss,
            take_profit,
            strategy: None,
            opened_at: now,
            last_updated_at: now,
            status: PositionStatus::Open,
        }
    }

    /// Open a position from an executed order.
    ///
    /// Entry is the order price; the stop loss comes from the order or
    /// defaults to zero (no stop).
    #[must_use]
    pub fn from_fill(order: &Order) -> Self {
        let mut position = Self::new(
            order.id.clone(),
            order.symbol.clone(),
            order.quantity,
            order.price,
            order.stop_loss.unwrap_or(Price::ZERO),
            order.take_profit,
        );
        position.strategy = order.strategy;
        position
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Open
    }
}
