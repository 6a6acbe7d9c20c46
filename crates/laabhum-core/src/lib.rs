//! Core domain types for the Laabhum order-management core.
//!
//! This crate provides the entities every other crate passes around:
//! - `Order`, `Position`, `Trade`: lifecycle entities owned by the store
//! - `ScalperOrder`, `CtcOrder`: strategy-specific order records
//! - `MarketCondition`: last-known market snapshot per symbol
//! - `Price`, `Quantity`: precision-safe numeric types
//! - `OmsError`: the error kinds returned by every core operation

pub mod decimal;
pub mod error;
pub mod execution;
pub mod market;
pub mod order;
pub mod position;
pub mod scalper;

pub use decimal::{Price, Quantity};
pub use error::{OmsError, OmsResult};
pub use execution::Trade;
pub use market::{MarketCondition, Trend};
pub use order::{new_entity_id, Order, OrderSide, OrderStatus, OrderType, TradeStrategy};
pub use position::{Position, PositionStatus};
pub use scalper::{CtcOrder, ScalperOrder};

/// Current time as Unix seconds.
pub fn now_epoch_secs() -> i64 {
    chrono::Utc::now().timestamp()
}
