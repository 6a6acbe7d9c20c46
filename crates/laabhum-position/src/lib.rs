//! Position monitoring for Laabhum.
//!
//! Applies trailing stop losses and take-profit exits to open positions.
//!
//! # Key Components
//!
//! - [`PositionMonitor`]: single passes, price sync, and the background loop
//! - [`MonitorConfig`]: enable flag, check interval, default feed price
//! - [`PriceProvider`]: trait for current prices
//! - [`MarketConditionPriceProvider`]: prices from stored market conditions
//! - [`StaticPriceProvider`]: fixed prices for tests and demos

pub mod error;
pub mod monitor;
pub mod price;
pub mod trailing;

pub use error::{PositionError, PositionResult};
pub use monitor::{MonitorConfig, MonitorReport, PositionMonitor};
pub use price::{
    MarketConditionPriceProvider, PriceProvider, StaticPriceProvider, DEFAULT_FEED_PRICE,
};
pub use trailing::{take_profit_reached, trailed_stop};
