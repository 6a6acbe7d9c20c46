//! Market condition snapshots.
//!
//! One record per symbol; a newer snapshot replaces the previous one.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Price;

/// Direction of the prevailing market move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
    #[default]
    Sideways,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bullish => write!(f, "bullish"),
            Self::Bearish => write!(f, "bearish"),
            Self::Sideways => write!(f, "sideways"),
        }
    }
}

/// Latest observed market data for a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketCondition {
    pub symbol: String,
    pub price: Price,
    #[serde(default)]
    pub volume: u64,
    /// Measure of price fluctuation.
    #[serde(default)]
    pub volatility: Decimal,
    #[serde(default)]
    pub trend: Trend,
    pub timestamp: DateTime<Utc>,
}

impl MarketCondition {
    /// Snapshot with only a price, stamped now.
    #[must_use]
    pub fn quote(symbol: impl Into<String>, price: Price) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            volume: 0,
            volatility: Decimal::ZERO,
            trend: Trend::Sideways,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quote_defaults() {
        let mc = MarketCondition::quote("XYZ", Price::new(dec!(101.25)));
        assert_eq!(mc.symbol, "XYZ");
        assert_eq!(mc.trend, Trend::Sideways);
        assert_eq!(mc.volume, 0);
    }

    #[test]
    fn test_trend_serde() {
        let json = serde_json::to_string(&Trend::Bullish).unwrap();
        assert_eq!(json, "\"bullish\"");
    }
}
