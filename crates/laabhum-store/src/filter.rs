//! Order query filter.

use chrono::{DateTime, Utc};
use laabhum_core::{Order, OrderStatus, TradeStrategy};
use serde::{Deserialize, Serialize};

/// Criteria for `Repository::get_orders`.
///
/// Every unset (or empty) field matches everything; set fields must all
/// match. The creation window is inclusive on both ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFilter {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub strategy: Option<TradeStrategy>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub from_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub to_date: Option<DateTime<Utc>>,
}

impl OrderFilter {
    /// Filter that matches every order.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter on the children of `parent_id`.
    #[must_use]
    pub fn children_of(parent_id: impl Into<String>) -> Self {
        Self {
            parent_id: Some(parent_id.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    #[must_use]
    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn strategy(mut self, strategy: TradeStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    #[must_use]
    pub fn created_between(mut self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        self.from_date = from;
        self.to_date = to;
        self
    }

    /// Returns true if `order` satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(symbol) = non_empty(&self.symbol) {
            if symbol != order.symbol {
                return false;
            }
        }
        if let Some(status) = self.status {
            if status != order.status {
                return false;
            }
        }
        if let Some(strategy) = self.strategy {
            if order.strategy != Some(strategy) {
                return false;
            }
        }
        if let Some(parent_id) = non_empty(&self.parent_id) {
            if parent_id != order.parent_id {
                return false;
            }
        }
        if let Some(from) = self.from_date {
            if order.created_at < from.timestamp() {
                return false;
            }
        }
        if let Some(to) = self.to_date {
            if order.created_at > to.timestamp() {
                return false;
            }
        }
        true
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use laabhum_core::{OrderSide, OrderType, Price, Quantity};
    use rust_decimal_macros::dec;

    fn order(symbol: &str, created_at: i64) -> Order {
        let mut o = Order::new(symbol, OrderSide::Buy, OrderType::Limit, Quantity(1), Price::new(dec!(10)));
        o.created_at = created_at;
        o
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(OrderFilter::all().matches(&order("XYZ", 1)));
    }

    #[test]
    fn test_empty_strings_are_unset() {
        let filter = OrderFilter {
            symbol: Some(String::new()),
            parent_id: Some(String::new()),
            ..OrderFilter::default()
        };
        assert!(filter.matches(&order("XYZ", 1)));
    }

    #[test]
    fn test_symbol_and_strategy() {
        let o = order("XYZ", 1).with_strategy(TradeStrategy::Scalping);
        assert!(OrderFilter::all().symbol("XYZ").matches(&o));
        assert!(!OrderFilter::all().symbol("ABC").matches(&o));
        assert!(OrderFilter::all().strategy(TradeStrategy::Scalping).matches(&o));
        assert!(!OrderFilter::all().strategy(TradeStrategy::DayTrading).matches(&o));
        assert!(!OrderFilter::all()
            .strategy(TradeStrategy::Scalping)
            .matches(&order("XYZ", 1)));
    }

    #[test]
    fn test_date_window_inclusive() {
        let from = Utc.timestamp_opt(100, 0).unwrap();
        let to = Utc.timestamp_opt(200, 0).unwrap();
        let filter = OrderFilter::all().created_between(Some(from), Some(to));

        assert!(filter.matches(&order("XYZ", 100)));
        assert!(filter.matches(&order("XYZ", 200)));
        assert!(!filter.matches(&order("XYZ", 99)));
        assert!(!filter.matches(&order("XYZ", 201)));
    }

    #[test]
    fn test_parent_filter() {
        let child = order("XYZ", 1).with_parent("P1");
        assert!(OrderFilter::children_of("P1").matches(&child));
        assert!(!OrderFilter::children_of("P2").matches(&child));
        assert!(!OrderFilter::children_of("P1").matches(&order("XYZ", 1)));
    }
}
