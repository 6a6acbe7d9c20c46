//! Shared fixtures for integration tests.

use laabhum_core::{Order, OrderSide, OrderType, Price, Quantity};
use laabhum_engine::{AppConfig, Application};
use rust_decimal::Decimal;

/// Application with default config and a fresh store.
pub fn app() -> Application {
    Application::new(AppConfig::default()).expect("default config is valid")
}

/// Unstored order for `symbol`.
pub fn order(symbol: &str, side: OrderSide, order_type: OrderType, quantity: u64, price: Decimal) -> Order {
    Order::new(symbol, side, order_type, Quantity(quantity), Price::new(price))
}

/// Unstored pending limit order under `parent_id`.
pub fn child(id: &str, parent_id: &str) -> Order {
    Order::new(
        "XYZ",
        OrderSide::Buy,
        OrderType::Limit,
        Quantity(1),
        Price::new(Decimal::from(50)),
    )
    .with_id(id)
    .with_parent(parent_id)
}
