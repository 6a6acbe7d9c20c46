//! Price sources for the position monitor.

use std::collections::HashMap;
use std::sync::Arc;

use laabhum_core::Price;
use laabhum_store::Repository;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use tracing::trace;

/// Simulated feed price used when a symbol has no market data yet.
pub const DEFAULT_FEED_PRICE: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

// ============================================================================
// PriceProvider Trait
// ============================================================================

/// Trait for providing current market prices.
#[cfg_attr(test, mockall::automock)]
pub trait PriceProvider: Send + Sync {
    /// Get the current price for a symbol.
    ///
    /// Returns `None` if no price is available.
    fn get_price(&self, symbol: &str) -> Option<Price>;
}

// ============================================================================
// MarketConditionPriceProvider
// ============================================================================

/// Reads the latest stored market condition for a symbol.
///
/// Falls back to a fixed feed price when the symbol has never been seen;
/// with no fallback configured, unseen symbols have no price.
pub struct MarketConditionPriceProvider {
    repo: Arc<Repository>,
    fallback: Option<Price>,
}

impl MarketConditionPriceProvider {
    #[must_use]
    pub fn new(repo: Arc<Repository>, fallback: Option<Price>) -> Self {
        Self { repo, fallback }
    }
}

impl PriceProvider for MarketConditionPriceProvider {
    fn get_price(&self, symbol: &str) -> Option<Price> {
        match self.repo.get_latest_market_condition(symbol) {
            Ok(condition) => Some(condition.price),
            Err(_) => {
                trace!(symbol, "No market condition, using fallback price");
                self.fallback
            }
        }
    }
}

// ============================================================================
// StaticPriceProvider
// ============================================================================

/// Fixed per-symbol prices, settable at runtime.
#[derive(Debug, Default)]
pub struct StaticPriceProvider {
    prices: RwLock<HashMap<String, Price>>,
}

impl StaticPriceProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, symbol: impl Into<String>, price: Price) {
        self.prices.write().insert(symbol.into(), price);
    }
}

impl PriceProvider for StaticPriceProvider {
    fn get_price(&self, symbol: &str) -> Option<Price> {
        self.prices.read().get(symbol).copied()
    }
}
