//! Periodic position monitor: trailing stops and take-profit exits.
//!
//! Each pass reads every open position, prices it, tightens its stop when
//! the price has moved up, and closes it with a market sell once the take
//! profit is reached. A failure on one position is logged and the pass
//! moves on to the next one.

use std::sync::Arc;
use std::time::Instant;

use laabhum_core::{Position, Price};
use laabhum_oms::{CloseReason, OrderService};
use laabhum_telemetry::Metrics;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{PositionError, PositionResult};
use crate::price::{PriceProvider, DEFAULT_FEED_PRICE};
use crate::trailing::{take_profit_reached, trailed_stop};

// ============================================================================
// MonitorConfig
// ============================================================================

/// Position monitor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Whether the background monitor task runs.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Time between passes (ms).
    #[serde(default = "default_check_interval_ms")]
    pub check_interval_ms: u64,
    /// Price assumed for symbols with no market data.
    #[serde(default = "default_feed_price")]
    pub default_price: Price,
}

fn default_enabled() -> bool {
    true
}

fn default_check_interval_ms() -> u64 {
    1000
}

fn default_feed_price() -> Price {
    Price::new(DEFAULT_FEED_PRICE)
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            check_interval_ms: default_check_interval_ms(),
            default_price: default_feed_price(),
        }
    }
}

// ============================================================================
// MonitorReport
// ============================================================================

/// Summary of one monitor pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorReport {
    /// Positions priced and evaluated.
    pub checked: usize,
    /// Stops tightened.
    pub ratcheted: usize,
    /// Positions closed at take profit.
    pub closed: usize,
    /// Positions with no price this pass.
    pub skipped: usize,
    /// Positions whose update failed.
    pub failed: usize,
}

enum Outcome {
    Refreshed { ratcheted: bool },
    Closed { ratcheted: bool },
}

// ============================================================================
// PositionMonitor
// ============================================================================

/// Evaluates open positions against live prices.
pub struct PositionMonitor<P: PriceProvider> {
    service: Arc<OrderService>,
    price_provider: Arc<P>,
    config: MonitorConfig,
}

impl<P: PriceProvider + 'static> PositionMonitor<P> {
    #[must_use]
    pub fn new(service: Arc<OrderService>, price_provider: Arc<P>, config: MonitorConfig) -> Self {
        Self {
            service,
            price_provider,
            config,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Run one full pass over the open positions.
    pub fn run_pass(&self) -> MonitorReport {
        let started = Instant::now();
        let positions = self.service.repository().get_open_positions();
        let mut report = MonitorReport::default();

        for position in &positions {
            match self.evaluate(position) {
                Ok(Outcome::Refreshed { ratcheted }) => {
                    report.checked += 1;
                    report.ratcheted += usize::from(ratcheted);
                }
                Ok(Outcome::Closed { ratcheted }) => {
                    report.checked += 1;
                    report.ratcheted += usize::from(ratcheted);
                    report.closed += 1;
                }
                Err(PositionError::PriceUnavailable(symbol)) => {
                    warn!(position_id = %position.id, symbol = %symbol, "No price available, skipping position");
                    report.skipped += 1;
                }
                Err(e) => {
                    warn!(position_id = %position.id, symbol = %position.symbol, error = %e, "Position update failed");
                    report.failed += 1;
                }
            }
        }

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        Metrics::monitor_pass(positions.len() - report.closed, elapsed_ms);
        if report.ratcheted > 0 || report.closed > 0 || report.failed > 0 {
            info!(
                checked = report.checked,
                ratcheted = report.ratcheted,
                closed = report.closed,
                skipped = report.skipped,
                failed = report.failed,
                "Monitor pass completed"
            );
        }
        report
    }

    /// Refresh the current price of every open position without evaluating
    /// stops or take profits. Returns the refreshed positions.
    pub fn sync_positions(&self) -> Vec<Position> {
        let repo = self.service.repository();
        let mut refreshed = Vec::new();

        for mut position in repo.get_open_positions() {
            let Some(current) = self.price_provider.get_price(&position.symbol) else {
                warn!(position_id = %position.id, symbol = %position.symbol, "No price available, not syncing position");
                continue;
            };
            position.current_price = current;
            match repo.update_position(position) {
                Ok(updated) => refreshed.push(updated),
                Err(e) => debug!(error = %e, "Position changed during sync"),
            }
        }
        refreshed
    }

    /// Run passes every `check_interval_ms` until `shutdown` flips to true
    /// or its sender is dropped.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        if !self.config.enabled {
            info!("PositionMonitor disabled");
            return;
        }

        info!(
            check_interval_ms = self.config.check_interval_ms,
            default_price = %self.config.default_price,
            "PositionMonitor started"
        );

        let interval = tokio::time::Duration::from_millis(self.config.check_interval_ms);
        let mut ticker = tokio::time::interval(interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_pass();
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("PositionMonitor stopping");
                        return;
                    }
                }
            }
        }
    }

    fn evaluate(&self, position: &Position) -> PositionResult<Outcome> {
        let current = self
            .price_provider
            .get_price(&position.symbol)
            .ok_or_else(|| PositionError::PriceUnavailable(position.symbol.clone()))?;

        let mut refreshed = position.clone();
        refreshed.current_price = current;

        let new_stop = trailed_stop(position, current);
        if let Some(stop) = new_stop {
            refreshed.stop_loss = stop;
        }

        let stored = self.service.repository().update_position(refreshed)?;
        let ratcheted = new_stop.is_some();
        if ratcheted {
            Metrics::stop_ratcheted();
            debug!(
                position_id = %position.id,
                from = %position.stop_loss,
                to = %stored.stop_loss,
                current = %current,
                "Trailing stop tightened"
            );
        }

        if take_profit_reached(position, current) {
            self.service
                .close_position(&position.id, current, CloseReason::TakeProfit)?;
            return Ok(Outcome::Closed { ratcheted });
        }
        Ok(Outcome::Refreshed { ratcheted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::price::{MockPriceProvider, StaticPriceProvider};
    use laabhum_core::{OrderSide, OrderStatus, OrderType, PositionStatus, Quantity};
    use laabhum_oms::OrderServiceConfig;
    use laabhum_store::Repository;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn px(v: Decimal) -> Price {
        Price::new(v)
    }

    fn service() -> Arc<OrderService> {
        Arc::new(OrderService::new(
            Arc::new(Repository::new()),
            OrderServiceConfig::default(),
        ))
    }

    fn open_position(service: &OrderService, take_profit: Option<Price>) -> Position {
        service
            .repository()
            .create_position(Position::new(
                "o1",
                "XYZ",
                Quantity(10),
                px(dec!(100)),
                px(dec!(95)),
                take_profit,
            ))
            .unwrap()
    }

    // ========================================================================
    // Config
    // ========================================================================

    #[test]
    fn test_config_defaults() {
        let config = MonitorConfig::default();
        assert!(config.enabled);
        assert_eq!(config.check_interval_ms, 1000);
        assert_eq!(config.default_price, px(dec!(100)));
    }

    // ========================================================================
    // run_pass
    // ========================================================================

    #[test]
    fn test_pass_ratchets_stop_up() {
        let svc = service();
        let position = open_position(&svc, Some(px(dec!(120))));
        let prices = Arc::new(StaticPriceProvider::new());
        prices.set("XYZ", px(dec!(103)));
        let monitor = PositionMonitor::new(Arc::clone(&svc), prices, MonitorConfig::default());

        let report = monitor.run_pass();
        assert_eq!(report.checked, 1);
        assert_eq!(report.ratcheted, 1);
        assert_eq!(report.closed, 0);

        let stored = svc.repository().get_position(&position.id).unwrap();
        assert_eq!(stored.stop_loss, px(dec!(98)));
        assert_eq!(stored.current_price, px(dec!(103)));
        assert_eq!(stored.status, PositionStatus::Open);
    }

    #[test]
    fn test_stop_never_decreases() {
        let svc = service();
        let position = open_position(&svc, None);
        let prices = Arc::new(StaticPriceProvider::new());
        let monitor = PositionMonitor::new(Arc::clone(&svc), Arc::clone(&prices), MonitorConfig::default());

        let mut last_stop = position.stop_loss;
        for price in [dec!(101), dec!(104), dec!(99), dec!(90), dec!(102), dec!(100), dec!(106)] {
            prices.set("XYZ", px(price));
            monitor.run_pass();
            let stop = svc.repository().get_position(&position.id).unwrap().stop_loss;
            assert!(stop >= last_stop, "stop moved down from {last_stop} to {stop} at {price}");
            last_stop = stop;
        }
    }

    #[test]
    fn test_stop_holds_while_price_is_flat() {
        let svc = service();
        let position = open_position(&svc, None);
        let prices = Arc::new(StaticPriceProvider::new());
        prices.set("XYZ", px(dec!(103)));
        let monitor = PositionMonitor::new(Arc::clone(&svc), prices, MonitorConfig::default());

        assert_eq!(monitor.run_pass().ratcheted, 1);
        for _ in 0..4 {
            assert_eq!(monitor.run_pass().ratcheted, 0);
            let stop = svc.repository().get_position(&position.id).unwrap().stop_loss;
            assert_eq!(stop, px(dec!(98)));
            assert!(stop <= px(dec!(103)));
        }
    }

    #[test]
    fn test_price_below_entry_leaves_stop() {
        let svc = service();
        let position = open_position(&svc, Some(px(dec!(110))));
        let mut provider = MockPriceProvider::new();
        provider
            .expect_get_price()
            .returning(|_| Some(Price::new(dec!(96))));
        let monitor = PositionMonitor::new(Arc::clone(&svc), Arc::new(provider), MonitorConfig::default());

        let report = monitor.run_pass();
        assert_eq!(report.ratcheted, 0);

        let stored = svc.repository().get_position(&position.id).unwrap();
        assert_eq!(stored.stop_loss, px(dec!(95)));
        assert_eq!(stored.current_price, px(dec!(96)));
    }

    #[test]
    fn test_closes_exactly_at_take_profit() {
        let svc = service();
        let position = open_position(&svc, Some(px(dec!(110))));
        let prices = Arc::new(StaticPriceProvider::new());
        let monitor = PositionMonitor::new(Arc::clone(&svc), Arc::clone(&prices), MonitorConfig::default());

        prices.set("XYZ", px(dec!(109.99)));
        assert_eq!(monitor.run_pass().closed, 0);
        assert!(svc.repository().get_position(&position.id).unwrap().is_open());

        prices.set("XYZ", px(dec!(110)));
        let report = monitor.run_pass();
        assert_eq!(report.closed, 1);

        let stored = svc.repository().get_position(&position.id).unwrap();
        assert_eq!(stored.status, PositionStatus::Closed);

        let sells: Vec<_> = svc
            .get_orders(&laabhum_store::OrderFilter::all())
            .into_iter()
            .filter(|o| o.side == OrderSide::Sell)
            .collect();
        assert_eq!(sells.len(), 1);
        assert_eq!(sells[0].order_type, OrderType::Market);
        assert_eq!(sells[0].status, OrderStatus::Executed);
        assert_eq!(sells[0].quantity, Quantity(10));
        assert_eq!(sells[0].price, px(dec!(110)));

        // closed positions are no longer evaluated
        assert_eq!(monitor.run_pass(), MonitorReport::default());
    }

    #[test]
    fn test_stop_hit_does_not_close() {
        let svc = service();
        let position = open_position(&svc, Some(px(dec!(110))));
        let prices = Arc::new(StaticPriceProvider::new());
        prices.set("XYZ", px(dec!(80)));
        let monitor = PositionMonitor::new(Arc::clone(&svc), prices, MonitorConfig::default());

        assert_eq!(monitor.run_pass().closed, 0);
        assert!(svc.repository().get_position(&position.id).unwrap().is_open());
    }

    #[test]
    fn test_missing_price_skips_position() {
        let svc = service();
        open_position(&svc, Some(px(dec!(110))));
        let mut provider = MockPriceProvider::new();
        provider.expect_get_price().returning(|_| None);
        let monitor = PositionMonitor::new(Arc::clone(&svc), Arc::new(provider), MonitorConfig::default());

        let report = monitor.run_pass();
        assert_eq!(report.skipped, 1);
        assert_eq!(report.checked, 0);
    }

    #[test]
    fn test_position_from_market_buy_is_monitored() {
        let svc = service();
        svc.create_order(
            laabhum_core::Order::new("XYZ", OrderSide::Buy, OrderType::Market, Quantity(5), px(dec!(100)))
                .with_stop_loss(px(dec!(90)))
                .with_take_profit(px(dec!(105))),
        )
        .unwrap();
        let prices = Arc::new(StaticPriceProvider::new());
        prices.set("XYZ", px(dec!(106)));
        let monitor = PositionMonitor::new(Arc::clone(&svc), prices, MonitorConfig::default());

        let report = monitor.run_pass();
        assert_eq!(report.closed, 1);
        assert!(svc.repository().get_open_positions().is_empty());
    }

    // ========================================================================
    // sync_positions
    // ========================================================================

    #[test]
    fn test_sync_refreshes_price_only() {
        let svc = service();
        let position = open_position(&svc, Some(px(dec!(110))));
        let prices = Arc::new(StaticPriceProvider::new());
        prices.set("XYZ", px(dec!(120)));
        let monitor = PositionMonitor::new(Arc::clone(&svc), prices, MonitorConfig::default());

        let synced = monitor.sync_positions();
        assert_eq!(synced.len(), 1);
        assert_eq!(synced[0].current_price, px(dec!(120)));
        assert_eq!(synced[0].stop_loss, px(dec!(95)));
        assert!(svc.repository().get_position(&position.id).unwrap().is_open());
    }

    // ========================================================================
    // run
    // ========================================================================

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let svc = service();
        let config = MonitorConfig {
            check_interval_ms: 10,
            ..MonitorConfig::default()
        };
        let monitor = PositionMonitor::new(svc, Arc::new(StaticPriceProvider::new()), config);
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(monitor.run(rx));
        tokio::time::sleep(std::time::Duration::from_millis(30)).await;
        tx.send(true).unwrap();

        tokio::time::timeout(std::time::Duration::from_secs(1), handle)
            .await
            .expect("monitor did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_run_disabled_returns_immediately() {
        let config = MonitorConfig {
            enabled: false,
            ..MonitorConfig::default()
        };
        let monitor = PositionMonitor::new(service(), Arc::new(StaticPriceProvider::new()), config);
        let (_tx, rx) = watch::channel(false);
        monitor.run(rx).await;
    }
}
