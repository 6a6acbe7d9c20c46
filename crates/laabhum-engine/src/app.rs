//! Main application wiring.
//!
//! Builds the store, order service, cascade engine and position monitor,
//! runs the monitor as a background task, and stops it on shutdown.

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use laabhum_oms::{CascadeEngine, OrderService};
use laabhum_position::{MarketConditionPriceProvider, PositionMonitor};
use laabhum_store::Repository;
use laabhum_telemetry::Metrics;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// Main application.
pub struct Application {
    config: AppConfig,
    repo: Arc<Repository>,
    service: Arc<OrderService>,
    cascade: Arc<CascadeEngine>,
}

impl Application {
    /// Create a new application with an empty store.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        config.validate()?;

        let repo = Arc::new(Repository::new());
        let service = Arc::new(OrderService::new(
            Arc::clone(&repo),
            config.order_service(),
        ));
        let cascade = Arc::new(CascadeEngine::new(Arc::clone(&service)));

        Ok(Self {
            config,
            repo,
            service,
            cascade,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn repository(&self) -> &Arc<Repository> {
        &self.repo
    }

    /// Order service shared with the request adapter.
    pub fn service(&self) -> &Arc<OrderService> {
        &self.service
    }

    /// Cascade engine shared with the request adapter.
    pub fn cascade(&self) -> &Arc<CascadeEngine> {
        &self.cascade
    }

    /// Position monitor priced from stored market conditions, falling back
    /// to the configured default price.
    pub fn position_monitor(&self) -> PositionMonitor<MarketConditionPriceProvider> {
        let provider = Arc::new(MarketConditionPriceProvider::new(
            Arc::clone(&self.repo),
            Some(self.config.monitor.default_price),
        ));
        PositionMonitor::new(
            Arc::clone(&self.service),
            provider,
            self.config.monitor.clone(),
        )
    }

    /// Run until Ctrl-C.
    pub async fn run(self) -> AppResult<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for Ctrl-C, shutting down");
            }
        })
        .await
    }

    /// Run until `signal` completes, then stop the monitor and wait for it.
    pub async fn run_until<F>(self, signal: F) -> AppResult<()>
    where
        F: Future<Output = ()>,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let monitor = self.position_monitor();
        let monitor_handle = tokio::spawn(monitor.run(shutdown_rx));

        info!(
            account_balance = %self.config.account.balance,
            monitor_enabled = self.config.monitor.enabled,
            "Laabhum core running"
        );

        signal.await;
        info!("Shutdown requested");

        // The monitor may already have exited when disabled.
        let _ = shutdown_tx.send(true);
        monitor_handle
            .await
            .map_err(|e| AppError::Task(format!("position monitor task failed: {e}")))?;

        if self.config.telemetry.dump_metrics_on_shutdown {
            let metrics = Metrics::render()?;
            info!(metrics = %metrics, "Final metrics");
        }

        info!(
            orders = self.repo.order_count(),
            open_positions = self.repo.get_open_positions().len(),
            "Laabhum core stopped"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use laabhum_core::{Order, OrderSide, OrderStatus, OrderType, Price, Quantity};
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_wires_shared_store() {
        let app = Application::new(AppConfig::default()).unwrap();
        let created = app
            .service()
            .create_order(Order::new(
                "XYZ",
                OrderSide::Buy,
                OrderType::Limit,
                Quantity(1),
                Price::new(dec!(10)),
            ))
            .unwrap();
        assert_eq!(app.repository().get_order(&created.id).unwrap().status, OrderStatus::Pending);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = AppConfig::default();
        config.monitor.check_interval_ms = 0;
        assert!(Application::new(config).is_err());
    }

    #[tokio::test]
    async fn test_run_until_stops_monitor() {
        let mut config = AppConfig::default();
        config.monitor.check_interval_ms = 5;
        config.telemetry.dump_metrics_on_shutdown = true;
        let app = Application::new(config).unwrap();

        app.run_until(tokio::time::sleep(std::time::Duration::from_millis(20)))
            .await
            .unwrap();
    }
}
