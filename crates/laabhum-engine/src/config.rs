//! Application configuration.

use crate::error::{AppError, AppResult};
use laabhum_oms::{OrderServiceConfig, DEFAULT_ACCOUNT_BALANCE};
use laabhum_position::MonitorConfig;
use laabhum_telemetry::DEFAULT_LOG_DIRECTIVE;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config path used when neither `--config` nor `LAABHUM_CONFIG` is set.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Environment prefix for per-key overrides, e.g. `LAABHUM_ACCOUNT__BALANCE`.
pub const ENV_PREFIX: &str = "LAABHUM";

/// Reference account used for risk-based sizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Account balance scalper orders are sized against. Default: 10,000.
    #[serde(default = "default_balance")]
    pub balance: Decimal,
}

fn default_balance() -> Decimal {
    DEFAULT_ACCOUNT_BALANCE
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            balance: default_balance(),
        }
    }
}

/// Logging and metrics settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// `tracing` filter directive. `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Log the Prometheus text exposition when the process stops.
    #[serde(default)]
    pub dump_metrics_on_shutdown: bool,
}

fn default_log_level() -> String {
    DEFAULT_LOG_DIRECTIVE.to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dump_metrics_on_shutdown: false,
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub account: AccountConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from `path` (if it exists) layered under
    /// `LAABHUM_*` environment overrides. A missing file yields defaults.
    pub fn load(path: &str) -> AppResult<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from(Path::new(path)).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a specific TOML file, without environment overrides.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the services cannot run with.
    pub fn validate(&self) -> AppResult<()> {
        if self.account.balance <= Decimal::ZERO {
            return Err(AppError::Config(format!(
                "account.balance must be positive, got {}",
                self.account.balance
            )));
        }
        if self.monitor.check_interval_ms == 0 {
            return Err(AppError::Config(
                "monitor.check_interval_ms must be greater than zero".to_string(),
            ));
        }
        if !self.monitor.default_price.is_positive() {
            return Err(AppError::Config(format!(
                "monitor.default_price must be positive, got {}",
                self.monitor.default_price
            )));
        }
        Ok(())
    }

    /// Order service settings derived from this config.
    #[must_use]
    pub fn order_service(&self) -> OrderServiceConfig {
        OrderServiceConfig {
            account_balance: self.account.balance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use laabhum_core::Price;
    use rust_decimal_macros::dec;
    use std::io::Write;

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "laabhum-{name}-{}.toml",
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.account.balance, dec!(10000));
        assert!(config.monitor.enabled);
        assert_eq!(config.telemetry.log_level, DEFAULT_LOG_DIRECTIVE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("[account]"));
        assert!(toml_str.contains("check_interval_ms"));
        assert!(toml_str.contains("log_level"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let path = write_temp(
            "partial",
            r#"
[account]
balance = "50000"

[monitor]
check_interval_ms = 250
"#,
        );
        let config = AppConfig::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(config.account.balance, dec!(50000));
        assert_eq!(config.monitor.check_interval_ms, 250);
        assert_eq!(config.monitor.default_price, Price::new(dec!(100)));
        assert!(!config.telemetry.dump_metrics_on_shutdown);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let config = AppConfig::load("/nonexistent/laabhum.toml").unwrap();
        assert_eq!(config.account.balance, AppConfig::default().account.balance);
    }

    #[test]
    fn test_invalid_balance_rejected() {
        let path = write_temp("invalid", "[account]\nbalance = \"0\"\n");
        let err = AppConfig::from_file(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_order_service_config() {
        let mut config = AppConfig::default();
        config.account.balance = dec!(2500);
        assert_eq!(config.order_service().account_balance, dec!(2500));
    }
}
