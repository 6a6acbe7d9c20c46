//! Laabhum order-management core.
//!
//! Process wiring for the in-memory order core:
//! - Configuration (TOML file plus `LAABHUM_*` overrides)
//! - Store, order service and cascade engine construction
//! - Background position monitor with graceful shutdown

pub mod app;
pub mod config;
pub mod error;

pub use app::Application;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
