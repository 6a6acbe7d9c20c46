//! Prometheus metrics and structured logging for the Laabhum core.
//!
//! - Prometheus counters for order lifecycle, cascades and the position monitor
//! - Structured logging with tracing (JSON in production)

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{init_logging, DEFAULT_LOG_DIRECTIVE};
pub use metrics::Metrics;
