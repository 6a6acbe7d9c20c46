//! Prometheus metrics for the order-management core.
//!
//! Covers:
//! - Order creation and rejection counts
//! - Status transitions
//! - Cascade operations
//! - Position monitor passes, stop ratchets, and closes
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. A registration failure
//! means duplicate metric names, which must crash at startup rather than
//! fail silently. These panics only occur during static initialization.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter, register_counter_vec, register_histogram, register_int_gauge, Counter,
    CounterVec, Encoder, Histogram, IntGauge, TextEncoder,
};

use crate::error::{TelemetryError, TelemetryResult};

/// Orders accepted into the store.
/// Labels: type, status
pub static ORDERS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "laabhum_orders_total",
        "Total orders created",
        &["type", "status"]
    )
    .unwrap()
});

/// Requests rejected before any mutation.
/// Labels: operation, reason (validation/not_found/conflict/invalid_transition)
pub static ORDER_REJECTIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "laabhum_order_rejections_total",
        "Total rejected order-management requests",
        &["operation", "reason"]
    )
    .unwrap()
});

/// Order status transitions applied.
/// Labels: status
pub static ORDER_TRANSITIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "laabhum_order_transitions_total",
        "Total order status transitions",
        &["status"]
    )
    .unwrap()
});

/// Cascade operations run.
/// Labels: operation, outcome (ok/aborted)
pub static CASCADE_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "laabhum_cascade_total",
        "Total parent/child cascade operations",
        &["operation", "outcome"]
    )
    .unwrap()
});

/// Simulated fills recorded in the trade ledger.
pub static TRADES_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!("laabhum_trades_total", "Total simulated fills recorded").unwrap()
});

/// Positions closed by the monitor or on request.
/// Labels: reason
pub static POSITIONS_CLOSED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "laabhum_positions_closed_total",
        "Total positions closed",
        &["reason"]
    )
    .unwrap()
});

/// Trailing stop tightenings.
pub static STOP_RATCHETS_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "laabhum_stop_ratchets_total",
        "Total trailing stop-loss tightenings"
    )
    .unwrap()
});

/// Open positions seen by the last monitor pass.
pub static OPEN_POSITIONS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "laabhum_open_positions",
        "Open positions seen by the last monitor pass"
    )
    .unwrap()
});

/// Monitor pass duration in milliseconds.
pub static MONITOR_PASS_DURATION_MS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "laabhum_monitor_pass_duration_ms",
        "Position monitor pass duration in milliseconds",
        vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 50.0, 100.0]
    )
    .unwrap()
});

/// Facade over the metric statics.
pub struct Metrics;

impl Metrics {
    /// Record an order accepted into the store.
    pub fn order_created(order_type: &str, status: &str) {
        ORDERS_TOTAL.with_label_values(&[order_type, status]).inc();
    }

    /// Record a rejected request.
    pub fn order_rejected(operation: &str, reason: &str) {
        ORDER_REJECTIONS_TOTAL
            .with_label_values(&[operation, reason])
            .inc();
    }

    /// Record an applied status transition.
    pub fn order_transition(status: &str) {
        ORDER_TRANSITIONS_TOTAL.with_label_values(&[status]).inc();
    }

    /// Record a cascade run.
    pub fn cascade(operation: &str, completed: bool) {
        let outcome = if completed { "ok" } else { "aborted" };
        CASCADE_TOTAL.with_label_values(&[operation, outcome]).inc();
    }

    /// Record a fill.
    pub fn trade_recorded() {
        TRADES_TOTAL.inc();
    }

    /// Record a position close.
    pub fn position_closed(reason: &str) {
        POSITIONS_CLOSED_TOTAL.with_label_values(&[reason]).inc();
    }

    /// Record a trailing stop tightening.
    pub fn stop_ratcheted() {
        STOP_RATCHETS_TOTAL.inc();
    }

    /// Record a completed monitor pass.
    pub fn monitor_pass(open_positions: usize, duration_ms: f64) {
        OPEN_POSITIONS.set(open_positions as i64);
        MONITOR_PASS_DURATION_MS.observe(duration_ms);
    }

    /// Render every registered metric in the Prometheus text format.
    pub fn render() -> TelemetryResult<String> {
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&prometheus::gather(), &mut buf)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_increment() {
        let before = ORDERS_TOTAL.with_label_values(&["MARKET", "EXECUTED"]).get();
        Metrics::order_created("MARKET", "EXECUTED");
        let after = ORDERS_TOTAL.with_label_values(&["MARKET", "EXECUTED"]).get();
        assert!((after - before - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_render_contains_registered_metrics() {
        Metrics::cascade("cancel_all_child_orders", true);
        Metrics::stop_ratcheted();

        let text = Metrics::render().unwrap();
        assert!(text.contains("laabhum_cascade_total"));
        assert!(text.contains("laabhum_stop_ratchets_total"));
    }
}
