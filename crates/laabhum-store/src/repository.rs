//! In-memory repository for every entity the core owns.
//!
//! One store-wide `RwLock` guards all maps. Each public method takes the
//! lock once, performs a single map operation, and releases it before
//! returning; callers get clones, never references into the maps.

use std::collections::HashMap;

use chrono::Utc;
use laabhum_core::{
    new_entity_id, now_epoch_secs, CtcOrder, MarketCondition, OmsError, OmsResult, Order,
    OrderStatus, Position, PositionStatus, ScalperOrder, Trade,
};
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::filter::OrderFilter;

/// Outcome of an insert that tolerates idempotent retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inserted<T> {
    /// The record was stored by this call.
    New(T),
    /// An identical record with the same id was already stored.
    Existing(T),
}

impl<T> Inserted<T> {
    #[must_use]
    pub fn is_new(&self) -> bool {
        matches!(self, Self::New(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Self::New(v) | Self::Existing(v) => v,
        }
    }
}

/// Result of a status update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    /// The order after the update.
    pub order: Order,
    /// Status before the update.
    pub previous: OrderStatus,
}

impl StatusUpdate {
    /// Returns true if the status actually changed.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.previous != self.order.status
    }
}

#[derive(Debug, Default)]
struct StoreState {
    orders: HashMap<String, Order>,
    positions: HashMap<String, Position>,
    /// Trade ledger keyed by trade group (parent id, or own id for top-level orders).
    trades: HashMap<String, Vec<Trade>>,
    scalper_orders: HashMap<String, ScalperOrder>,
    ctc_orders: HashMap<String, CtcOrder>,
    /// Latest snapshot per symbol.
    market_conditions: HashMap<String, MarketCondition>,
}

/// Concurrency-safe in-memory store.
#[derive(Debug, Default)]
pub struct Repository {
    state: RwLock<StoreState>,
}

impl Repository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Orders
    // ------------------------------------------------------------------

    /// Store a new order, assigning `id` and `created_at` when unset.
    ///
    /// Re-submitting an identical order under an existing id returns the
    /// stored copy; a differing order under that id is a `Conflict`.
    pub fn insert_order(&self, mut order: Order) -> OmsResult<Inserted<Order>> {
        let mut state = self.state.write();

        if order.id.is_empty() {
            order.id = new_entity_id();
        } else if let Some(existing) = state.orders.get(&order.id) {
            if order.created_at == 0 {
                order.created_at = existing.created_at;
            }
            if order == *existing {
                trace!(order_id = %order.id, "Idempotent order insert");
                return Ok(Inserted::Existing(existing.clone()));
            }
            return Err(OmsError::Conflict(format!(
                "order {} already exists with different content",
                order.id
            )));
        }

        if order.created_at == 0 {
            order.created_at = now_epoch_secs();
        }

        state.orders.insert(order.id.clone(), order.clone());
        debug!(order_id = %order.id, symbol = %order.symbol, status = %order.status, "Order stored");
        Ok(Inserted::New(order))
    }

    /// Store a new order. See [`Repository::insert_order`].
    pub fn create_order(&self, order: Order) -> OmsResult<Order> {
        self.insert_order(order).map(Inserted::into_inner)
    }

    pub fn get_order(&self, id: &str) -> OmsResult<Order> {
        self.state
            .read()
            .orders
            .get(id)
            .cloned()
            .ok_or_else(|| OmsError::not_found(format!("order {id}")))
    }

    /// Replace a stored order wholesale.
    ///
    /// The status may only move forward.
    pub fn update_order(&self, order: Order) -> OmsResult<Order> {
        let mut state = self.state.write();
        let existing = state
            .orders
            .get_mut(&order.id)
            .ok_or_else(|| OmsError::not_found(format!("order {}", order.id)))?;

        if !existing.status.can_transition_to(order.status) {
            return Err(transition_error(&order.id, existing.status, order.status));
        }

        *existing = order.clone();
        Ok(order)
    }

    /// Replace only the status field of an order.
    pub fn update_order_status(&self, id: &str, status: OrderStatus) -> OmsResult<StatusUpdate> {
        let mut state = self.state.write();
        let order = state
            .orders
            .get_mut(id)
            .ok_or_else(|| OmsError::not_found(format!("order {id}")))?;

        let previous = order.status;
        if !previous.can_transition_to(status) {
            return Err(transition_error(id, previous, status));
        }
        order.status = status;

        if previous != status {
            debug!(order_id = %id, from = %previous, to = %status, "Order status updated");
        }
        Ok(StatusUpdate {
            order: order.clone(),
            previous,
        })
    }

    /// Replace only the stop-loss activation flag of an order.
    pub fn set_stop_loss_activated(&self, id: &str, active: bool) -> OmsResult<Order> {
        let mut state = self.state.write();
        let order = state
            .orders
            .get_mut(id)
            .ok_or_else(|| OmsError::not_found(format!("order {id}")))?;
        order.stop_loss_activated = active;
        Ok(order.clone())
    }

    /// All orders matching `filter`, in unspecified order.
    pub fn get_orders(&self, filter: &OrderFilter) -> Vec<Order> {
        self.state
            .read()
            .orders
            .values()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect()
    }

    /// Children of `parent_id`, oldest first (ties broken by id).
    pub fn children_of(&self, parent_id: &str) -> Vec<Order> {
        let mut children = self.get_orders(&OrderFilter::children_of(parent_id));
        children.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        children
    }

    pub fn order_count(&self) -> usize {
        self.state.read().orders.len()
    }

    // ------------------------------------------------------------------
    // Positions
    // ------------------------------------------------------------------

    pub fn create_position(&self, mut position: Position) -> OmsResult<Position> {
        let mut state = self.state.write();

        if position.id.is_empty() {
            position.id = new_entity_id();
        } else if state.positions.contains_key(&position.id) {
            return Err(OmsError::Conflict(format!(
                "position {} already exists",
                position.id
            )));
        }

        state.positions.insert(position.id.clone(), position.clone());
        debug!(
            position_id = %position.id,
            order_id = %position.order_id,
            symbol = %position.symbol,
            "Position opened"
        );
        Ok(position)
    }

    pub fn get_position(&self, id: &str) -> OmsResult<Position> {
        self.state
            .read()
            .positions
            .get(id)
            .cloned()
            .ok_or_else(|| OmsError::not_found(format!("position {id}")))
    }

    /// Write back a refreshed open position.
    ///
    /// The stored stop loss never decreases: the larger of the stored and
    /// incoming values wins. Identity fields, `opened_at` and `status`
    /// are kept from the stored record.
    pub fn update_position(&self, position: Position) -> OmsResult<Position> {
        let mut state = self.state.write();
        let existing = state
            .positions
            .get_mut(&position.id)
            .ok_or_else(|| OmsError::not_found(format!("position {}", position.id)))?;

        if existing.status == PositionStatus::Closed {
            return Err(OmsError::InvalidTransition(format!(
                "position {} is closed",
                position.id
            )));
        }

        existing.current_price = position.current_price;
        existing.stop_loss = existing.stop_loss.max(position.stop_loss);
        existing.take_profit = position.take_profit;
        existing.last_updated_at = Utc::now();
        Ok(existing.clone())
    }

    /// Move a position to `Closed`.
    pub fn close_position(&self, id: &str) -> OmsResult<Position> {
        let mut state = self.state.write();
        let position = state
            .positions
            .get_mut(id)
            .ok_or_else(|| OmsError::not_found(format!("position {id}")))?;

        if position.status == PositionStatus::Closed {
            return Err(OmsError::InvalidTransition(format!(
                "position {id} is already closed"
            )));
        }

        position.status = PositionStatus::Closed;
        position.last_updated_at = Utc::now();
        debug!(position_id = %id, symbol = %position.symbol, "Position closed");
        Ok(position.clone())
    }

    /// Every position still open, in unspecified order.
    pub fn get_open_positions(&self) -> Vec<Position> {
        self.state
            .read()
            .positions
            .values()
            .filter(|p| p.is_open())
            .cloned()
            .collect()
    }

    // ------------------------------------------------------------------
    // Trades
    // ------------------------------------------------------------------

    /// Append a fill to the trade ledger.
    pub fn record_trade(&self, trade: Trade) {
        let mut state = self.state.write();
        trace!(trade_id = %trade.id, order_id = %trade.order_id, "Trade recorded");
        state
            .trades
            .entry(trade.parent_id.clone())
            .or_default()
            .push(trade);
    }

    /// Fills grouped under `parent_id`, in recording order.
    ///
    /// An unknown parent yields an empty list.
    pub fn get_trades(&self, parent_id: &str) -> Vec<Trade> {
        self.state
            .read()
            .trades
            .get(parent_id)
            .cloned()
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Scalper and CTC orders
    // ------------------------------------------------------------------

    pub fn create_scalper_order(&self, mut order: ScalperOrder) -> OmsResult<ScalperOrder> {
        let mut state = self.state.write();

        if order.id.is_empty() {
            order.id = new_entity_id();
        } else if let Some(existing) = state.scalper_orders.get(&order.id) {
            if order.created_at == 0 {
                order.created_at = existing.created_at;
            }
            if *existing == order {
                return Ok(existing.clone());
            }
            return Err(OmsError::Conflict(format!(
                "scalper order {} already exists with different content",
                order.id
            )));
        }
        if order.created_at == 0 {
            order.created_at = now_epoch_secs();
        }

        state.scalper_orders.insert(order.id.clone(), order.clone());
        Ok(order)
    }

    pub fn get_scalper_order(&self, id: &str) -> OmsResult<ScalperOrder> {
        self.state
            .read()
            .scalper_orders
            .get(id)
            .cloned()
            .ok_or_else(|| OmsError::not_found(format!("scalper order {id}")))
    }

    pub fn create_ctc_order(&self, mut order: CtcOrder) -> OmsResult<CtcOrder> {
        let mut state = self.state.write();

        if order.id.is_empty() {
            order.id = new_entity_id();
        } else if let Some(existing) = state.ctc_orders.get(&order.id) {
            if order.timestamp == 0 {
                order.timestamp = existing.timestamp;
            }
            if *existing == order {
                return Ok(existing.clone());
            }
            return Err(OmsError::Conflict(format!(
                "ctc order {} already exists with different content",
                order.id
            )));
        }
        if order.timestamp == 0 {
            order.timestamp = now_epoch_secs();
        }

        state.ctc_orders.insert(order.id.clone(), order.clone());
        Ok(order)
    }

    pub fn get_ctc_order(&self, id: &str) -> OmsResult<CtcOrder> {
        self.state
            .read()
            .ctc_orders
            .get(id)
            .cloned()
            .ok_or_else(|| OmsError::not_found(format!("ctc order {id}")))
    }

    // ------------------------------------------------------------------
    // Market conditions
    // ------------------------------------------------------------------

    /// Store the latest snapshot for its symbol, replacing any previous one.
    pub fn save_market_condition(&self, condition: MarketCondition) {
        let mut state = self.state.write();
        state
            .market_conditions
            .insert(condition.symbol.clone(), condition);
    }

    pub fn get_latest_market_condition(&self, symbol: &str) -> OmsResult<MarketCondition> {
        self.state
            .read()
            .market_conditions
            .get(symbol)
            .cloned()
            .ok_or_else(|| OmsError::not_found(format!("market condition for {symbol}")))
    }
}

fn transition_error(id: &str, from: OrderStatus, to: OrderStatus) -> OmsError {
    OmsError::InvalidTransition(format!("order {id} cannot move from {from} to {to}"))
}
