//! Order service: validation, status derivation, simulated fills.
//!
//! Every operation validates before touching the store, then performs its
//! mutation through the [`Repository`]. A fill (an order entering
//! `Executed`) appends a trade to the ledger and, for buys, opens a
//! position.

use std::sync::Arc;

use laabhum_core::{
    new_entity_id, CtcOrder, OmsError, OmsResult, Order, OrderSide, OrderStatus, OrderType,
    Position, Price, ScalperOrder, Trade,
};
use laabhum_store::{OrderFilter, Repository};
use laabhum_telemetry::Metrics;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::requests::{OrderChanges, OrderRequest};
use crate::sizing::{scalper_quantity, DEFAULT_ACCOUNT_BALANCE};

/// Order service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderServiceConfig {
    /// Reference balance used for scalper sizing.
    pub account_balance: Decimal,
}

impl Default for OrderServiceConfig {
    fn default() -> Self {
        Self {
            account_balance: DEFAULT_ACCOUNT_BALANCE,
        }
    }
}

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    TakeProfit,
    Requested,
}

impl CloseReason {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TakeProfit => "take_profit",
            Self::Requested => "requested",
        }
    }
}

/// Entry point for single-order operations.
pub struct OrderService {
    repo: Arc<Repository>,
    config: OrderServiceConfig,
}

impl OrderService {
    pub fn new(repo: Arc<Repository>, config: OrderServiceConfig) -> Self {
        Self { repo, config }
    }

    pub fn repository(&self) -> &Arc<Repository> {
        &self.repo
    }

    pub fn account_balance(&self) -> Decimal {
        self.config.account_balance
    }

    /// Create an order.
    ///
    /// Market orders fill immediately; every other type rests as `Pending`.
    pub fn create_order(&self, mut order: Order) -> OmsResult<Order> {
        validate_price_quantity(&order).map_err(|e| rejected("create_order", e))?;

        order.status = order.order_type.initial_status();
        let inserted = self
            .repo
            .insert_order(order)
            .map_err(|e| rejected("create_order", e))?;

        if !inserted.is_new() {
            return Ok(inserted.into_inner());
        }

        let order = inserted.into_inner();
        Metrics::order_created(&order.order_type.to_string(), &order.status.to_string());
        info!(
            order_id = %order.id,
            symbol = %order.symbol,
            side = %order.side,
            order_type = %order.order_type,
            quantity = %order.quantity,
            price = %order.price,
            status = %order.status,
            "Order created"
        );

        if order.status == OrderStatus::Executed {
            self.on_fill(&order)?;
        }
        Ok(order)
    }

    /// Validate a client request and create the order it describes.
    pub fn submit(&self, request: OrderRequest) -> OmsResult<Order> {
        request.validate().map_err(|e| rejected("submit", e))?;
        self.create_order(request.into_order())
    }

    /// Parse a JSON request and submit it.
    pub fn submit_json(&self, payload: &str) -> OmsResult<Order> {
        let request = OrderRequest::from_json(payload).map_err(|e| rejected("submit", e))?;
        self.submit(request)
    }

    /// Re-derive the status of a stored order from its type.
    pub fn execute_order(&self, order: &Order) -> OmsResult<Order> {
        let existing = self
            .repo
            .get_order(&order.id)
            .map_err(|e| rejected("execute_order", e))?;
        self.transition("execute_order", &existing.id, existing.order_type.initial_status())
    }

    /// Force an order into `Executed`.
    pub fn fill_order(&self, id: &str) -> OmsResult<Order> {
        self.transition("fill_order", id, OrderStatus::Executed)
    }

    /// Cancel an order. Cancelling a cancelled order succeeds.
    pub fn cancel_order(&self, id: &str) -> OmsResult<Order> {
        self.transition("cancel_order", id, OrderStatus::Cancelled)
    }

    /// Mark an order deleted.
    pub fn delete_order(&self, id: &str) -> OmsResult<Order> {
        self.transition("delete_order", id, OrderStatus::Deleted)
    }

    pub fn get_order(&self, id: &str) -> OmsResult<Order> {
        self.repo.get_order(id)
    }

    pub fn get_orders(&self, filter: &OrderFilter) -> Vec<Order> {
        self.repo.get_orders(filter)
    }

    /// Fills recorded under `parent_id`. Unknown ids yield an empty list.
    pub fn get_trades(&self, parent_id: &str) -> Vec<Trade> {
        self.repo.get_trades(parent_id)
    }

    /// Change price, quantity or protective levels of a pending order.
    pub fn modify_order(&self, id: &str, changes: &OrderChanges) -> OmsResult<Order> {
        let mut order = self
            .repo
            .get_order(id)
            .map_err(|e| rejected("modify_order", e))?;

        if !order.status.is_modifiable() {
            return Err(rejected(
                "modify_order",
                OmsError::InvalidTransition(format!(
                    "order {id} is {} and can no longer be modified",
                    order.status
                )),
            ));
        }

        changes.apply_to(&mut order);
        validate_price_quantity(&order).map_err(|e| rejected("modify_order", e))?;

        let order = self
            .repo
            .update_order(order)
            .map_err(|e| rejected("modify_order", e))?;
        debug!(order_id = %id, price = %order.price, quantity = %order.quantity, "Order modified");
        Ok(order)
    }

    /// Size and store a scalper order from the configured account balance.
    pub fn create_scalper_order(&self, mut order: ScalperOrder) -> OmsResult<ScalperOrder> {
        order.quantity = scalper_quantity(
            self.config.account_balance,
            order.risk_percentage,
            order.price,
            order.stop_loss,
        )
        .map_err(|e| rejected("create_scalper_order", e))?;

        let order = self
            .repo
            .create_scalper_order(order)
            .map_err(|e| rejected("create_scalper_order", e))?;
        info!(
            scalper_id = %order.id,
            symbol = %order.symbol,
            quantity = %order.quantity,
            price = %order.price,
            stop_loss = %order.stop_loss,
            "Scalper order created"
        );
        Ok(order)
    }

    /// Store a close-the-cycle order along with its pending companion order.
    ///
    /// The companion shares the CTC id, so it can be cancelled or filled
    /// through the ordinary order operations.
    pub fn create_ctc(&self, mut ctc: CtcOrder) -> OmsResult<CtcOrder> {
        if !ctc.price.is_positive() {
            return Err(rejected("create_ctc", OmsError::validation("invalid order price")));
        }
        if ctc.quantity.is_zero() {
            return Err(rejected("create_ctc", OmsError::validation("invalid order quantity")));
        }

        if ctc.id.is_empty() {
            ctc.id = new_entity_id();
        }
        ctc.status = OrderStatus::Pending;

        let companion = Order::new(
            ctc.symbol.clone(),
            ctc.side,
            OrderType::Ctc,
            ctc.quantity,
            ctc.price,
        )
        .with_id(ctc.id.clone())
        .with_parent(ctc.parent_id.clone());
        self.create_order(companion)?;

        let ctc = self
            .repo
            .create_ctc_order(ctc)
            .map_err(|e| rejected("create_ctc", e))?;
        info!(ctc_id = %ctc.id, parent_id = %ctc.parent_id, symbol = %ctc.symbol, "CTC order created");
        Ok(ctc)
    }

    /// Close an open position with a market sell at `exit_price`.
    ///
    /// The position is closed before the sell is created, so concurrent
    /// callers emit at most one closing order. Returns the closing order.
    pub fn close_position(
        &self,
        position_id: &str,
        exit_price: Price,
        reason: CloseReason,
    ) -> OmsResult<Order> {
        if !exit_price.is_positive() {
            return Err(rejected(
                "close_position",
                OmsError::validation("invalid exit price"),
            ));
        }
        let position = self
            .repo
            .close_position(position_id)
            .map_err(|e| rejected("close_position", e))?;

        let closing = self.create_order(Order::new(
            position.symbol.clone(),
            OrderSide::Sell,
            OrderType::Market,
            position.quantity,
            exit_price,
        ))?;

        Metrics::position_closed(reason.as_str());
        info!(
            position_id = %position_id,
            symbol = %position.symbol,
            exit_price = %exit_price,
            closing_order = %closing.id,
            reason = reason.as_str(),
            "Position closed"
        );
        Ok(closing)
    }

    fn transition(&self, operation: &str, id: &str, status: OrderStatus) -> OmsResult<Order> {
        let update = self
            .repo
            .update_order_status(id, status)
            .map_err(|e| rejected(operation, e))?;

        if update.changed() {
            Metrics::order_transition(&status.to_string());
            debug!(order_id = %id, from = %update.previous, to = %status, operation, "Order transitioned");
            if status == OrderStatus::Executed {
                self.on_fill(&update.order)?;
            }
        }
        Ok(update.order)
    }

    fn on_fill(&self, order: &Order) -> OmsResult<()> {
        let trade = Trade::from_fill(order);
        debug!(trade_id = %trade.id, order_id = %order.id, group = %trade.parent_id, "Fill recorded");
        self.repo.record_trade(trade);
        Metrics::trade_recorded();

        if order.side == OrderSide::Buy {
            let position = self.repo.create_position(Position::from_fill(order))?;
            debug!(position_id = %position.id, order_id = %order.id, "Position opened from fill");
        }
        Ok(())
    }
}

fn validate_price_quantity(order: &Order) -> OmsResult<()> {
    if !order.price.is_positive() {
        return Err(OmsError::validation("invalid order price"));
    }
    if order.quantity.is_zero() {
        return Err(OmsError::validation("invalid order quantity"));
    }
    Ok(())
}

/// Count and log a rejected request, passing the error through.
pub(crate) fn rejected(operation: &str, err: OmsError) -> OmsError {
    Metrics::order_rejected(operation, err.kind());
    match &err {
        OmsError::NotFound(_) => debug!(operation, error = %err, "Request rejected"),
        _ => warn!(operation, error = %err, "Request rejected"),
    }
    err
}
