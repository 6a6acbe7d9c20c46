//! Parent/child cascade operations.
//!
//! Children are orders whose `parent_id` names the parent. Bulk operations
//! walk the children oldest first and stop at the first failure; steps that
//! already ran are not rolled back. Re-running a cascade is safe because
//! same-status transitions are no-ops.

use std::sync::Arc;

use laabhum_core::{OmsError, OmsResult, Order};
use laabhum_telemetry::Metrics;
use tracing::{debug, info, warn};

use crate::requests::OrderChanges;
use crate::service::{rejected, OrderService};

/// What a bulk cascade does to each child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChildAction {
    Fill,
    Cancel,
}

/// Applies order operations to a parent's children.
pub struct CascadeEngine {
    service: Arc<OrderService>,
}

impl CascadeEngine {
    pub fn new(service: Arc<OrderService>) -> Self {
        Self { service }
    }

    /// Fill every child of `parent_id`.
    ///
    /// Fails with `NotFound` and changes nothing when the parent has no
    /// children.
    pub fn execute_all_child_trades(&self, parent_id: &str) -> OmsResult<Vec<Order>> {
        const OP: &str = "execute_all_child_trades";
        require_id(OP, "parent id", parent_id)?;

        if self.service.repository().children_of(parent_id).is_empty() {
            Metrics::cascade(OP, false);
            return Err(rejected(
                OP,
                OmsError::not_found(format!("no child orders for parent {parent_id}")),
            ));
        }
        self.apply_to_children(OP, parent_id, ChildAction::Fill)
    }

    /// Fill one child of `parent_id`.
    pub fn execute_specific_child(&self, parent_id: &str, child_id: &str) -> OmsResult<Order> {
        const OP: &str = "execute_specific_child";
        self.verified_child(OP, parent_id, child_id)?;
        self.service.fill_order(child_id)
    }

    /// Cancel one child of `parent_id`.
    pub fn cancel_specific_child_order(&self, parent_id: &str, child_id: &str) -> OmsResult<Order> {
        const OP: &str = "cancel_specific_child_order";
        self.verified_child(OP, parent_id, child_id)?;
        self.service.cancel_order(child_id)
    }

    /// Exit one child of `parent_id`. Exiting cancels the child.
    pub fn exit_specific_child(&self, parent_id: &str, child_id: &str) -> OmsResult<Order> {
        const OP: &str = "exit_specific_child";
        self.verified_child(OP, parent_id, child_id)?;
        self.service.cancel_order(child_id)
    }

    /// Cancel every child of `parent_id`. No children is a successful no-op.
    pub fn cancel_all_child_orders(&self, parent_id: &str) -> OmsResult<Vec<Order>> {
        const OP: &str = "cancel_all_child_orders";
        require_id(OP, "parent id", parent_id)?;
        self.apply_to_children(OP, parent_id, ChildAction::Cancel)
    }

    /// Exit every child of `parent_id`.
    pub fn exit_all_trades(&self, parent_id: &str) -> OmsResult<Vec<Order>> {
        const OP: &str = "exit_all_trades";
        require_id(OP, "parent id", parent_id)?;
        self.apply_to_children(OP, parent_id, ChildAction::Cancel)
    }

    /// Same as [`CascadeEngine::exit_all_trades`].
    pub fn exit_child_trades(&self, parent_id: &str) -> OmsResult<Vec<Order>> {
        self.exit_all_trades(parent_id)
    }

    /// Mark the parent order deleted. Children are left untouched.
    pub fn delete_parent_order(&self, parent_id: &str) -> OmsResult<Order> {
        const OP: &str = "delete_parent_order";
        require_id(OP, "parent id", parent_id)?;
        let parent = self.service.delete_order(parent_id)?;
        Metrics::cascade(OP, true);
        info!(parent_id = %parent_id, "Parent order deleted");
        Ok(parent)
    }

    /// Arm the stop loss of one child.
    pub fn activate_stop_loss(&self, parent_id: &str, child_id: &str) -> OmsResult<Order> {
        self.set_stop_loss("activate_stop_loss", parent_id, child_id, true)
    }

    /// Disarm the stop loss of one child.
    pub fn cancel_stop_loss(&self, parent_id: &str, child_id: &str) -> OmsResult<Order> {
        self.set_stop_loss("cancel_stop_loss", parent_id, child_id, false)
    }

    /// Modify one pending child of `parent_id`.
    pub fn modify_child_order(
        &self,
        parent_id: &str,
        child_id: &str,
        changes: &OrderChanges,
    ) -> OmsResult<Order> {
        const OP: &str = "modify_child_order";
        self.verified_child(OP, parent_id, child_id)?;
        self.service.modify_order(child_id, changes)
    }

    fn set_stop_loss(
        &self,
        operation: &str,
        parent_id: &str,
        child_id: &str,
        active: bool,
    ) -> OmsResult<Order> {
        self.verified_child(operation, parent_id, child_id)?;
        let order = self
            .service
            .repository()
            .set_stop_loss_activated(child_id, active)
            .map_err(|e| rejected(operation, e))?;
        debug!(parent_id = %parent_id, child_id = %child_id, active, "Stop loss flag updated");
        Ok(order)
    }

    fn apply_to_children(
        &self,
        operation: &str,
        parent_id: &str,
        action: ChildAction,
    ) -> OmsResult<Vec<Order>> {
        let children = self.service.repository().children_of(parent_id);
        let mut updated = Vec::with_capacity(children.len());

        for child in &children {
            let result = match action {
                ChildAction::Fill => self.service.fill_order(&child.id),
                ChildAction::Cancel => self.service.cancel_order(&child.id),
            };
            match result {
                Ok(order) => updated.push(order),
                Err(e) => {
                    Metrics::cascade(operation, false);
                    warn!(
                        operation,
                        parent_id = %parent_id,
                        child_id = %child.id,
                        done = updated.len(),
                        remaining = children.len() - updated.len(),
                        error = %e,
                        "Cascade aborted"
                    );
                    return Err(e);
                }
            }
        }

        Metrics::cascade(operation, true);
        info!(operation, parent_id = %parent_id, children = updated.len(), "Cascade completed");
        Ok(updated)
    }

    /// Check both ids and that `child_id` belongs to `parent_id`.
    fn verified_child(&self, operation: &str, parent_id: &str, child_id: &str) -> OmsResult<Order> {
        require_id(operation, "parent id", parent_id)?;
        require_id(operation, "child id", child_id)?;

        let child = self
            .service
            .get_order(child_id)
            .map_err(|e| rejected(operation, e))?;
        if child.parent_id != parent_id {
            return Err(rejected(
                operation,
                OmsError::not_found(format!("order {child_id} is not a child of {parent_id}")),
            ));
        }
        Ok(child)
    }
}

fn require_id(operation: &str, what: &str, id: &str) -> OmsResult<()> {
    if id.trim().is_empty() {
        return Err(rejected(operation, OmsError::validation(format!("{what} is required"))));
    }
    Ok(())
}
