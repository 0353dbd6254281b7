// core/src/machine.rs

//! Order lifecycle transitions.
//!
//! Reachability is a function of three things: the chain the order sits on
//! (cross-border fulfillment or the legacy four-step chain), the branch
//! states (cancellation and refund), and who is asking. Admins move forward
//! along the same chain, skipping stops freely, because cross-border
//! tracking routinely skips scan points. Customers get exactly one move:
//! cancelling an order that has not left its initial state. Everything else
//! a customer wants goes through the cancellation workflow.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::{
  Actor, ActorKind, Order, OrderItem, OrderStatus, OrderStatusHistory, StockReason, StockRef,
};
use crate::error::{CoreError, CoreResult};
use crate::ledger::InventoryLedger;
use crate::store::{Store, Txn};

/// Whether `role` may move an order from `from` to `to`.
pub fn transition_allowed(from: OrderStatus, to: OrderStatus, role: ActorKind) -> bool {
  if from.is_terminal() || from == to {
    return false;
  }
  match role {
    ActorKind::Customer => to == OrderStatus::Cancelled && from.is_initial(),
    ActorKind::Admin => match to {
      OrderStatus::Cancelled => true,
      OrderStatus::ProcessingForRefund => refund_eligible(from),
      OrderStatus::Refunded => from == OrderStatus::ProcessingForRefund,
      _ => chain_forward(from, to),
    },
  }
}

/// Refunds open only once payment can have been taken: partially_paid
/// onward on the fulfillment chain, processing onward on the legacy one.
fn refund_eligible(from: OrderStatus) -> bool {
  if let Some(idx) = from.fulfillment_index() {
    return idx >= 2;
  }
  if let Some(idx) = from.legacy_index() {
    return idx >= 1;
  }
  false
}

fn chain_forward(from: OrderStatus, to: OrderStatus) -> bool {
  if let (Some(a), Some(b)) = (from.fulfillment_index(), to.fulfillment_index()) {
    return b > a;
  }
  if let (Some(a), Some(b)) = (from.legacy_index(), to.legacy_index()) {
    return b > a;
  }
  false
}

#[derive(Clone)]
pub struct OrderStateMachine {
  store: Arc<Store>,
  ledger: InventoryLedger,
}

impl OrderStateMachine {
  pub fn new(store: Arc<Store>) -> Self {
    let ledger = InventoryLedger::new(store.clone());
    OrderStateMachine { store, ledger }
  }

  /// Applies a status change together with its audit row.
  #[instrument(skip(self, note), fields(order_id = %order_id, to = %new_status))]
  pub fn transition(
    &self,
    order_id: Uuid,
    new_status: OrderStatus,
    actor: Actor,
    note: Option<String>,
  ) -> CoreResult<Order> {
    self
      .store
      .transaction(|txn| self.transition_in(txn, order_id, new_status, actor, note))
  }

  /// Transition step for composing into a larger transaction; cancellation
  /// approval runs this alongside the stock restore.
  pub fn transition_in(
    &self,
    txn: &mut Txn<'_>,
    order_id: Uuid,
    new_status: OrderStatus,
    actor: Actor,
    note: Option<String>,
  ) -> CoreResult<Order> {
    let mut order = txn.require_order(order_id)?;
    let from = order.status;
    if !transition_allowed(from, new_status, actor.kind()) {
      return Err(CoreError::InvalidTransition {
        from,
        to: new_status,
        role: actor.kind(),
      });
    }
    let now = Utc::now();
    order.status = new_status;
    order.updated_at = now;
    txn.put_order(order.clone());
    txn.append_history(OrderStatusHistory {
      id: Uuid::new_v4(),
      order_id,
      old_status: Some(from),
      new_status,
      actor,
      note,
      created_at: now,
    });
    info!(from = %from, order_number = %order.order_number, "order status changed");
    Ok(order)
  }

  /// Deletes an order with its items and history.
  ///
  /// Allowed only from an initial state or from cancelled/refunded. An
  /// initial-state delete returns the reserved stock; a cancelled or
  /// refunded order already had its stock restored, so deleting it must
  /// not restore again. Ledger rows stay behind either way.
  #[instrument(skip(self), fields(order_id = %order_id))]
  pub fn delete(&self, order_id: Uuid, actor: Actor) -> CoreResult<()> {
    self.store.transaction(|txn| {
      let order = txn.require_order(order_id)?;
      let already_restored = matches!(
        order.status,
        OrderStatus::Cancelled | OrderStatus::Refunded
      );
      if !order.status.is_initial() && !already_restored {
        return Err(CoreError::Conflict(format!(
          "order {} cannot be deleted while in status '{}'",
          order.order_number, order.status
        )));
      }
      if order.status.is_initial() {
        for item in txn.items_for_order(order_id) {
          if let Some(product_id) = item.product_id {
            self.ledger.adjust_in(
              txn,
              product_id,
              i64::from(item.quantity),
              StockReason::OrderDeleted,
              Some(StockRef::Order(order_id)),
              actor,
              None,
              true,
            )?;
          }
        }
      }
      txn.delete_order(order_id);
      info!(order_number = %order.order_number, status = %order.status, "order deleted");
      Ok(())
    })
  }

  /// Records supplier-side sourcing metadata on an order line. Never
  /// touches pricing; lines are otherwise immutable after checkout.
  pub fn update_item_sourcing(
    &self,
    order_id: Uuid,
    item_id: Uuid,
    sourcing_ref: Option<String>,
    sourcing_note: Option<String>,
  ) -> CoreResult<OrderItem> {
    self.store.transaction(|txn| {
      txn.require_order(order_id)?;
      let mut item = txn
        .item(item_id)
        .filter(|item| item.order_id == order_id)
        .ok_or_else(|| CoreError::not_found("order item", item_id))?;
      if let Some(reference) = sourcing_ref {
        item.sourcing_ref = Some(reference);
      }
      if let Some(note) = sourcing_note {
        item.sourcing_note = Some(note);
      }
      txn.put_item(item.clone());
      Ok(item)
    })
  }
}
