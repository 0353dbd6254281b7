// core/src/cancellation.rs

//! Cancellation: the request/approve/reject workflow plus direct cancel.
//!
//! Approval and direct cancel share one transactional step that moves the
//! order to `cancelled`, stamps the cancellation fields and restores every
//! catalog line's stock through the ledger. The quantities come from the
//! order items as captured at checkout, never from live catalog state, so a
//! restore round-trips exactly what the order reserved. A second approval
//! hits the `cancelled_at` guard and conflicts instead of restoring twice.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::collaborators::{notify, NotificationKind, NotificationSink, OrderNotification};
use crate::domain::{Actor, Order, OrderStatus, StockReason, StockRef};
use crate::error::{CoreError, CoreResult};
use crate::ledger::InventoryLedger;
use crate::machine::OrderStateMachine;
use crate::store::{Store, Txn};

#[derive(Clone)]
pub struct CancellationWorkflow {
  store: Arc<Store>,
  machine: OrderStateMachine,
  ledger: InventoryLedger,
  notifications: Arc<dyn NotificationSink>,
}

impl CancellationWorkflow {
  pub fn new(store: Arc<Store>, notifications: Arc<dyn NotificationSink>) -> Self {
    CancellationWorkflow {
      machine: OrderStateMachine::new(store.clone()),
      ledger: InventoryLedger::new(store.clone()),
      store,
      notifications,
    }
  }

  /// Opens a cancellation request. The order keeps its status until an
  /// admin decides; a second request while one is open conflicts.
  #[instrument(skip(self, reason), fields(order_id = %order_id))]
  pub async fn request(
    &self,
    order_id: Uuid,
    requested_by: Actor,
    reason: Option<String>,
  ) -> CoreResult<Order> {
    let order = self.store.transaction(|txn| {
      let mut order = txn.require_order(order_id)?;
      require_ownership(&order, requested_by)?;
      if order.status.is_terminal() {
        return Err(CoreError::Conflict(format!(
          "order {} is already {}",
          order.order_number, order.status
        )));
      }
      if order.cancellation_pending() {
        return Err(CoreError::Conflict(format!(
          "order {} already has an open cancellation request",
          order.order_number
        )));
      }
      let now = Utc::now();
      order.cancellation_requested_at = Some(now);
      order.cancellation_reason = reason;
      order.cancellation_requested_by = Some(requested_by.kind());
      order.updated_at = now;
      txn.put_order(order.clone());
      Ok(order)
    })?;
    info!(order_number = %order.order_number, "cancellation requested");
    self
      .dispatch(NotificationKind::CancellationRequested, &order)
      .await;
    Ok(order)
  }

  /// Approves an open request: cancel transition, stamps, stock restore,
  /// one transaction.
  #[instrument(skip(self, note), fields(order_id = %order_id))]
  pub async fn approve(
    &self,
    order_id: Uuid,
    admin_id: Uuid,
    note: Option<String>,
  ) -> CoreResult<Order> {
    let actor = Actor::Admin(admin_id);
    let order = self.store.transaction(|txn| {
      let order = txn.require_order(order_id)?;
      // checked before the pending-request guard so a double approval
      // reports "already cancelled", not "no request"
      if order.cancelled_at.is_some() {
        return Err(CoreError::Conflict(format!(
          "order {} is already cancelled",
          order.order_number
        )));
      }
      if order.cancellation_requested_at.is_none() {
        return Err(CoreError::Conflict(format!(
          "order {} has no cancellation request to approve",
          order.order_number
        )));
      }
      self.finish_cancellation(txn, order_id, actor, note)
    })?;
    info!(order_number = %order.order_number, "cancellation approved");
    self
      .dispatch(NotificationKind::CancellationApproved, &order)
      .await;
    self.dispatch(NotificationKind::OrderCancelled, &order).await;
    Ok(order)
  }

  /// Rejects an open request and clears the request fields; the order
  /// continues through fulfillment untouched.
  #[instrument(skip(self, note), fields(order_id = %order_id, admin_id = %admin_id))]
  pub async fn reject(
    &self,
    order_id: Uuid,
    admin_id: Uuid,
    note: Option<String>,
  ) -> CoreResult<Order> {
    let order = self.store.transaction(|txn| {
      let mut order = txn.require_order(order_id)?;
      if !order.cancellation_pending() {
        return Err(CoreError::Conflict(format!(
          "order {} has no cancellation request to reject",
          order.order_number
        )));
      }
      order.cancellation_requested_at = None;
      order.cancellation_reason = None;
      order.cancellation_requested_by = None;
      order.updated_at = Utc::now();
      txn.put_order(order.clone());
      Ok(order)
    })?;
    info!(order_number = %order.order_number, note = ?note, "cancellation rejected");
    self
      .dispatch(NotificationKind::CancellationRejected, &order)
      .await;
    Ok(order)
  }

  /// Cancels without a prior request. Admins may do this from any
  /// non-terminal status; customers only while the order still sits in an
  /// initial state (the state machine enforces the role rules).
  #[instrument(skip(self, reason), fields(order_id = %order_id))]
  pub async fn cancel(
    &self,
    order_id: Uuid,
    cancelled_by: Actor,
    reason: Option<String>,
  ) -> CoreResult<Order> {
    let order = self.store.transaction(|txn| {
      let order = txn.require_order(order_id)?;
      require_ownership(&order, cancelled_by)?;
      if order.cancelled_at.is_some() {
        return Err(CoreError::Conflict(format!(
          "order {} is already cancelled",
          order.order_number
        )));
      }
      let mut cancelled =
        self.finish_cancellation(txn, order_id, cancelled_by, reason.clone())?;
      if cancelled.cancellation_reason.is_none() {
        cancelled.cancellation_reason = reason;
        txn.put_order(cancelled.clone());
      }
      Ok(cancelled)
    })?;
    info!(order_number = %order.order_number, "order cancelled");
    self.dispatch(NotificationKind::OrderCancelled, &order).await;
    Ok(order)
  }

  /// The shared transactional tail: transition to `cancelled` (which also
  /// writes the history row), stamp the cancellation fields, restore stock
  /// for every catalog line.
  fn finish_cancellation(
    &self,
    txn: &mut Txn<'_>,
    order_id: Uuid,
    actor: Actor,
    note: Option<String>,
  ) -> CoreResult<Order> {
    let mut order =
      self
        .machine
        .transition_in(txn, order_id, OrderStatus::Cancelled, actor, note)?;
    let now = Utc::now();
    order.cancelled_at = Some(now);
    order.cancelled_by = Some(actor.kind());
    order.updated_at = now;
    txn.put_order(order.clone());
    for item in txn.items_for_order(order_id) {
      if let Some(product_id) = item.product_id {
        self.ledger.adjust_in(
          txn,
          product_id,
          i64::from(item.quantity),
          StockReason::OrderCancelled,
          Some(StockRef::Order(order_id)),
          actor,
          None,
          true,
        )?;
      }
    }
    Ok(order)
  }

  async fn dispatch(&self, kind: NotificationKind, order: &Order) {
    notify(
      self.notifications.as_ref(),
      OrderNotification {
        kind,
        order_id: order.id,
        order_number: order.order_number.clone(),
        customer_id: order.customer_id,
        customer_name: None,
        total_amount: order.total_amount,
        status: order.status,
      },
    )
    .await;
  }
}

/// Customers may only act on their own orders; the mismatch reads as
/// not-found so the call leaks nothing. Admins pass through.
fn require_ownership(order: &Order, actor: Actor) -> CoreResult<()> {
  if let Actor::Customer(customer_id) = actor {
    if order.customer_id != customer_id {
      return Err(CoreError::not_found("order", order.id));
    }
  }
  Ok(())
}
