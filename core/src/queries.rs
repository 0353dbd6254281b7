// core/src/queries.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Order, OrderItem, OrderStatus, OrderStatusHistory};
use crate::error::{CoreError, CoreResult};
use crate::store::Store;

/// The read shape handed out to callers: an order with its lines and the
/// totals breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
  pub id: Uuid,
  pub order_number: String,
  pub customer_id: Uuid,
  pub status: OrderStatus,
  pub items: Vec<OrderItem>,
  pub subtotal: Decimal,
  pub discount_amount: Decimal,
  pub shipping_cost: Decimal,
  pub tax_rate: Decimal,
  pub tax_amount: Decimal,
  pub tax_inclusive: bool,
  pub total_amount: Decimal,
  pub coupon_code: Option<String>,
  pub cancellation_pending: bool,
  pub cancelled_at: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl OrderSummary {
  fn build(order: Order, items: Vec<OrderItem>) -> Self {
    OrderSummary {
      cancellation_pending: order.cancellation_pending(),
      id: order.id,
      order_number: order.order_number,
      customer_id: order.customer_id,
      status: order.status,
      items,
      subtotal: order.subtotal,
      discount_amount: order.discount_amount,
      shipping_cost: order.shipping_cost,
      tax_rate: order.tax_rate,
      tax_amount: order.tax_amount,
      tax_inclusive: order.tax_inclusive,
      total_amount: order.total_amount,
      coupon_code: order.coupon_code,
      cancelled_at: order.cancelled_at,
      created_at: order.created_at,
      updated_at: order.updated_at,
    }
  }
}

/// Read paths over orders. Snapshots, not live views: anything that must
/// act on current state re-reads inside a transaction.
#[derive(Clone)]
pub struct OrderQueries {
  store: Arc<Store>,
}

impl OrderQueries {
  pub fn new(store: Arc<Store>) -> Self {
    OrderQueries { store }
  }

  pub fn summary(&self, order_id: Uuid) -> CoreResult<OrderSummary> {
    let order = self
      .store
      .order(order_id)
      .ok_or_else(|| CoreError::not_found("order", order_id))?;
    let items = self.store.items_for_order(order_id);
    Ok(OrderSummary::build(order, items))
  }

  pub fn by_number(&self, order_number: &str) -> CoreResult<OrderSummary> {
    let order = self
      .store
      .order_by_number(order_number)
      .ok_or_else(|| CoreError::not_found("order", order_number))?;
    let items = self.store.items_for_order(order.id);
    Ok(OrderSummary::build(order, items))
  }

  /// Orders newest first, optionally narrowed by customer and status.
  pub fn list(&self, customer_id: Option<Uuid>, status: Option<OrderStatus>) -> Vec<Order> {
    let orders = match customer_id {
      Some(customer_id) => self.store.orders_for_customer(customer_id),
      None => self.store.orders(),
    };
    match status {
      Some(status) => orders
        .into_iter()
        .filter(|order| order.status == status)
        .collect(),
      None => orders,
    }
  }

  /// The transition log for an order, oldest first.
  pub fn history(&self, order_id: Uuid) -> CoreResult<Vec<OrderStatusHistory>> {
    if self.store.order(order_id).is_none() {
      return Err(CoreError::not_found("order", order_id));
    }
    Ok(self.store.history_for_order(order_id))
  }
}
