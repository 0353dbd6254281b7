// core/src/domain/order.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::actor::{Actor, ActorKind};
use super::status::OrderStatus;

/// An order. `status` is a cache of the latest [`OrderStatusHistory`] entry;
/// the history table is the authoritative transition log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
  pub id: Uuid,
  /// Unique, human-readable, e.g. `ORD-20250825-4F7A2C`.
  pub order_number: String,
  pub customer_id: Uuid,
  pub status: OrderStatus,
  pub subtotal: Decimal,
  pub discount_amount: Decimal,
  pub shipping_cost: Decimal,
  pub tax_rate: Decimal,
  pub tax_amount: Decimal,
  pub tax_inclusive: bool,
  pub total_amount: Decimal,
  pub coupon_id: Option<Uuid>,
  /// Code snapshot taken at checkout; survives coupon edits/deletion.
  pub coupon_code: Option<String>,
  pub cancellation_requested_at: Option<DateTime<Utc>>,
  pub cancellation_reason: Option<String>,
  pub cancellation_requested_by: Option<ActorKind>,
  pub cancelled_at: Option<DateTime<Utc>>,
  pub cancelled_by: Option<ActorKind>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Order {
  /// A cancellation request is open and awaiting an admin decision.
  pub fn cancellation_pending(&self) -> bool {
    self.cancellation_requested_at.is_some() && self.cancelled_at.is_none()
  }
}

/// Snapshot of a purchased line. Name/sku/image are captured at checkout so
/// later catalog edits cannot corrupt order history. Immutable after creation
/// except for the sourcing side-channel (`sourcing_ref`/`sourcing_note`),
/// which never touches pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
  pub id: Uuid,
  pub order_id: Uuid,
  /// None for dropship/external lines that have no local product row.
  pub product_id: Option<Uuid>,
  pub product_name: String,
  pub product_sku: Option<String>,
  pub product_image: Option<String>,
  pub category_id: Option<Uuid>,
  pub quantity: u32,
  pub unit_price: Decimal,
  pub line_total: Decimal,
  pub variation: Option<serde_json::Value>,
  pub sourcing_ref: Option<String>,
  pub sourcing_note: Option<String>,
}

/// Append-only audit row, one per status transition. The creation row has
/// `old_status = None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusHistory {
  pub id: Uuid,
  pub order_id: Uuid,
  pub old_status: Option<OrderStatus>,
  pub new_status: OrderStatus,
  pub actor: Actor,
  pub note: Option<String>,
  pub created_at: DateTime<Utc>,
}

/// The money columns of an order, computed in one place (see
/// [`crate::discount::tax::compute_totals`]) so the totals invariant cannot
/// drift between call sites.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderTotals {
  pub subtotal: Decimal,
  pub discount_amount: Decimal,
  pub shipping_cost: Decimal,
  pub tax_rate: Decimal,
  pub tax_amount: Decimal,
  pub tax_inclusive: bool,
  pub total_amount: Decimal,
}
