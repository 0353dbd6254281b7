// core/src/domain/inventory.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::actor::Actor;

/// Why a stock level moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockReason {
  OrderCreated,
  OrderCancelled,
  OrderDeleted,
  Restock,
  ManualAdjustment,
}

impl StockReason {
  pub fn as_str(self) -> &'static str {
    match self {
      StockReason::OrderCreated => "order_created",
      StockReason::OrderCancelled => "order_cancelled",
      StockReason::OrderDeleted => "order_deleted",
      StockReason::Restock => "restock",
      StockReason::ManualAdjustment => "manual_adjustment",
    }
  }
}

impl std::fmt::Display for StockReason {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Polymorphic reference to the record that caused a stock movement.
///
/// History rows outlive the records they point at: deleting an order leaves
/// its ledger entries behind with a dangling reference, which is what an
/// audit trail is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum StockRef {
  Order(Uuid),
  Purchase(Uuid),
}

/// Append-only ledger row. `adjustment` is the signed delta;
/// `old_quantity + adjustment == new_quantity` always holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryHistory {
  pub id: Uuid,
  pub product_id: Uuid,
  pub old_quantity: i64,
  pub new_quantity: i64,
  pub adjustment: i64,
  pub reason: StockReason,
  pub reference: Option<StockRef>,
  pub actor: Actor,
  pub note: Option<String>,
  pub created_at: DateTime<Utc>,
}
