// core/src/domain/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog entry. `stock_quantity` is the on-hand count the inventory
/// ledger adjusts; it is signed so a misconfigured adjustment surfaces as a
/// negative balance instead of wrapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  pub sku: Option<String>,
  pub image: Option<String>,
  pub category_id: Option<Uuid>,
  pub price: Decimal,
  pub stock_quantity: i64,
  pub active: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}
