// core/src/domain/deal.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use super::coupon::DiscountSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealKind {
  /// Discounts the matching product lines.
  Product,
  /// Discounts lines whose category matches.
  Category,
  /// Whole-order discount while the deal window is open.
  Flash,
  /// Free/discounted units of `get_product_id` per `buy_quantity` multiples
  /// of a trigger product.
  BuyXGetY,
  /// Whole-order discount once the subtotal threshold is met.
  MinimumPurchase,
}

impl DealKind {
  pub fn as_str(self) -> &'static str {
    match self {
      DealKind::Product => "product",
      DealKind::Category => "category",
      DealKind::Flash => "flash",
      DealKind::BuyXGetY => "buy_x_get_y",
      DealKind::MinimumPurchase => "minimum_purchase",
    }
  }
}

/// A store-configured, code-less discount applied automatically to
/// qualifying orders. When several deals qualify, `priority` (higher first)
/// picks the winner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deal {
  pub id: Uuid,
  pub name: String,
  pub kind: DealKind,
  pub discount: DiscountSpec,
  pub priority: i32,
  pub minimum_purchase: Option<Decimal>,
  pub maximum_discount: Option<Decimal>,
  pub applicable_products: Option<HashSet<Uuid>>,
  pub applicable_categories: Option<HashSet<Uuid>>,
  /// Buy-X-get-Y parameters; required for that kind, ignored otherwise.
  pub buy_quantity: Option<u32>,
  pub get_quantity: Option<u32>,
  pub get_product_id: Option<Uuid>,
  pub usage_limit: Option<u32>,
  pub usage_limit_per_customer: Option<u32>,
  pub usage_count: u32,
  pub valid_from: Option<DateTime<Utc>>,
  pub valid_until: Option<DateTime<Utc>>,
  pub active: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Deal {
  pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
    self.active && self.is_within_window(now) && self.has_global_headroom()
  }

  pub fn is_within_window(&self, now: DateTime<Utc>) -> bool {
    let after_start = self.valid_from.map_or(true, |from| now >= from);
    let before_end = self.valid_until.map_or(true, |until| now <= until);
    after_start && before_end
  }

  pub fn has_global_headroom(&self) -> bool {
    self.usage_limit.map_or(true, |limit| self.usage_count < limit)
  }

  pub fn is_restricted(&self) -> bool {
    self.applicable_products.is_some() || self.applicable_categories.is_some()
  }

  pub fn applies_to(&self, product_id: Option<Uuid>, category_id: Option<Uuid>) -> bool {
    if !self.is_restricted() {
      return true;
    }
    let product_hit = match (&self.applicable_products, product_id) {
      (Some(set), Some(p)) => set.contains(&p),
      _ => false,
    };
    let category_hit = match (&self.applicable_categories, category_id) {
      (Some(set), Some(c)) => set.contains(&c),
      _ => false,
    };
    product_hit || category_hit
  }
}

/// One row per order a deal was applied to. `products_applied` records which
/// lines the deal actually touched, since a deal may cover only part of an
/// order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealUsage {
  pub id: Uuid,
  pub deal_id: Uuid,
  pub order_id: Uuid,
  pub customer_id: Uuid,
  pub discount_amount: Decimal,
  pub order_total_before: Decimal,
  pub order_total_after: Decimal,
  pub products_applied: Vec<Uuid>,
  pub created_at: DateTime<Utc>,
}
