// core/src/domain/coupon.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Canonical form for coupon codes: trimmed, uppercase. Applied once at
/// creation and once at lookup, so storage only ever sees one spelling.
pub fn normalize_code(code: &str) -> String {
  code.trim().to_uppercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
  Percentage,
  Fixed,
}

/// How a discount is computed: `Percentage` takes `value` percent of the
/// base, `Fixed` takes `value` flat. Capping and clamping live in the
/// resolver, not here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscountSpec {
  pub kind: DiscountKind,
  pub value: Decimal,
}

/// A customer-entered discount code.
///
/// `usage_count` is a fast-path aggregate kept in sync with the
/// [`CouponUsage`] rows inside the recording transaction; per-customer limits
/// are always enforced against the rows, never against this counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
  pub id: Uuid,
  /// Unique, stored uppercase.
  pub code: String,
  pub discount: DiscountSpec,
  pub minimum_purchase: Option<Decimal>,
  pub maximum_discount: Option<Decimal>,
  pub usage_limit: Option<u32>,
  pub usage_limit_per_customer: Option<u32>,
  pub usage_count: u32,
  /// Validity window, inclusive on both ends; `None` means open-ended.
  pub valid_from: Option<DateTime<Utc>>,
  pub valid_until: Option<DateTime<Utc>>,
  /// `None` = unrestricted. An empty set would match nothing and is rejected
  /// at creation, so empty-vs-null ambiguity cannot arise.
  pub applicable_products: Option<HashSet<Uuid>>,
  pub applicable_categories: Option<HashSet<Uuid>>,
  pub first_order_only: bool,
  pub active: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Coupon {
  /// Active, inside the validity window, and under the global usage cap.
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

  /// Whether a line participates in this coupon's discount base. With no
  /// restriction lists every line qualifies; with lists, matching either set
  /// qualifies.
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

/// One row per successful redemption. Append-only; the ground truth for
/// per-customer usage counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponUsage {
  pub id: Uuid,
  pub coupon_id: Uuid,
  pub order_id: Uuid,
  pub customer_id: Uuid,
  pub discount_amount: Decimal,
  /// Goods value before any discount.
  pub order_total_before: Decimal,
  /// Goods value after all discounts.
  pub order_total_after: Decimal,
  pub created_at: DateTime<Utc>,
}
