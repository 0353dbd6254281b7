// core/src/usage.rs

//! Discount usage accounting. Usage rows are the ground truth for
//! per-customer eligibility; the `usage_count` aggregates on coupons and
//! deals exist for the cheap global-cap check and are bumped only here.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Coupon, CouponUsage, Deal, DealUsage};
use crate::error::{CoreError, CoreResult};
use crate::store::{Store, Txn};

/// Per-customer facts discount evaluation needs, read inside the checkout
/// transaction so concurrent orders cannot slip past a cap.
#[derive(Debug, Clone, Default)]
pub struct EligibilitySnapshot {
  /// Times the candidate coupon was used by this customer.
  pub coupon_uses: u32,
  /// Whether the customer has any order on file (first-order-only coupons).
  pub has_prior_orders: bool,
  /// Times each deal was used by this customer, keyed by deal id.
  pub deal_uses: HashMap<Uuid, u32>,
}

#[derive(Clone)]
pub struct UsageTracker {
  store: Arc<Store>,
}

impl UsageTracker {
  pub fn new(store: Arc<Store>) -> Self {
    UsageTracker { store }
  }

  pub fn snapshot_in(
    &self,
    txn: &Txn<'_>,
    customer_id: Uuid,
    coupon: Option<&Coupon>,
    deals: &[Deal],
  ) -> EligibilitySnapshot {
    let coupon_uses = coupon
      .map(|coupon| txn.coupon_uses_by_customer(coupon.id, customer_id))
      .unwrap_or(0);
    let deal_uses = deals
      .iter()
      .map(|deal| (deal.id, txn.deal_uses_by_customer(deal.id, customer_id)))
      .collect();
    EligibilitySnapshot {
      coupon_uses,
      has_prior_orders: txn.customer_has_orders(customer_id),
      deal_uses,
    }
  }

  /// Appends the usage row and bumps the coupon's aggregate counter. Called
  /// exactly once per order that applied the coupon, inside the checkout
  /// transaction, after the order rows are staged.
  pub fn record_coupon_usage_in(&self, txn: &mut Txn<'_>, usage: CouponUsage) -> CoreResult<()> {
    let mut coupon = txn
      .coupon(usage.coupon_id)
      .ok_or_else(|| CoreError::not_found("coupon", usage.coupon_id))?;
    coupon.usage_count += 1;
    coupon.updated_at = Utc::now();
    txn.put_coupon(coupon);
    txn.append_coupon_usage(usage);
    Ok(())
  }

  /// Deal counterpart of [`Self::record_coupon_usage_in`].
  pub fn record_deal_usage_in(&self, txn: &mut Txn<'_>, usage: DealUsage) -> CoreResult<()> {
    let mut deal = txn
      .deal(usage.deal_id)
      .ok_or_else(|| CoreError::not_found("deal", usage.deal_id))?;
    deal.usage_count += 1;
    deal.updated_at = Utc::now();
    txn.put_deal(deal);
    txn.append_deal_usage(usage);
    Ok(())
  }

  /// Usage rows recorded for an order.
  pub fn coupon_usages_for_order(&self, order_id: Uuid) -> Vec<CouponUsage> {
    self.store.coupon_usages_for_order(order_id)
  }

  pub fn deal_usages_for_order(&self, order_id: Uuid) -> Vec<DealUsage> {
    self.store.deal_usages_for_order(order_id)
  }
}
