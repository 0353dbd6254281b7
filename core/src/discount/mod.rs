// core/src/discount/mod.rs

//! Discount resolution.
//!
//! Pure evaluation over checkout lines: no storage access, no clock reads.
//! The caller fetches the candidate coupon, the deal table and an
//! [`EligibilitySnapshot`](crate::usage::EligibilitySnapshot), then calls
//! [`resolve`]. At most one deal applies (highest priority, earliest
//! creation on ties); its discount is allocated pro-rata across the lines
//! that formed its base, and the coupon is evaluated against the reduced
//! line amounts so the two discounts never overlap on the same value.
//!
//! A rejected coupon is an outcome, not a failure: [`DiscountOutcome`]
//! carries the rejection and checkout decides whether to proceed without it.

pub mod coupon;
pub mod deal;
pub mod tax;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Coupon, Deal, DiscountKind, DiscountSpec};
use crate::error::DiscountError;
use crate::usage::EligibilitySnapshot;

use tax::round_money;

/// One checkout line as the resolver sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountLine {
  pub product_id: Option<Uuid>,
  pub category_id: Option<Uuid>,
  pub quantity: u32,
  pub unit_price: Decimal,
}

impl DiscountLine {
  pub fn amount(&self) -> Decimal {
    self.unit_price * Decimal::from(self.quantity)
  }
}

/// The winning deal with its money effects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedDeal {
  pub deal_id: Uuid,
  pub name: String,
  pub amount: Decimal,
  /// Per-line share of `amount`, indexed like the input lines.
  pub allocations: Vec<Decimal>,
  /// Catalog products whose lines the deal touched.
  pub products_applied: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedCoupon {
  pub coupon_id: Uuid,
  pub code: String,
  pub amount: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscountOutcome {
  pub deal: Option<AppliedDeal>,
  pub coupon: Option<AppliedCoupon>,
  /// Why the requested coupon was not applied, when one was requested.
  pub coupon_rejection: Option<DiscountError>,
  pub total_discount: Decimal,
}

/// Resolves the deal and coupon for a set of lines.
pub fn resolve(
  lines: &[DiscountLine],
  coupon: Option<&Coupon>,
  deals: &[Deal],
  snapshot: &EligibilitySnapshot,
  now: DateTime<Utc>,
) -> DiscountOutcome {
  let applied_deal = deal::select(lines, deals, snapshot, now);
  let reduced: Vec<Decimal> = match &applied_deal {
    Some(applied) => lines
      .iter()
      .zip(&applied.allocations)
      .map(|(line, cut)| line.amount() - *cut)
      .collect(),
    None => lines.iter().map(DiscountLine::amount).collect(),
  };
  let (applied_coupon, coupon_rejection) = match coupon {
    Some(candidate) => match coupon::evaluate(candidate, lines, &reduced, snapshot, now) {
      Ok(applied) => (Some(applied), None),
      Err(reason) => (None, Some(reason)),
    },
    None => (None, None),
  };
  let total_discount = applied_deal.as_ref().map_or(Decimal::ZERO, |d| d.amount)
    + applied_coupon.as_ref().map_or(Decimal::ZERO, |c| c.amount);
  DiscountOutcome {
    deal: applied_deal,
    coupon: applied_coupon,
    coupon_rejection,
    total_discount,
  }
}

/// Turns a discount spec into a money amount over `base`. Percentage
/// discounts are capped at `maximum`; every result is clamped to the base
/// and never negative.
pub(crate) fn apply_spec(spec: &DiscountSpec, base: Decimal, maximum: Option<Decimal>) -> Decimal {
  if base <= Decimal::ZERO {
    return Decimal::ZERO;
  }
  let raw = match spec.kind {
    DiscountKind::Percentage => {
      let pct = base * spec.value / Decimal::ONE_HUNDRED;
      match maximum {
        Some(max) => pct.min(max),
        None => pct,
      }
    }
    DiscountKind::Fixed => spec.value,
  };
  round_money(raw.min(base).max(Decimal::ZERO))
}

/// Splits `amount` across lines in proportion to their `shares` of `base`.
/// The last participating line absorbs the rounding remainder so the
/// allocations always sum to `amount` exactly.
pub(crate) fn allocate(amount: Decimal, shares: &[Decimal], base: Decimal) -> Vec<Decimal> {
  let mut out = vec![Decimal::ZERO; shares.len()];
  if base <= Decimal::ZERO || amount <= Decimal::ZERO {
    return out;
  }
  let last = shares.iter().rposition(|share| !share.is_zero());
  let mut allocated = Decimal::ZERO;
  for (idx, share) in shares.iter().enumerate() {
    if share.is_zero() {
      continue;
    }
    let cut = if Some(idx) == last {
      amount - allocated
    } else {
      round_money(amount * *share / base)
    };
    out[idx] = cut;
    allocated += cut;
  }
  out
}
