// core/src/discount/coupon.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::Coupon;
use crate::error::DiscountError;
use crate::usage::EligibilitySnapshot;

use super::{apply_spec, AppliedCoupon, DiscountLine};

/// Evaluates a coupon against the order lines.
///
/// Checks run in a fixed order so the caller always gets the most specific
/// rejection: validity (active, window, global cap), per-customer
/// eligibility, applicability, minimum purchase, then the amount. The
/// minimum-purchase gate looks at undiscounted line amounts, so a deal
/// cannot talk an order out of a threshold it honestly met; the amount
/// itself is computed on `reduced` (the post-deal line amounts) so the two
/// discounts never double-dip.
pub fn evaluate(
  coupon: &Coupon,
  lines: &[DiscountLine],
  reduced: &[Decimal],
  snapshot: &EligibilitySnapshot,
  now: DateTime<Utc>,
) -> Result<AppliedCoupon, DiscountError> {
  if !coupon.active || !coupon.is_within_window(now) {
    return Err(DiscountError::CouponExpired {
      code: coupon.code.clone(),
    });
  }
  if !coupon.has_global_headroom() {
    return Err(DiscountError::CouponUsageExceeded {
      code: coupon.code.clone(),
    });
  }
  if let Some(cap) = coupon.usage_limit_per_customer {
    if snapshot.coupon_uses >= cap {
      return Err(DiscountError::CouponUsageExceeded {
        code: coupon.code.clone(),
      });
    }
  }
  if coupon.first_order_only && snapshot.has_prior_orders {
    return Err(DiscountError::CouponNotApplicable {
      code: coupon.code.clone(),
    });
  }

  let applicable: Vec<usize> = lines
    .iter()
    .enumerate()
    .filter(|(_, line)| coupon.applies_to(line.product_id, line.category_id))
    .map(|(idx, _)| idx)
    .collect();
  if applicable.is_empty() {
    return Err(DiscountError::CouponNotApplicable {
      code: coupon.code.clone(),
    });
  }

  if let Some(minimum) = coupon.minimum_purchase {
    let qualifying: Decimal = applicable.iter().map(|&idx| lines[idx].amount()).sum();
    if qualifying < minimum {
      return Err(DiscountError::MinimumPurchaseNotMet {
        code: coupon.code.clone(),
        minimum,
      });
    }
  }

  let base: Decimal = applicable.iter().map(|&idx| reduced[idx]).sum();
  let amount = apply_spec(&coupon.discount, base, coupon.maximum_discount);
  Ok(AppliedCoupon {
    coupon_id: coupon.id,
    code: coupon.code.clone(),
    amount,
  })
}
