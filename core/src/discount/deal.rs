// core/src/discount/deal.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{Deal, DealKind};
use crate::error::DiscountError;
use crate::usage::EligibilitySnapshot;

use super::{allocate, apply_spec, AppliedDeal, DiscountLine};

/// The lines a deal would discount and how much of each.
pub(crate) struct DealBasis {
  pub(crate) base: Decimal,
  pub(crate) line_shares: Vec<Decimal>,
  pub(crate) products: Vec<Uuid>,
}

impl DealBasis {
  fn empty(len: usize) -> Self {
    DealBasis {
      base: Decimal::ZERO,
      line_shares: vec![Decimal::ZERO; len],
      products: Vec::new(),
    }
  }
}

/// Picks the winning deal: highest priority first, earliest creation on
/// ties. Deals skipped for validity or usage reasons are logged, never
/// surfaced; deals whose basis is empty simply do not compete.
pub(crate) fn select(
  lines: &[DiscountLine],
  deals: &[Deal],
  snapshot: &EligibilitySnapshot,
  now: DateTime<Utc>,
) -> Option<AppliedDeal> {
  let mut candidates: Vec<(&Deal, DealBasis)> = Vec::new();
  for deal in deals {
    match eligibility(deal, lines, snapshot, now) {
      Ok(basis) if basis.base > Decimal::ZERO => candidates.push((deal, basis)),
      Ok(_) => {}
      Err(reason) => debug!(deal = %deal.name, %reason, "deal skipped"),
    }
  }
  candidates.sort_by(|(a, _), (b, _)| {
    b.priority
      .cmp(&a.priority)
      .then(a.created_at.cmp(&b.created_at))
      .then(a.id.cmp(&b.id))
  });
  let (deal, basis) = candidates.into_iter().next()?;
  let amount = apply_spec(&deal.discount, basis.base, deal.maximum_discount);
  if amount.is_zero() {
    return None;
  }
  let allocations = allocate(amount, &basis.line_shares, basis.base);
  Some(AppliedDeal {
    deal_id: deal.id,
    name: deal.name.clone(),
    amount,
    allocations,
    products_applied: basis.products,
  })
}

/// Checks a single deal and computes its basis over the lines.
pub(crate) fn eligibility(
  deal: &Deal,
  lines: &[DiscountLine],
  snapshot: &EligibilitySnapshot,
  now: DateTime<Utc>,
) -> Result<DealBasis, DiscountError> {
  if !deal.is_valid(now) {
    return Err(DiscountError::DealNotValid {
      name: deal.name.clone(),
    });
  }
  if let Some(cap) = deal.usage_limit_per_customer {
    let used = snapshot.deal_uses.get(&deal.id).copied().unwrap_or(0);
    if used >= cap {
      return Err(DiscountError::DealUsageExceeded {
        name: deal.name.clone(),
      });
    }
  }
  if let Some(minimum) = deal.minimum_purchase {
    let subtotal: Decimal = lines.iter().map(DiscountLine::amount).sum();
    if subtotal < minimum {
      return Ok(DealBasis::empty(lines.len()));
    }
  }
  match deal.kind {
    DealKind::BuyXGetY => Ok(buy_x_get_y_basis(deal, lines)),
    _ => Ok(matching_lines_basis(deal, lines)),
  }
}

/// Product, category, flash and minimum-purchase deals all discount the
/// lines their applicability sets match; an unrestricted deal covers the
/// whole order.
fn matching_lines_basis(deal: &Deal, lines: &[DiscountLine]) -> DealBasis {
  let mut basis = DealBasis::empty(lines.len());
  for (idx, line) in lines.iter().enumerate() {
    if !deal.applies_to(line.product_id, line.category_id) {
      continue;
    }
    let amount = line.amount();
    basis.line_shares[idx] = amount;
    basis.base += amount;
    if let Some(product_id) = line.product_id {
      if !basis.products.contains(&product_id) {
        basis.products.push(product_id);
      }
    }
  }
  basis
}

/// Grants `get_quantity` units of the get-product per `buy_quantity`
/// qualifying units in the order, capped at the get-product quantity
/// actually bought. The basis is the value of the granted units; the deal's
/// discount spec then decides how much of that value comes off.
fn buy_x_get_y_basis(deal: &Deal, lines: &[DiscountLine]) -> DealBasis {
  let (buy_quantity, get_quantity, get_product) =
    match (deal.buy_quantity, deal.get_quantity, deal.get_product_id) {
      (Some(buy), Some(get), Some(product)) if buy > 0 && get > 0 => (buy, get, product),
      // missing parameters leave the deal inert
      _ => return DealBasis::empty(lines.len()),
    };
  let trigger: u32 = lines
    .iter()
    .filter(|line| deal.applies_to(line.product_id, line.category_id))
    .map(|line| line.quantity)
    .sum();
  let mut granted = (trigger / buy_quantity) * get_quantity;
  if granted == 0 {
    return DealBasis::empty(lines.len());
  }
  let mut basis = DealBasis::empty(lines.len());
  for (idx, line) in lines.iter().enumerate() {
    if granted == 0 || line.product_id != Some(get_product) {
      continue;
    }
    let free_units = granted.min(line.quantity);
    let value = line.unit_price * Decimal::from(free_units);
    basis.line_shares[idx] = value;
    basis.base += value;
    if !basis.products.contains(&get_product) {
      basis.products.push(get_product);
    }
    granted -= free_units;
  }
  basis
}
