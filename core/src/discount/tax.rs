// core/src/discount/tax.rs

use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::OrderTotals;

/// Rounds to two decimal places, midpoint away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
  amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Tax over `amount` at `rate` percent.
///
/// Exclusive mode computes the addition (`amount * rate / 100`). Inclusive
/// mode backs the contained tax out of an amount that already carries it
/// (`amount * rate / (100 + rate)`).
pub fn calculate_tax(amount: Decimal, rate: Decimal, inclusive: bool) -> Decimal {
  if rate <= Decimal::ZERO || amount <= Decimal::ZERO {
    return Decimal::ZERO;
  }
  let tax = if inclusive {
    amount * rate / (Decimal::ONE_HUNDRED + rate)
  } else {
    amount * rate / Decimal::ONE_HUNDRED
  };
  round_money(tax)
}

/// Computes every money column of an order in one place.
///
/// The taxable base is the discounted goods value, never shipping. For
/// tax-exclusive stores `total = subtotal - discount + shipping + tax`; for
/// tax-inclusive stores the tax already lives inside the goods value, so
/// `total = subtotal - discount + shipping` and `tax_amount` reports the
/// contained portion.
pub fn compute_totals(
  subtotal: Decimal,
  discount: Decimal,
  shipping: Decimal,
  tax_rate: Decimal,
  tax_inclusive: bool,
) -> OrderTotals {
  let subtotal = round_money(subtotal);
  let discount = round_money(discount).clamp(Decimal::ZERO, subtotal);
  let shipping = round_money(shipping).max(Decimal::ZERO);
  let goods = subtotal - discount;
  let tax_amount = calculate_tax(goods, tax_rate, tax_inclusive);
  let total = if tax_inclusive {
    goods + shipping
  } else {
    goods + shipping + tax_amount
  };
  OrderTotals {
    subtotal,
    discount_amount: discount,
    shipping_cost: shipping,
    tax_rate,
    tax_amount,
    tax_inclusive,
    total_amount: round_money(total),
  }
}
