// core/src/checkout.rs

//! Checkout: turns a validated request into a committed order.
//!
//! Collaborators (customer directory, shipping rates) are awaited first;
//! then one store transaction re-reads products, resolves discounts,
//! computes totals, writes the order with its lines, records discount
//! usage, appends the creation history row and reserves stock through the
//! ledger. Everything commits or nothing does. The order-created
//! notification goes out after commit and cannot undo any of it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::collaborators::{
  notify, CustomerDirectory, CustomerProfile, NotificationKind, NotificationSink,
  OrderNotification, ShippingRates,
};
use crate::discount::{self, tax, DiscountLine, DiscountOutcome};
use crate::domain::{
  normalize_code, Actor, Coupon, CouponUsage, DealUsage, Order, OrderItem, OrderStatus,
  OrderStatusHistory, StockReason, StockRef,
};
use crate::error::{CoreError, CoreResult, DiscountError};
use crate::ledger::InventoryLedger;
use crate::store::{Store, Txn};
use crate::usage::UsageTracker;

/// Store-level settings checkout needs; the application builds this from
/// its configuration.
#[derive(Debug, Clone, Copy)]
pub struct StoreSettings {
  /// Tax rate in percent.
  pub tax_rate: Decimal,
  /// Whether catalog prices already contain tax.
  pub tax_inclusive: bool,
}

/// One requested line. Catalog lines carry a `product_id` and snapshot
/// name/price from the product row; external (dropship) lines carry their
/// own name and price instead.
#[derive(Debug, Clone)]
pub struct CheckoutItem {
  pub product_id: Option<Uuid>,
  pub quantity: u32,
  pub name: Option<String>,
  pub sku: Option<String>,
  pub unit_price: Option<Decimal>,
  pub variation: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
  pub customer_id: Uuid,
  pub items: Vec<CheckoutItem>,
  pub coupon_code: Option<String>,
  /// When the coupon is rejected: `true` places the order without it,
  /// `false` fails the checkout with the rejection.
  pub allow_without_coupon: bool,
  pub shipping_method: String,
}

#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
  pub order: Order,
  pub items: Vec<OrderItem>,
  pub deal: Option<discount::AppliedDeal>,
  pub coupon: Option<discount::AppliedCoupon>,
  /// Set when a requested coupon was rejected but the order proceeded.
  pub coupon_rejection: Option<DiscountError>,
}

#[derive(Clone)]
pub struct OrderAssembler {
  store: Arc<Store>,
  ledger: InventoryLedger,
  usage: UsageTracker,
  customers: Arc<dyn CustomerDirectory>,
  shipping: Arc<dyn ShippingRates>,
  notifications: Arc<dyn NotificationSink>,
  settings: StoreSettings,
}

impl OrderAssembler {
  pub fn new(
    store: Arc<Store>,
    customers: Arc<dyn CustomerDirectory>,
    shipping: Arc<dyn ShippingRates>,
    notifications: Arc<dyn NotificationSink>,
    settings: StoreSettings,
  ) -> Self {
    OrderAssembler {
      ledger: InventoryLedger::new(store.clone()),
      usage: UsageTracker::new(store.clone()),
      store,
      customers,
      shipping,
      notifications,
      settings,
    }
  }

  #[instrument(skip(self, request), fields(customer_id = %request.customer_id))]
  pub async fn create(&self, request: CheckoutRequest, actor: Actor) -> CoreResult<CheckoutOutcome> {
    validate(&request)?;

    let customer = self
      .customers
      .lookup(request.customer_id)
      .await
      .map_err(|source| CoreError::Collaborator {
        name: "customer_directory",
        source,
      })?
      .ok_or_else(|| CoreError::not_found("customer", request.customer_id))?;

    let shipping_cost = self
      .shipping
      .quote(&request.shipping_method, request.items.len() as u32)
      .await
      .map_err(|source| CoreError::Collaborator {
        name: "shipping_rates",
        source,
      })?;

    let now = Utc::now();
    let outcome = self
      .store
      .transaction(|txn| self.assemble(txn, &request, actor, shipping_cost, now))?;

    info!(
      order_number = %outcome.order.order_number,
      total = %outcome.order.total_amount,
      "order created"
    );
    notify(
      self.notifications.as_ref(),
      OrderNotification {
        kind: NotificationKind::OrderCreated,
        order_id: outcome.order.id,
        order_number: outcome.order.order_number.clone(),
        customer_id: customer.id,
        customer_name: Some(customer.name.clone()),
        total_amount: outcome.order.total_amount,
        status: outcome.order.status,
      },
    )
    .await;

    Ok(outcome)
  }

  /// The transactional part of checkout. Synchronous: the surrounding lock
  /// serializes it against every other mutation.
  fn assemble(
    &self,
    txn: &mut Txn<'_>,
    request: &CheckoutRequest,
    actor: Actor,
    shipping_cost: Decimal,
    now: DateTime<Utc>,
  ) -> CoreResult<CheckoutOutcome> {
    let order_id = Uuid::new_v4();
    let drafts = self.resolve_lines(txn, request, order_id)?;

    let discount_lines: Vec<DiscountLine> = drafts
      .iter()
      .map(|item| DiscountLine {
        product_id: item.product_id,
        category_id: item.category_id,
        quantity: item.quantity,
        unit_price: item.unit_price,
      })
      .collect();

    let coupon = self.resolve_coupon(txn, request)?;
    let deals = txn.deals();
    let snapshot =
      self
        .usage
        .snapshot_in(txn, request.customer_id, coupon.as_ref(), &deals);
    let resolution = discount::resolve(
      &discount_lines,
      coupon.as_ref(),
      &deals,
      &snapshot,
      now,
    );
    let coupon_rejection = self.vet_rejection(request, resolution.coupon_rejection.clone())?;

    let subtotal: Decimal = discount_lines.iter().map(DiscountLine::amount).sum();
    let totals = tax::compute_totals(
      subtotal,
      resolution.total_discount,
      shipping_cost,
      self.settings.tax_rate,
      self.settings.tax_inclusive,
    );

    let order_number = next_order_number(txn, now);
    let order = Order {
      id: order_id,
      order_number,
      customer_id: request.customer_id,
      status: OrderStatus::PendingPayment,
      subtotal: totals.subtotal,
      discount_amount: totals.discount_amount,
      shipping_cost: totals.shipping_cost,
      tax_rate: totals.tax_rate,
      tax_amount: totals.tax_amount,
      tax_inclusive: totals.tax_inclusive,
      total_amount: totals.total_amount,
      coupon_id: resolution.coupon.as_ref().map(|c| c.coupon_id),
      coupon_code: resolution.coupon.as_ref().map(|c| c.code.clone()),
      cancellation_requested_at: None,
      cancellation_reason: None,
      cancellation_requested_by: None,
      cancelled_at: None,
      cancelled_by: None,
      created_at: now,
      updated_at: now,
    };
    txn.put_order(order.clone());
    for item in &drafts {
      txn.put_item(item.clone());
    }

    // Reserve stock line by line; a later line re-reads what an earlier
    // line already staged, so duplicate products cannot oversell.
    for item in &drafts {
      if let Some(product_id) = item.product_id {
        self.ledger.adjust_in(
          txn,
          product_id,
          -i64::from(item.quantity),
          StockReason::OrderCreated,
          Some(StockRef::Order(order_id)),
          actor,
          None,
          false,
        )?;
      }
    }

    self.record_usages(txn, &order, &resolution)?;

    txn.append_history(OrderStatusHistory {
      id: Uuid::new_v4(),
      order_id,
      old_status: None,
      new_status: order.status,
      actor,
      note: None,
      created_at: now,
    });

    Ok(CheckoutOutcome {
      items: drafts,
      deal: resolution.deal,
      coupon: resolution.coupon,
      coupon_rejection,
      order,
    })
  }

  /// Materializes the request lines. Catalog lines re-read their product
  /// inside the transaction and snapshot name/sku/price from it; external
  /// lines pass through as given.
  fn resolve_lines(
    &self,
    txn: &Txn<'_>,
    request: &CheckoutRequest,
    order_id: Uuid,
  ) -> CoreResult<Vec<OrderItem>> {
    let mut items = Vec::with_capacity(request.items.len());
    for line in &request.items {
      let item = match line.product_id {
        Some(product_id) => {
          let product = txn.require_product(product_id)?;
          if !product.active {
            return Err(CoreError::Validation(format!(
              "product '{}' is not available for purchase",
              product.name
            )));
          }
          if product.stock_quantity < i64::from(line.quantity) {
            return Err(CoreError::InsufficientStock {
              product_id,
              requested: i64::from(line.quantity),
              available: product.stock_quantity,
            });
          }
          OrderItem {
            id: Uuid::new_v4(),
            order_id,
            product_id: Some(product_id),
            product_name: product.name,
            product_sku: product.sku,
            product_image: product.image,
            category_id: product.category_id,
            quantity: line.quantity,
            unit_price: product.price,
            line_total: product.price * Decimal::from(line.quantity),
            variation: line.variation.clone(),
            sourcing_ref: None,
            sourcing_note: None,
          }
        }
        None => {
          // validate() already proved name and price are present
          let name = line.name.clone().unwrap_or_default();
          let unit_price = line.unit_price.unwrap_or_default();
          OrderItem {
            id: Uuid::new_v4(),
            order_id,
            product_id: None,
            product_name: name,
            product_sku: line.sku.clone(),
            product_image: None,
            category_id: None,
            quantity: line.quantity,
            unit_price,
            line_total: unit_price * Decimal::from(line.quantity),
            variation: line.variation.clone(),
            sourcing_ref: None,
            sourcing_note: None,
          }
        }
      };
      items.push(item);
    }
    Ok(items)
  }

  /// Fetches the requested coupon. An unknown code is a rejection like any
  /// other, so it flows through the same proceed-or-fail decision.
  fn resolve_coupon(
    &self,
    txn: &Txn<'_>,
    request: &CheckoutRequest,
  ) -> CoreResult<Option<Coupon>> {
    let Some(raw) = request.coupon_code.as_deref() else {
      return Ok(None);
    };
    let code = normalize_code(raw);
    if code.is_empty() {
      return Ok(None);
    }
    match txn.coupon_by_code(&code) {
      Some(coupon) => Ok(Some(coupon)),
      None if request.allow_without_coupon => Ok(None),
      None => Err(DiscountError::CouponNotFound { code }.into()),
    }
  }

  fn vet_rejection(
    &self,
    request: &CheckoutRequest,
    rejection: Option<DiscountError>,
  ) -> CoreResult<Option<DiscountError>> {
    match rejection {
      Some(reason) if request.allow_without_coupon => {
        warn!(coupon = reason.subject(), %reason, "proceeding without rejected coupon");
        Ok(Some(reason))
      }
      Some(reason) => Err(reason.into()),
      None => Ok(None),
    }
  }

  fn record_usages(
    &self,
    txn: &mut Txn<'_>,
    order: &Order,
    resolution: &DiscountOutcome,
  ) -> CoreResult<()> {
    let goods_before = order.subtotal;
    let goods_after = order.subtotal - order.discount_amount;
    if let Some(applied) = &resolution.coupon {
      self.usage.record_coupon_usage_in(
        txn,
        CouponUsage {
          id: Uuid::new_v4(),
          coupon_id: applied.coupon_id,
          order_id: order.id,
          customer_id: order.customer_id,
          discount_amount: applied.amount,
          order_total_before: goods_before,
          order_total_after: goods_after,
          created_at: order.created_at,
        },
      )?;
    }
    if let Some(applied) = &resolution.deal {
      self.usage.record_deal_usage_in(
        txn,
        DealUsage {
          id: Uuid::new_v4(),
          deal_id: applied.deal_id,
          order_id: order.id,
          customer_id: order.customer_id,
          discount_amount: applied.amount,
          order_total_before: goods_before,
          order_total_after: goods_after,
          products_applied: applied.products_applied.clone(),
          created_at: order.created_at,
        },
      )?;
    }
    Ok(())
  }
}

fn validate(request: &CheckoutRequest) -> CoreResult<()> {
  if request.items.is_empty() {
    return Err(CoreError::Validation(
      "order must contain at least one item".into(),
    ));
  }
  if request.shipping_method.trim().is_empty() {
    return Err(CoreError::Validation("shipping method is required".into()));
  }
  for (idx, item) in request.items.iter().enumerate() {
    if item.quantity == 0 {
      return Err(CoreError::Validation(format!(
        "item {idx}: quantity must be positive"
      )));
    }
    if item.product_id.is_none() {
      let named = item
        .name
        .as_deref()
        .map_or(false, |name| !name.trim().is_empty());
      let priced = item.unit_price.map_or(false, |price| price > Decimal::ZERO);
      if !named || !priced {
        return Err(CoreError::Validation(format!(
          "item {idx}: external lines need a name and a positive unit price"
        )));
      }
    }
  }
  Ok(())
}

/// `ORD-YYYYMMDD-XXXXXX`, unique among committed and staged orders.
fn next_order_number(txn: &Txn<'_>, now: DateTime<Utc>) -> String {
  loop {
    let suffix = Uuid::new_v4().simple().to_string()[..6].to_uppercase();
    let candidate = format!("ORD-{}-{}", now.format("%Y%m%d"), suffix);
    if !txn.order_number_taken(&candidate) {
      return candidate;
    }
  }
}
