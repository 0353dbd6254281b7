// core/src/catalog.rs

//! Admin intake for products, coupons and deals.
//!
//! Creation and updates validate shape (positive values, sane windows,
//! non-empty applicability sets, kind-specific deal parameters) and route
//! every stock movement through the ledger, including a product's initial
//! stock. Updates never touch `usage_count`; only the usage tracker does.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::{
  normalize_code, Actor, Coupon, Deal, DealKind, DiscountKind, DiscountSpec, Product, StockReason,
};
use crate::error::{CoreError, CoreResult};
use crate::ledger::InventoryLedger;
use crate::store::Store;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
  pub name: String,
  pub sku: Option<String>,
  pub image: Option<String>,
  pub category_id: Option<Uuid>,
  pub price: Decimal,
  #[serde(default)]
  pub initial_stock: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCoupon {
  pub code: String,
  pub discount: DiscountSpec,
  pub minimum_purchase: Option<Decimal>,
  pub maximum_discount: Option<Decimal>,
  pub usage_limit: Option<u32>,
  pub usage_limit_per_customer: Option<u32>,
  pub valid_from: Option<DateTime<Utc>>,
  pub valid_until: Option<DateTime<Utc>>,
  pub applicable_products: Option<HashSet<Uuid>>,
  pub applicable_categories: Option<HashSet<Uuid>>,
  #[serde(default)]
  pub first_order_only: bool,
}

/// Field-wise coupon update; present fields are applied, absent ones stay.
/// The code and the usage counter are not updatable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CouponPatch {
  pub discount: Option<DiscountSpec>,
  pub minimum_purchase: Option<Decimal>,
  pub maximum_discount: Option<Decimal>,
  pub usage_limit: Option<u32>,
  pub usage_limit_per_customer: Option<u32>,
  pub valid_from: Option<DateTime<Utc>>,
  pub valid_until: Option<DateTime<Utc>>,
  pub applicable_products: Option<HashSet<Uuid>>,
  pub applicable_categories: Option<HashSet<Uuid>>,
  pub first_order_only: Option<bool>,
  pub active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDeal {
  pub name: String,
  pub kind: DealKind,
  pub discount: DiscountSpec,
  #[serde(default)]
  pub priority: i32,
  pub minimum_purchase: Option<Decimal>,
  pub maximum_discount: Option<Decimal>,
  pub applicable_products: Option<HashSet<Uuid>>,
  pub applicable_categories: Option<HashSet<Uuid>>,
  pub buy_quantity: Option<u32>,
  pub get_quantity: Option<u32>,
  pub get_product_id: Option<Uuid>,
  pub usage_limit: Option<u32>,
  pub usage_limit_per_customer: Option<u32>,
  pub valid_from: Option<DateTime<Utc>>,
  pub valid_until: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DealPatch {
  pub name: Option<String>,
  pub discount: Option<DiscountSpec>,
  pub priority: Option<i32>,
  pub minimum_purchase: Option<Decimal>,
  pub maximum_discount: Option<Decimal>,
  pub applicable_products: Option<HashSet<Uuid>>,
  pub applicable_categories: Option<HashSet<Uuid>>,
  pub buy_quantity: Option<u32>,
  pub get_quantity: Option<u32>,
  pub get_product_id: Option<Uuid>,
  pub usage_limit: Option<u32>,
  pub usage_limit_per_customer: Option<u32>,
  pub valid_from: Option<DateTime<Utc>>,
  pub valid_until: Option<DateTime<Utc>>,
  pub active: Option<bool>,
}

#[derive(Clone)]
pub struct Catalog {
  store: Arc<Store>,
  ledger: InventoryLedger,
}

impl Catalog {
  pub fn new(store: Arc<Store>) -> Self {
    Catalog {
      ledger: InventoryLedger::new(store.clone()),
      store,
    }
  }

  // -- products ----------------------------------------------------------

  #[instrument(skip(self, input), fields(name = %input.name))]
  pub fn create_product(&self, input: NewProduct, actor: Actor) -> CoreResult<Product> {
    if input.name.trim().is_empty() {
      return Err(CoreError::Validation("product name is required".into()));
    }
    if input.price <= Decimal::ZERO {
      return Err(CoreError::Validation("product price must be positive".into()));
    }
    if input.initial_stock < 0 {
      return Err(CoreError::Validation(
        "initial stock cannot be negative".into(),
      ));
    }
    let now = Utc::now();
    let product = Product {
      id: Uuid::new_v4(),
      name: input.name.trim().to_string(),
      sku: input.sku,
      image: input.image,
      category_id: input.category_id,
      price: input.price,
      stock_quantity: 0,
      active: true,
      created_at: now,
      updated_at: now,
    };
    let created = self.store.transaction(|txn| {
      txn.put_product(product.clone());
      if input.initial_stock > 0 {
        return self.ledger.adjust_in(
          txn,
          product.id,
          input.initial_stock,
          StockReason::Restock,
          None,
          actor,
          Some("initial stock".into()),
          false,
        );
      }
      Ok(product)
    })?;
    info!(product_id = %created.id, stock = created.stock_quantity, "product created");
    Ok(created)
  }

  pub fn product(&self, product_id: Uuid) -> CoreResult<Product> {
    self
      .store
      .product(product_id)
      .ok_or_else(|| CoreError::not_found("product", product_id))
  }

  pub fn products(&self) -> Vec<Product> {
    self.store.products()
  }

  /// Admin stock correction. Order-driven reasons are reserved for the
  /// order flows; this path takes restock and manual_adjustment only.
  pub fn adjust_stock(
    &self,
    product_id: Uuid,
    delta: i64,
    reason: StockReason,
    actor: Actor,
    note: Option<String>,
  ) -> CoreResult<Product> {
    if !matches!(
      reason,
      StockReason::Restock | StockReason::ManualAdjustment
    ) {
      return Err(CoreError::Validation(
        "stock adjustments accept reasons 'restock' and 'manual_adjustment' only".into(),
      ));
    }
    if delta == 0 {
      return Err(CoreError::Validation(
        "stock adjustment delta cannot be zero".into(),
      ));
    }
    self.ledger.adjust(product_id, delta, reason, actor, note, false)
  }

  // -- coupons -----------------------------------------------------------

  #[instrument(skip(self, input), fields(code = %input.code))]
  pub fn create_coupon(&self, input: NewCoupon) -> CoreResult<Coupon> {
    let code = normalize_code(&input.code);
    if code.is_empty() {
      return Err(CoreError::Validation("coupon code is required".into()));
    }
    validate_spec(&input.discount)?;
    validate_window(input.valid_from, input.valid_until)?;
    validate_scope(&input.applicable_products, &input.applicable_categories)?;
    let now = Utc::now();
    let coupon = Coupon {
      id: Uuid::new_v4(),
      code: code.clone(),
      discount: input.discount,
      minimum_purchase: input.minimum_purchase,
      maximum_discount: input.maximum_discount,
      usage_limit: input.usage_limit,
      usage_limit_per_customer: input.usage_limit_per_customer,
      usage_count: 0,
      valid_from: input.valid_from,
      valid_until: input.valid_until,
      applicable_products: input.applicable_products,
      applicable_categories: input.applicable_categories,
      first_order_only: input.first_order_only,
      active: true,
      created_at: now,
      updated_at: now,
    };
    let created = self.store.transaction(|txn| {
      if txn.coupon_by_code(&code).is_some() {
        return Err(CoreError::Conflict(format!(
          "coupon code '{code}' already exists"
        )));
      }
      txn.put_coupon(coupon.clone());
      Ok(coupon)
    })?;
    info!(coupon_id = %created.id, "coupon created");
    Ok(created)
  }

  pub fn coupon(&self, coupon_id: Uuid) -> CoreResult<Coupon> {
    self
      .store
      .coupon(coupon_id)
      .ok_or_else(|| CoreError::not_found("coupon", coupon_id))
  }

  pub fn coupon_by_code(&self, code: &str) -> CoreResult<Coupon> {
    let code = normalize_code(code);
    self
      .store
      .coupon_by_code(&code)
      .ok_or(CoreError::NotFound {
        entity: "coupon",
        id: code,
      })
  }

  pub fn coupons(&self) -> Vec<Coupon> {
    self.store.coupons()
  }

  pub fn update_coupon(&self, coupon_id: Uuid, patch: CouponPatch) -> CoreResult<Coupon> {
    if let Some(spec) = &patch.discount {
      validate_spec(spec)?;
    }
    validate_scope(&patch.applicable_products, &patch.applicable_categories)?;
    self.store.transaction(|txn| {
      let mut coupon = txn
        .coupon(coupon_id)
        .ok_or_else(|| CoreError::not_found("coupon", coupon_id))?;
      if let Some(spec) = patch.discount {
        coupon.discount = spec;
      }
      if let Some(value) = patch.minimum_purchase {
        coupon.minimum_purchase = Some(value);
      }
      if let Some(value) = patch.maximum_discount {
        coupon.maximum_discount = Some(value);
      }
      if let Some(value) = patch.usage_limit {
        coupon.usage_limit = Some(value);
      }
      if let Some(value) = patch.usage_limit_per_customer {
        coupon.usage_limit_per_customer = Some(value);
      }
      if let Some(value) = patch.valid_from {
        coupon.valid_from = Some(value);
      }
      if let Some(value) = patch.valid_until {
        coupon.valid_until = Some(value);
      }
      if let Some(set) = patch.applicable_products {
        coupon.applicable_products = Some(set);
      }
      if let Some(set) = patch.applicable_categories {
        coupon.applicable_categories = Some(set);
      }
      if let Some(value) = patch.first_order_only {
        coupon.first_order_only = value;
      }
      if let Some(value) = patch.active {
        coupon.active = value;
      }
      validate_window(coupon.valid_from, coupon.valid_until)?;
      coupon.updated_at = Utc::now();
      txn.put_coupon(coupon.clone());
      Ok(coupon)
    })
  }

  pub fn deactivate_coupon(&self, coupon_id: Uuid) -> CoreResult<Coupon> {
    self.update_coupon(
      coupon_id,
      CouponPatch {
        active: Some(false),
        ..CouponPatch::default()
      },
    )
  }

  // -- deals -------------------------------------------------------------

  #[instrument(skip(self, input), fields(name = %input.name))]
  pub fn create_deal(&self, input: NewDeal) -> CoreResult<Deal> {
    if input.name.trim().is_empty() {
      return Err(CoreError::Validation("deal name is required".into()));
    }
    validate_spec(&input.discount)?;
    validate_window(input.valid_from, input.valid_until)?;
    validate_scope(&input.applicable_products, &input.applicable_categories)?;
    validate_deal_shape(
      input.kind,
      input.buy_quantity,
      input.get_quantity,
      input.get_product_id,
      input.minimum_purchase,
    )?;
    let now = Utc::now();
    let deal = Deal {
      id: Uuid::new_v4(),
      name: input.name.trim().to_string(),
      kind: input.kind,
      discount: input.discount,
      priority: input.priority,
      minimum_purchase: input.minimum_purchase,
      maximum_discount: input.maximum_discount,
      applicable_products: input.applicable_products,
      applicable_categories: input.applicable_categories,
      buy_quantity: input.buy_quantity,
      get_quantity: input.get_quantity,
      get_product_id: input.get_product_id,
      usage_limit: input.usage_limit,
      usage_limit_per_customer: input.usage_limit_per_customer,
      usage_count: 0,
      valid_from: input.valid_from,
      valid_until: input.valid_until,
      active: true,
      created_at: now,
      updated_at: now,
    };
    let created = self.store.transaction(|txn| {
      txn.put_deal(deal.clone());
      Ok(deal)
    })?;
    info!(deal_id = %created.id, kind = created.kind.as_str(), "deal created");
    Ok(created)
  }

  pub fn deal(&self, deal_id: Uuid) -> CoreResult<Deal> {
    self
      .store
      .deal(deal_id)
      .ok_or_else(|| CoreError::not_found("deal", deal_id))
  }

  pub fn deals(&self) -> Vec<Deal> {
    self.store.deals()
  }

  pub fn update_deal(&self, deal_id: Uuid, patch: DealPatch) -> CoreResult<Deal> {
    if let Some(spec) = &patch.discount {
      validate_spec(spec)?;
    }
    validate_scope(&patch.applicable_products, &patch.applicable_categories)?;
    self.store.transaction(|txn| {
      let mut deal = txn
        .deal(deal_id)
        .ok_or_else(|| CoreError::not_found("deal", deal_id))?;
      if let Some(name) = patch.name {
        if name.trim().is_empty() {
          return Err(CoreError::Validation("deal name is required".into()));
        }
        deal.name = name.trim().to_string();
      }
      if let Some(spec) = patch.discount {
        deal.discount = spec;
      }
      if let Some(value) = patch.priority {
        deal.priority = value;
      }
      if let Some(value) = patch.minimum_purchase {
        deal.minimum_purchase = Some(value);
      }
      if let Some(value) = patch.maximum_discount {
        deal.maximum_discount = Some(value);
      }
      if let Some(set) = patch.applicable_products {
        deal.applicable_products = Some(set);
      }
      if let Some(set) = patch.applicable_categories {
        deal.applicable_categories = Some(set);
      }
      if let Some(value) = patch.buy_quantity {
        deal.buy_quantity = Some(value);
      }
      if let Some(value) = patch.get_quantity {
        deal.get_quantity = Some(value);
      }
      if let Some(value) = patch.get_product_id {
        deal.get_product_id = Some(value);
      }
      if let Some(value) = patch.usage_limit {
        deal.usage_limit = Some(value);
      }
      if let Some(value) = patch.usage_limit_per_customer {
        deal.usage_limit_per_customer = Some(value);
      }
      if let Some(value) = patch.valid_from {
        deal.valid_from = Some(value);
      }
      if let Some(value) = patch.valid_until {
        deal.valid_until = Some(value);
      }
      if let Some(value) = patch.active {
        deal.active = value;
      }
      validate_window(deal.valid_from, deal.valid_until)?;
      validate_deal_shape(
        deal.kind,
        deal.buy_quantity,
        deal.get_quantity,
        deal.get_product_id,
        deal.minimum_purchase,
      )?;
      deal.updated_at = Utc::now();
      txn.put_deal(deal.clone());
      Ok(deal)
    })
  }

  pub fn deactivate_deal(&self, deal_id: Uuid) -> CoreResult<Deal> {
    self.update_deal(
      deal_id,
      DealPatch {
        active: Some(false),
        ..DealPatch::default()
      },
    )
  }
}

fn validate_spec(spec: &DiscountSpec) -> CoreResult<()> {
  if spec.value <= Decimal::ZERO {
    return Err(CoreError::Validation(
      "discount value must be positive".into(),
    ));
  }
  if spec.kind == DiscountKind::Percentage && spec.value > Decimal::ONE_HUNDRED {
    return Err(CoreError::Validation(
      "percentage discounts cannot exceed 100".into(),
    ));
  }
  Ok(())
}

fn validate_window(from: Option<DateTime<Utc>>, until: Option<DateTime<Utc>>) -> CoreResult<()> {
  if let (Some(from), Some(until)) = (from, until) {
    if from > until {
      return Err(CoreError::Validation(
        "validity window ends before it starts".into(),
      ));
    }
  }
  Ok(())
}

fn validate_scope(
  products: &Option<HashSet<Uuid>>,
  categories: &Option<HashSet<Uuid>>,
) -> CoreResult<()> {
  let has_empty = products.as_ref().map_or(false, HashSet::is_empty)
    || categories.as_ref().map_or(false, HashSet::is_empty);
  if has_empty {
    return Err(CoreError::Validation(
      "applicability sets cannot be empty; omit the field for an unrestricted discount".into(),
    ));
  }
  Ok(())
}

fn validate_deal_shape(
  kind: DealKind,
  buy_quantity: Option<u32>,
  get_quantity: Option<u32>,
  get_product_id: Option<Uuid>,
  minimum_purchase: Option<Decimal>,
) -> CoreResult<()> {
  match kind {
    DealKind::BuyXGetY => {
      let complete = matches!(buy_quantity, Some(n) if n > 0)
        && matches!(get_quantity, Some(n) if n > 0)
        && get_product_id.is_some();
      if !complete {
        return Err(CoreError::Validation(
          "buy_x_get_y deals need buy_quantity, get_quantity and get_product_id".into(),
        ));
      }
    }
    DealKind::MinimumPurchase => {
      if minimum_purchase.is_none() {
        return Err(CoreError::Validation(
          "minimum_purchase deals need a minimum_purchase threshold".into(),
        ));
      }
    }
    _ => {}
  }
  Ok(())
}
