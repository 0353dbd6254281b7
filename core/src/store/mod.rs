// core/src/store/mod.rs

//! In-memory transactional storage.
//!
//! One writer-exclusive `parking_lot::RwLock` guards every table. Mutating
//! operations run inside [`Store::transaction`]: the closure stages its
//! writes on a [`Txn`], and the stage is applied to the live tables only when
//! the closure returns `Ok`. An error discards the stage, so a failed
//! operation leaves no partial rows behind.
//!
//! Writer exclusivity doubles as row locking: while a transaction is open no
//! other writer can observe or move the quantities it read.

mod txn;

pub use txn::Txn;

use std::collections::HashMap;

use parking_lot::RwLock;
use uuid::Uuid;

use crate::domain::{
  Coupon, CouponUsage, Deal, DealUsage, InventoryHistory, Order, OrderItem, OrderStatusHistory,
  Product,
};
use crate::error::CoreResult;

#[derive(Debug, Default)]
pub(crate) struct Tables {
  pub(crate) products: HashMap<Uuid, Product>,
  pub(crate) orders: HashMap<Uuid, Order>,
  /// order_number -> order id, kept in sync with `orders`.
  pub(crate) order_numbers: HashMap<String, Uuid>,
  /// Insertion order is preserved so order lines list the way they were bought.
  pub(crate) order_items: Vec<OrderItem>,
  pub(crate) status_history: Vec<OrderStatusHistory>,
  pub(crate) coupons: HashMap<Uuid, Coupon>,
  /// Normalized (uppercase) code -> coupon id.
  pub(crate) coupon_codes: HashMap<String, Uuid>,
  pub(crate) coupon_usages: Vec<CouponUsage>,
  pub(crate) deals: HashMap<Uuid, Deal>,
  pub(crate) deal_usages: Vec<DealUsage>,
  pub(crate) inventory_history: Vec<InventoryHistory>,
}

#[derive(Default)]
pub struct Store {
  tables: RwLock<Tables>,
}

impl Store {
  pub fn new() -> Self {
    Self::default()
  }

  /// Runs `f` under the writer-exclusive lock and commits its staged writes
  /// atomically if it returns `Ok`. On `Err` the stage is dropped untouched.
  ///
  /// `f` is synchronous by construction: never carry the transaction across
  /// an `.await`, and do all collaborator calls before entering it.
  pub fn transaction<T>(&self, f: impl FnOnce(&mut Txn<'_>) -> CoreResult<T>) -> CoreResult<T> {
    let mut guard = self.tables.write();
    let mut txn = Txn::new(&guard);
    let outcome = f(&mut txn);
    let stage = txn.into_stage();
    match outcome {
      Ok(value) => {
        stage.apply(&mut guard);
        Ok(value)
      }
      Err(err) => Err(err),
    }
  }

  // Read side: shared lock, owned clones out. Snapshots may be stale by the
  // time the caller looks at them; anything that must act on current values
  // re-reads inside a transaction.

  pub fn product(&self, id: Uuid) -> Option<Product> {
    self.tables.read().products.get(&id).cloned()
  }

  pub fn products(&self) -> Vec<Product> {
    let guard = self.tables.read();
    let mut products: Vec<Product> = guard.products.values().cloned().collect();
    products.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    products
  }

  pub fn order(&self, id: Uuid) -> Option<Order> {
    self.tables.read().orders.get(&id).cloned()
  }

  pub fn order_by_number(&self, number: &str) -> Option<Order> {
    let guard = self.tables.read();
    let id = guard.order_numbers.get(number)?;
    guard.orders.get(id).cloned()
  }

  /// All orders, newest first.
  pub fn orders(&self) -> Vec<Order> {
    let guard = self.tables.read();
    let mut orders: Vec<Order> = guard.orders.values().cloned().collect();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
    orders
  }

  /// A customer's orders, newest first.
  pub fn orders_for_customer(&self, customer_id: Uuid) -> Vec<Order> {
    let guard = self.tables.read();
    let mut orders: Vec<Order> = guard
      .orders
      .values()
      .filter(|order| order.customer_id == customer_id)
      .cloned()
      .collect();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
    orders
  }

  pub fn items_for_order(&self, order_id: Uuid) -> Vec<OrderItem> {
    self
      .tables
      .read()
      .order_items
      .iter()
      .filter(|item| item.order_id == order_id)
      .cloned()
      .collect()
  }

  /// Status transitions for an order, oldest first.
  pub fn history_for_order(&self, order_id: Uuid) -> Vec<OrderStatusHistory> {
    self
      .tables
      .read()
      .status_history
      .iter()
      .filter(|row| row.order_id == order_id)
      .cloned()
      .collect()
  }

  pub fn coupon(&self, id: Uuid) -> Option<Coupon> {
    self.tables.read().coupons.get(&id).cloned()
  }

  /// Lookup by normalized (uppercase) code.
  pub fn coupon_by_code(&self, code: &str) -> Option<Coupon> {
    let guard = self.tables.read();
    let id = guard.coupon_codes.get(code)?;
    guard.coupons.get(id).cloned()
  }

  pub fn coupons(&self) -> Vec<Coupon> {
    let guard = self.tables.read();
    let mut coupons: Vec<Coupon> = guard.coupons.values().cloned().collect();
    coupons.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    coupons
  }

  pub fn coupon_usages_for_order(&self, order_id: Uuid) -> Vec<CouponUsage> {
    self
      .tables
      .read()
      .coupon_usages
      .iter()
      .filter(|row| row.order_id == order_id)
      .cloned()
      .collect()
  }

  pub fn deal(&self, id: Uuid) -> Option<Deal> {
    self.tables.read().deals.get(&id).cloned()
  }

  pub fn deals(&self) -> Vec<Deal> {
    let guard = self.tables.read();
    let mut deals: Vec<Deal> = guard.deals.values().cloned().collect();
    deals.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    deals
  }

  pub fn deal_usages_for_order(&self, order_id: Uuid) -> Vec<DealUsage> {
    self
      .tables
      .read()
      .deal_usages
      .iter()
      .filter(|row| row.order_id == order_id)
      .cloned()
      .collect()
  }

  /// Stock movements for a product, oldest first.
  pub fn inventory_for_product(&self, product_id: Uuid) -> Vec<InventoryHistory> {
    self
      .tables
      .read()
      .inventory_history
      .iter()
      .filter(|row| row.product_id == product_id)
      .cloned()
      .collect()
  }
}
