// core/src/store/txn.rs

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::domain::{
  Coupon, CouponUsage, Deal, DealUsage, InventoryHistory, Order, OrderItem, OrderStatusHistory,
  Product,
};
use crate::error::{CoreError, CoreResult};

use super::Tables;

/// Writes buffered by a [`Txn`]. Applied to the live tables in one go on
/// commit, dropped wholesale on error.
#[derive(Debug, Default)]
pub(crate) struct Stage {
  products: HashMap<Uuid, Product>,
  orders: HashMap<Uuid, Order>,
  deleted_orders: HashSet<Uuid>,
  order_items: Vec<OrderItem>,
  status_history: Vec<OrderStatusHistory>,
  coupons: HashMap<Uuid, Coupon>,
  coupon_usages: Vec<CouponUsage>,
  deals: HashMap<Uuid, Deal>,
  deal_usages: Vec<DealUsage>,
  inventory_history: Vec<InventoryHistory>,
}

impl Stage {
  pub(crate) fn apply(self, tables: &mut Tables) {
    // Deletions first so a delete-then-reuse of an order number inside one
    // transaction lands correctly.
    for id in &self.deleted_orders {
      if let Some(order) = tables.orders.remove(id) {
        tables.order_numbers.remove(&order.order_number);
      }
      tables.order_items.retain(|item| item.order_id != *id);
      tables.status_history.retain(|row| row.order_id != *id);
    }
    for (id, product) in self.products {
      tables.products.insert(id, product);
    }
    for (id, order) in self.orders {
      tables.order_numbers.insert(order.order_number.clone(), id);
      tables.orders.insert(id, order);
    }
    for item in self.order_items {
      match tables.order_items.iter_mut().find(|row| row.id == item.id) {
        Some(existing) => *existing = item,
        None => tables.order_items.push(item),
      }
    }
    tables.status_history.extend(self.status_history);
    for (id, coupon) in self.coupons {
      if let Some(previous) = tables.coupons.get(&id) {
        if previous.code != coupon.code {
          tables.coupon_codes.remove(&previous.code);
        }
      }
      tables.coupon_codes.insert(coupon.code.clone(), id);
      tables.coupons.insert(id, coupon);
    }
    tables.coupon_usages.extend(self.coupon_usages);
    for (id, deal) in self.deals {
      tables.deals.insert(id, deal);
    }
    tables.deal_usages.extend(self.deal_usages);
    tables.inventory_history.extend(self.inventory_history);
  }
}

/// A unit of work over the store. Reads go through the stage first, then the
/// live tables, and always hand out owned clones; writes only touch the
/// stage. See [`super::Store::transaction`].
pub struct Txn<'a> {
  base: &'a Tables,
  stage: Stage,
}

impl<'a> Txn<'a> {
  pub(crate) fn new(base: &'a Tables) -> Self {
    Txn {
      base,
      stage: Stage::default(),
    }
  }

  pub(crate) fn into_stage(self) -> Stage {
    self.stage
  }

  // -- products ----------------------------------------------------------

  pub fn product(&self, id: Uuid) -> Option<Product> {
    self
      .stage
      .products
      .get(&id)
      .or_else(|| self.base.products.get(&id))
      .cloned()
  }

  pub fn require_product(&self, id: Uuid) -> CoreResult<Product> {
    self
      .product(id)
      .ok_or_else(|| CoreError::not_found("product", id))
  }

  pub fn put_product(&mut self, product: Product) {
    self.stage.products.insert(product.id, product);
  }

  // -- orders ------------------------------------------------------------

  pub fn order(&self, id: Uuid) -> Option<Order> {
    if self.stage.deleted_orders.contains(&id) {
      return None;
    }
    self
      .stage
      .orders
      .get(&id)
      .or_else(|| self.base.orders.get(&id))
      .cloned()
  }

  pub fn require_order(&self, id: Uuid) -> CoreResult<Order> {
    self.order(id).ok_or_else(|| CoreError::not_found("order", id))
  }

  pub fn put_order(&mut self, order: Order) {
    self.stage.orders.insert(order.id, order);
  }

  /// Tombstones the order and drops its items and history with it.
  pub fn delete_order(&mut self, id: Uuid) {
    self.stage.orders.remove(&id);
    self.stage.order_items.retain(|item| item.order_id != id);
    self.stage.status_history.retain(|row| row.order_id != id);
    self.stage.deleted_orders.insert(id);
  }

  pub fn order_number_taken(&self, number: &str) -> bool {
    self
      .stage
      .orders
      .values()
      .any(|order| order.order_number == number)
      || self.base.order_numbers.contains_key(number)
  }

  /// Whether the customer has any order on file. Orders staged earlier in
  /// this transaction count; tombstoned ones do not.
  pub fn customer_has_orders(&self, customer_id: Uuid) -> bool {
    self
      .stage
      .orders
      .values()
      .any(|order| order.customer_id == customer_id)
      || self.base.orders.values().any(|order| {
        order.customer_id == customer_id && !self.stage.deleted_orders.contains(&order.id)
      })
  }

  // -- order items -------------------------------------------------------

  pub fn item(&self, id: Uuid) -> Option<OrderItem> {
    self
      .stage
      .order_items
      .iter()
      .rev()
      .find(|item| item.id == id)
      .or_else(|| self.base.order_items.iter().find(|item| item.id == id))
      .cloned()
  }

  /// Inserts or replaces a line; the latest staged write for an id wins.
  pub fn put_item(&mut self, item: OrderItem) {
    self.stage.order_items.push(item);
  }

  pub fn items_for_order(&self, order_id: Uuid) -> Vec<OrderItem> {
    let mut items: Vec<OrderItem> = Vec::new();
    for item in self
      .base
      .order_items
      .iter()
      .filter(|item| item.order_id == order_id)
    {
      match self
        .stage
        .order_items
        .iter()
        .rev()
        .find(|staged| staged.id == item.id)
      {
        Some(staged) => items.push(staged.clone()),
        None => items.push(item.clone()),
      }
    }
    for item in self
      .stage
      .order_items
      .iter()
      .filter(|item| item.order_id == order_id)
    {
      if !items.iter().any(|existing| existing.id == item.id) {
        items.push(item.clone());
      }
    }
    items
  }

  // -- status history ----------------------------------------------------

  pub fn append_history(&mut self, row: OrderStatusHistory) {
    self.stage.status_history.push(row);
  }

  // -- coupons -----------------------------------------------------------

  pub fn coupon(&self, id: Uuid) -> Option<Coupon> {
    self
      .stage
      .coupons
      .get(&id)
      .or_else(|| self.base.coupons.get(&id))
      .cloned()
  }

  /// Lookup by normalized (uppercase) code. A staged edit that renames a
  /// coupon away from `code` hides the base row.
  pub fn coupon_by_code(&self, code: &str) -> Option<Coupon> {
    if let Some(coupon) = self.stage.coupons.values().find(|c| c.code == code) {
      return Some(coupon.clone());
    }
    let id = self.base.coupon_codes.get(code)?;
    if self.stage.coupons.contains_key(id) {
      return None;
    }
    self.base.coupons.get(id).cloned()
  }

  pub fn put_coupon(&mut self, coupon: Coupon) {
    self.stage.coupons.insert(coupon.id, coupon);
  }

  pub fn append_coupon_usage(&mut self, usage: CouponUsage) {
    self.stage.coupon_usages.push(usage);
  }

  pub fn coupon_uses_by_customer(&self, coupon_id: Uuid, customer_id: Uuid) -> u32 {
    let matches = |row: &&CouponUsage| row.coupon_id == coupon_id && row.customer_id == customer_id;
    let base = self.base.coupon_usages.iter().filter(matches).count();
    let staged = self.stage.coupon_usages.iter().filter(matches).count();
    (base + staged) as u32
  }

  // -- deals -------------------------------------------------------------

  pub fn deal(&self, id: Uuid) -> Option<Deal> {
    self
      .stage
      .deals
      .get(&id)
      .or_else(|| self.base.deals.get(&id))
      .cloned()
  }

  pub fn deals(&self) -> Vec<Deal> {
    let mut deals: Vec<Deal> = self
      .base
      .deals
      .values()
      .filter(|deal| !self.stage.deals.contains_key(&deal.id))
      .cloned()
      .collect();
    deals.extend(self.stage.deals.values().cloned());
    deals
  }

  pub fn put_deal(&mut self, deal: Deal) {
    self.stage.deals.insert(deal.id, deal);
  }

  pub fn append_deal_usage(&mut self, usage: DealUsage) {
    self.stage.deal_usages.push(usage);
  }

  pub fn deal_uses_by_customer(&self, deal_id: Uuid, customer_id: Uuid) -> u32 {
    let matches = |row: &&DealUsage| row.deal_id == deal_id && row.customer_id == customer_id;
    let base = self.base.deal_usages.iter().filter(matches).count();
    let staged = self.stage.deal_usages.iter().filter(matches).count();
    (base + staged) as u32
  }

  // -- inventory ---------------------------------------------------------

  pub fn append_inventory(&mut self, row: InventoryHistory) {
    self.stage.inventory_history.push(row);
  }
}
