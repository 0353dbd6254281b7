// core/src/ledger.rs

//! Stock movements. Every change to a product's `stock_quantity` goes
//! through [`InventoryLedger::adjust_in`], which writes the new level and
//! its [`InventoryHistory`] row in the same transaction. Nothing else in the
//! crate touches stock, so the ledger always replays to the live quantity.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{Actor, InventoryHistory, Product, StockReason, StockRef};
use crate::error::{CoreError, CoreResult};
use crate::store::{Store, Txn};

#[derive(Clone)]
pub struct InventoryLedger {
  store: Arc<Store>,
}

impl InventoryLedger {
  pub fn new(store: Arc<Store>) -> Self {
    InventoryLedger { store }
  }

  /// Applies a signed stock delta inside the caller's transaction.
  ///
  /// Reads the current quantity, refuses to go negative unless
  /// `allow_backorder`, then stages the updated product and the ledger row
  /// together. Returns the product as it will stand after commit.
  #[allow(clippy::too_many_arguments)]
  pub fn adjust_in(
    &self,
    txn: &mut Txn<'_>,
    product_id: Uuid,
    delta: i64,
    reason: StockReason,
    reference: Option<StockRef>,
    actor: Actor,
    note: Option<String>,
    allow_backorder: bool,
  ) -> CoreResult<Product> {
    let mut product = txn.require_product(product_id)?;
    let old_quantity = product.stock_quantity;
    let new_quantity = old_quantity + delta;
    if new_quantity < 0 && !allow_backorder {
      return Err(CoreError::InsufficientStock {
        product_id,
        requested: -delta,
        available: old_quantity,
      });
    }
    let now = Utc::now();
    product.stock_quantity = new_quantity;
    product.updated_at = now;
    txn.put_product(product.clone());
    txn.append_inventory(InventoryHistory {
      id: Uuid::new_v4(),
      product_id,
      old_quantity,
      new_quantity,
      adjustment: delta,
      reason,
      reference,
      actor,
      note,
      created_at: now,
    });
    debug!(%product_id, old_quantity, new_quantity, reason = %reason, "stock adjusted");
    Ok(product)
  }

  /// Standalone adjustment in its own transaction. This is the restock /
  /// manual-correction path; order flows compose [`Self::adjust_in`] into
  /// their own transactions instead.
  pub fn adjust(
    &self,
    product_id: Uuid,
    delta: i64,
    reason: StockReason,
    actor: Actor,
    note: Option<String>,
    allow_backorder: bool,
  ) -> CoreResult<Product> {
    self.store.transaction(|txn| {
      self.adjust_in(
        txn,
        product_id,
        delta,
        reason,
        None,
        actor,
        note,
        allow_backorder,
      )
    })
  }

  /// Movement history for a product, oldest first. Summing `adjustment`
  /// over it reproduces the live quantity; a mismatch means drift.
  pub fn history(&self, product_id: Uuid) -> Vec<InventoryHistory> {
    self.store.inventory_for_product(product_id)
  }
}
