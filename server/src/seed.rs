// server/src/seed.rs

use rust_decimal_macros::dec;
use tracing::info;
use uuid::Uuid;

use crossdock::catalog::{NewCoupon, NewDeal, NewProduct};
use crossdock::{Actor, DealKind, DiscountKind, DiscountSpec};

use crate::errors::Result;
use crate::state::AppState;

/// Seeds a handful of products, a welcome coupon and a storewide flash
/// deal so a fresh instance answers real requests. Not idempotent; run it
/// against an empty store only.
pub fn seed_demo_data(state: &AppState) -> Result<String> {
  let admin = Actor::Admin(Uuid::new_v4());

  let products = [
    ("Standing Desk", "SKU-DESK", dec!(250.00), 20),
    ("Mesh Chair", "SKU-CHAIR", dec!(120.00), 35),
    ("Monitor Arm", "SKU-ARM", dec!(45.00), 50),
    ("Walnut Desk Mat", "SKU-MAT", dec!(18.50), 80),
  ];
  for (name, sku, price, stock) in products {
    let product = state.catalog.create_product(
      NewProduct {
        name: name.to_string(),
        sku: Some(sku.to_string()),
        image: None,
        category_id: None,
        price,
        initial_stock: stock,
      },
      admin,
    )?;
    info!(product_id = %product.id, name, "seeded product");
  }

  state.catalog.create_coupon(NewCoupon {
    code: "WELCOME10".to_string(),
    discount: DiscountSpec {
      kind: DiscountKind::Percentage,
      value: dec!(10),
    },
    minimum_purchase: Some(dec!(100)),
    maximum_discount: Some(dec!(80)),
    usage_limit: None,
    usage_limit_per_customer: Some(1),
    valid_from: None,
    valid_until: None,
    applicable_products: None,
    applicable_categories: None,
    first_order_only: false,
  })?;

  state.catalog.create_deal(NewDeal {
    name: "Monsoon Flash".to_string(),
    kind: DealKind::Flash,
    discount: DiscountSpec {
      kind: DiscountKind::Percentage,
      value: dec!(5),
    },
    priority: 10,
    minimum_purchase: None,
    maximum_discount: None,
    applicable_products: None,
    applicable_categories: None,
    buy_quantity: None,
    get_quantity: None,
    get_product_id: None,
    usage_limit: None,
    usage_limit_per_customer: None,
    valid_from: None,
    valid_until: None,
  })?;

  Ok(format!("{} products, 1 coupon, 1 deal", products.len()))
}
