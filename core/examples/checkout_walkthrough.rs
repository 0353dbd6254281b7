// core/examples/checkout_walkthrough.rs

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::info;
use uuid::Uuid;

use crossdock::catalog::{NewCoupon, NewDeal, NewProduct};
use crossdock::{
  Actor, Catalog, CheckoutItem, CheckoutRequest, CustomerDirectory, CustomerProfile, DealKind,
  DiscountKind, DiscountSpec, InventoryLedger, NotificationSink, OrderAssembler,
  OrderNotification, OrderQueries, OrderStateMachine, OrderStatus, ShippingRates, Store,
  StoreSettings,
};

// 1. Implement the collaborators the engine expects from the application.
//    A real deployment backs these with the customer service, a rate card,
//    and an email/SMS gateway; the demo keeps them in-process.

struct DemoDirectory;

#[async_trait]
impl CustomerDirectory for DemoDirectory {
  async fn lookup(&self, customer_id: Uuid) -> anyhow::Result<Option<CustomerProfile>> {
    Ok(Some(CustomerProfile {
      id: customer_id,
      name: "Amina Rahman".to_string(),
      email: Some("amina@example.com".to_string()),
    }))
  }
}

struct FlatRates;

#[async_trait]
impl ShippingRates for FlatRates {
  async fn quote(&self, method: &str, _line_count: u32) -> anyhow::Result<Decimal> {
    Ok(match method {
      "express" => dec!(120),
      _ => dec!(60),
    })
  }
}

struct LoggingSink;

#[async_trait]
impl NotificationSink for LoggingSink {
  async fn deliver(&self, notification: OrderNotification) -> anyhow::Result<()> {
    info!(
      kind = notification.kind.as_str(),
      order = %notification.order_number,
      "notification sent"
    );
    Ok(())
  }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Checkout Walkthrough ---");

  // 2. Wire the engine over one shared store.
  let store = Arc::new(Store::new());
  let catalog = Catalog::new(store.clone());
  let machine = OrderStateMachine::new(store.clone());
  let queries = OrderQueries::new(store.clone());
  let ledger = InventoryLedger::new(store.clone());
  let assembler = OrderAssembler::new(
    store.clone(),
    Arc::new(DemoDirectory),
    Arc::new(FlatRates),
    Arc::new(LoggingSink),
    StoreSettings {
      tax_rate: dec!(10),
      tax_inclusive: false,
    },
  );

  // 3. Seed the catalog: two products, a storewide flash deal, a coupon.
  let admin = Actor::Admin(Uuid::new_v4());
  let desk = catalog.create_product(
    NewProduct {
      name: "Standing Desk".to_string(),
      sku: Some("SKU-DESK".to_string()),
      image: None,
      category_id: None,
      price: dec!(250.00),
      initial_stock: 20,
    },
    admin,
  )?;
  let chair = catalog.create_product(
    NewProduct {
      name: "Mesh Chair".to_string(),
      sku: Some("SKU-CHAIR".to_string()),
      image: None,
      category_id: None,
      price: dec!(120.00),
      initial_stock: 35,
    },
    admin,
  )?;
  catalog.create_deal(NewDeal {
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
  catalog.create_coupon(NewCoupon {
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

  // 4. A customer checks out, entering the coupon in lowercase.
  let customer_id = Uuid::new_v4();
  let outcome = assembler
    .create(
      CheckoutRequest {
        customer_id,
        items: vec![
          CheckoutItem {
            product_id: Some(desk.id),
            quantity: 1,
            name: None,
            sku: None,
            unit_price: None,
            variation: None,
          },
          CheckoutItem {
            product_id: Some(chair.id),
            quantity: 2,
            name: None,
            sku: None,
            unit_price: None,
            variation: None,
          },
        ],
        coupon_code: Some("welcome10".to_string()),
        allow_without_coupon: false,
        shipping_method: "standard".to_string(),
      },
      Actor::Customer(customer_id),
    )
    .await?;

  let order = outcome.order;
  info!(number = %order.order_number, "order placed");
  info!(
    "subtotal {}  discount {}  shipping {}  tax {}  total {}",
    order.subtotal, order.discount_amount, order.shipping_cost, order.tax_amount, order.total_amount
  );
  if let Some(deal) = &outcome.deal {
    info!("deal applied: {} (-{})", deal.name, deal.amount);
  }
  if let Some(coupon) = &outcome.coupon {
    info!("coupon applied: {} (-{})", coupon.code, coupon.amount);
  }

  // 5. An admin walks the order down the fulfillment chain.
  for target in [
    OrderStatus::Purchasing,
    OrderStatus::ShippedFromSupplier,
    OrderStatus::ReceivedInBdWarehouse,
    OrderStatus::OnTheWayToDelivery,
    OrderStatus::Completed,
  ] {
    machine.transition(order.id, target, admin, None)?;
  }

  // 6. The audit trail and the stock ledger reflect every move.
  info!("status history:");
  for row in queries.history(order.id)? {
    match row.old_status {
      Some(old) => info!("  {} -> {}", old, row.new_status),
      None => info!("  created as {}", row.new_status),
    }
  }
  info!("ledger for {}:", desk.name);
  for row in ledger.history(desk.id) {
    info!(
      "  {} {:+} ({} -> {})",
      row.reason.as_str(),
      row.adjustment,
      row.old_quantity,
      row.new_quantity
    );
  }

  // Deal takes 5% of 490.00, the coupon 10% of what remains.
  assert_eq!(order.subtotal, dec!(490.00));
  assert_eq!(order.discount_amount, dec!(71.05));
  assert_eq!(order.total_amount, dec!(520.85));
  let final_order = queries.summary(order.id)?;
  assert_eq!(final_order.status, OrderStatus::Completed);
  assert_eq!(store.product(desk.id).map(|p| p.stock_quantity), Some(19));
  assert_eq!(store.product(chair.id).map(|p| p.stock_quantity), Some(33));

  info!("walkthrough complete");
  Ok(())
}
