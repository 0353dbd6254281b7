// core/examples/cancellation_flow.rs

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::info;
use uuid::Uuid;

use crossdock::catalog::NewProduct;
use crossdock::{
  Actor, ActorKind, CancellationWorkflow, Catalog, CheckoutItem, CheckoutRequest,
  CustomerDirectory, CustomerProfile, InventoryLedger, NotificationSink, OrderAssembler,
  OrderNotification, OrderStateMachine, OrderStatus, ShippingRates, Store, StoreSettings,
};

struct DemoDirectory;

#[async_trait]
impl CustomerDirectory for DemoDirectory {
  async fn lookup(&self, customer_id: Uuid) -> anyhow::Result<Option<CustomerProfile>> {
    Ok(Some(CustomerProfile {
      id: customer_id,
      name: "Tanvir Ahmed".to_string(),
      email: None,
    }))
  }
}

struct FreeShipping;

#[async_trait]
impl ShippingRates for FreeShipping {
  async fn quote(&self, _method: &str, _line_count: u32) -> anyhow::Result<Decimal> {
    Ok(Decimal::ZERO)
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

async fn place_order(
  assembler: &OrderAssembler,
  product_id: Uuid,
  quantity: u32,
) -> anyhow::Result<crossdock::Order> {
  let customer_id = Uuid::new_v4();
  let outcome = assembler
    .create(
      CheckoutRequest {
        customer_id,
        items: vec![CheckoutItem {
          product_id: Some(product_id),
          quantity,
          name: None,
          sku: None,
          unit_price: None,
          variation: None,
        }],
        coupon_code: None,
        allow_without_coupon: false,
        shipping_method: "standard".to_string(),
      },
      Actor::Customer(customer_id),
    )
    .await?;
  Ok(outcome.order)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Cancellation Flow ---");

  // 1. Wire the engine; the workflow shares the store with checkout.
  let store = Arc::new(Store::new());
  let catalog = Catalog::new(store.clone());
  let machine = OrderStateMachine::new(store.clone());
  let ledger = InventoryLedger::new(store.clone());
  let sink: Arc<dyn NotificationSink> = Arc::new(LoggingSink);
  let assembler = OrderAssembler::new(
    store.clone(),
    Arc::new(DemoDirectory),
    Arc::new(FreeShipping),
    sink.clone(),
    StoreSettings {
      tax_rate: Decimal::ZERO,
      tax_inclusive: false,
    },
  );
  let cancellation = CancellationWorkflow::new(store.clone(), sink);

  let admin_id = Uuid::new_v4();
  let admin = Actor::Admin(admin_id);
  let pack = catalog.create_product(
    NewProduct {
      name: "Trail Backpack".to_string(),
      sku: Some("SKU-PACK".to_string()),
      image: None,
      category_id: None,
      price: dec!(80.00),
      initial_stock: 10,
    },
    admin,
  )?;

  // 2. Scenario one: the customer asks out mid-purchase and the admin
  //    approves. Stock comes back in the same transaction.
  info!("scenario 1: request approved");
  let order = place_order(&assembler, pack.id, 3).await?;
  machine.transition(order.id, OrderStatus::Purchasing, admin, None)?;

  let order = cancellation
    .request(
      order.id,
      Actor::Customer(order.customer_id),
      Some("ordered the wrong size".to_string()),
    )
    .await?;
  info!(
    order = %order.order_number,
    pending = order.cancellation_pending(),
    "cancellation requested"
  );

  let order = cancellation.approve(order.id, admin_id, None).await?;
  info!(order = %order.order_number, status = %order.status, "request approved");

  assert_eq!(order.status, OrderStatus::Cancelled);
  assert_eq!(order.cancelled_by, Some(ActorKind::Admin));
  assert_eq!(store.product(pack.id).map(|p| p.stock_quantity), Some(10));

  // 3. Scenario two: the admin rejects; the order keeps moving and the
  //    units stay sold.
  info!("scenario 2: request rejected");
  let order = place_order(&assembler, pack.id, 2).await?;
  machine.transition(order.id, OrderStatus::Purchasing, admin, None)?;
  cancellation
    .request(
      order.id,
      Actor::Customer(order.customer_id),
      Some("changed my mind".to_string()),
    )
    .await?;
  let order = cancellation
    .reject(order.id, admin_id, Some("already bought from supplier".to_string()))
    .await?;
  info!(
    order = %order.order_number,
    pending = order.cancellation_pending(),
    "request rejected"
  );

  let order = machine.transition(order.id, OrderStatus::Completed, admin, None)?;
  assert_eq!(order.status, OrderStatus::Completed);
  assert_eq!(store.product(pack.id).map(|p| p.stock_quantity), Some(8));

  // 4. The ledger tells the whole story: intake, two sales, one restore.
  info!("ledger for {}:", pack.name);
  for row in ledger.history(pack.id) {
    info!(
      "  {} {:+} ({} -> {})",
      row.reason.as_str(),
      row.adjustment,
      row.old_quantity,
      row.new_quantity
    );
  }
  assert_eq!(ledger.history(pack.id).len(), 4);

  info!("cancellation flow complete");
  Ok(())
}
