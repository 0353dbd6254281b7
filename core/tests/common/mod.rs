// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::Level;
use uuid::Uuid;

use crossdock::catalog::{NewCoupon, NewDeal, NewProduct};
use crossdock::{
  Actor, CancellationWorkflow, Catalog, CheckoutItem, CheckoutOutcome, CheckoutRequest,
  CustomerDirectory, CustomerProfile, DealKind, DiscountKind, DiscountSpec, InventoryLedger,
  NotificationKind, NotificationSink, Order, OrderAssembler, OrderQueries, OrderStateMachine,
  OrderNotification, OrderStatus, Product, ShippingRates, Store, StoreSettings, UsageTracker,
};

// --- Test Collaborators ---

/// Resolves every customer id to a profile.
pub struct OpenDirectory;

#[async_trait]
impl CustomerDirectory for OpenDirectory {
  async fn lookup(&self, customer_id: Uuid) -> anyhow::Result<Option<CustomerProfile>> {
    Ok(Some(CustomerProfile {
      id: customer_id,
      name: format!("customer-{}", &customer_id.simple().to_string()[..8]),
      email: None,
    }))
  }
}

/// Knows no customers at all.
pub struct EmptyDirectory;

#[async_trait]
impl CustomerDirectory for EmptyDirectory {
  async fn lookup(&self, _customer_id: Uuid) -> anyhow::Result<Option<CustomerProfile>> {
    Ok(None)
  }
}

/// Directory whose backend is down.
pub struct FailingDirectory;

#[async_trait]
impl CustomerDirectory for FailingDirectory {
  async fn lookup(&self, _customer_id: Uuid) -> anyhow::Result<Option<CustomerProfile>> {
    Err(anyhow::anyhow!("directory unavailable"))
  }
}

/// Quotes the same cost for every method.
pub struct FlatShipping(pub Decimal);

#[async_trait]
impl ShippingRates for FlatShipping {
  async fn quote(&self, _method: &str, _line_count: u32) -> anyhow::Result<Decimal> {
    Ok(self.0)
  }
}

/// Captures delivered notifications for assertions.
#[derive(Default)]
pub struct RecordingSink {
  delivered: Mutex<Vec<OrderNotification>>,
}

impl RecordingSink {
  pub fn kinds(&self) -> Vec<NotificationKind> {
    self.delivered.lock().iter().map(|n| n.kind).collect()
  }

  pub fn take(&self) -> Vec<OrderNotification> {
    std::mem::take(&mut *self.delivered.lock())
  }

  pub fn count(&self) -> usize {
    self.delivered.lock().len()
  }
}

#[async_trait]
impl NotificationSink for RecordingSink {
  async fn deliver(&self, notification: OrderNotification) -> anyhow::Result<()> {
    self.delivered.lock().push(notification);
    Ok(())
  }
}

/// Sink that always fails; operations must still succeed.
pub struct FailingSink;

#[async_trait]
impl NotificationSink for FailingSink {
  async fn deliver(&self, _notification: OrderNotification) -> anyhow::Result<()> {
    Err(anyhow::anyhow!("sink offline"))
  }
}

// --- Wired-up engine for tests ---

pub struct TestApp {
  pub store: Arc<Store>,
  pub catalog: Catalog,
  pub assembler: OrderAssembler,
  pub machine: OrderStateMachine,
  pub cancellation: CancellationWorkflow,
  pub queries: OrderQueries,
  pub ledger: InventoryLedger,
  pub usage: UsageTracker,
  pub sink: Arc<RecordingSink>,
}

/// Engine with zero tax and free shipping, so money assertions stay flat.
pub fn test_app() -> TestApp {
  app_with(
    StoreSettings {
      tax_rate: Decimal::ZERO,
      tax_inclusive: false,
    },
    Decimal::ZERO,
  )
}

pub fn app_with(settings: StoreSettings, shipping_rate: Decimal) -> TestApp {
  let store = Arc::new(Store::new());
  let sink = Arc::new(RecordingSink::default());
  let assembler = OrderAssembler::new(
    store.clone(),
    Arc::new(OpenDirectory),
    Arc::new(FlatShipping(shipping_rate)),
    sink.clone(),
    settings,
  );
  TestApp {
    catalog: Catalog::new(store.clone()),
    machine: OrderStateMachine::new(store.clone()),
    cancellation: CancellationWorkflow::new(store.clone(), sink.clone()),
    queries: OrderQueries::new(store.clone()),
    ledger: InventoryLedger::new(store.clone()),
    usage: UsageTracker::new(store.clone()),
    assembler,
    sink,
    store,
  }
}

/// Assembler over the same store but with different collaborators, for
/// outage and lookup-miss tests.
pub fn assembler_for(
  app: &TestApp,
  customers: Arc<dyn CustomerDirectory>,
  notifications: Arc<dyn NotificationSink>,
) -> OrderAssembler {
  OrderAssembler::new(
    app.store.clone(),
    customers,
    Arc::new(FlatShipping(Decimal::ZERO)),
    notifications,
    StoreSettings {
      tax_rate: Decimal::ZERO,
      tax_inclusive: false,
    },
  )
}

// --- Actors ---

pub fn admin() -> Actor {
  Actor::Admin(Uuid::new_v4())
}

pub fn customer() -> Actor {
  Actor::Customer(Uuid::new_v4())
}

// --- Seed helpers ---

pub fn seed_product(app: &TestApp, name: &str, price: Decimal, stock: i64) -> Product {
  seed_product_in(app, name, price, stock, None)
}

pub fn seed_product_in(
  app: &TestApp,
  name: &str,
  price: Decimal,
  stock: i64,
  category_id: Option<Uuid>,
) -> Product {
  app
    .catalog
    .create_product(
      NewProduct {
        name: name.to_string(),
        sku: Some(format!("SKU-{}", name.to_uppercase().replace(' ', "-"))),
        image: None,
        category_id,
        price,
        initial_stock: stock,
      },
      admin(),
    )
    .expect("seed product")
}

pub fn percent_coupon(code: &str, value: Decimal) -> NewCoupon {
  NewCoupon {
    code: code.to_string(),
    discount: DiscountSpec {
      kind: DiscountKind::Percentage,
      value,
    },
    minimum_purchase: None,
    maximum_discount: None,
    usage_limit: None,
    usage_limit_per_customer: None,
    valid_from: None,
    valid_until: None,
    applicable_products: None,
    applicable_categories: None,
    first_order_only: false,
  }
}

pub fn fixed_coupon(code: &str, value: Decimal) -> NewCoupon {
  let mut coupon = percent_coupon(code, value);
  coupon.discount.kind = DiscountKind::Fixed;
  coupon
}

pub fn percent_deal(name: &str, value: Decimal, priority: i32) -> NewDeal {
  NewDeal {
    name: name.to_string(),
    kind: DealKind::Flash,
    discount: DiscountSpec {
      kind: DiscountKind::Percentage,
      value,
    },
    priority,
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
  }
}

// --- Checkout helpers ---

pub fn catalog_item(product: &Product, quantity: u32) -> CheckoutItem {
  CheckoutItem {
    product_id: Some(product.id),
    quantity,
    name: None,
    sku: None,
    unit_price: None,
    variation: None,
  }
}

pub fn external_item(name: &str, unit_price: Decimal, quantity: u32) -> CheckoutItem {
  CheckoutItem {
    product_id: None,
    quantity,
    name: Some(name.to_string()),
    sku: None,
    unit_price: Some(unit_price),
    variation: None,
  }
}

pub fn checkout_request(customer_id: Uuid, items: Vec<CheckoutItem>) -> CheckoutRequest {
  CheckoutRequest {
    customer_id,
    items,
    coupon_code: None,
    allow_without_coupon: false,
    shipping_method: "standard".to_string(),
  }
}

pub fn with_coupon(mut request: CheckoutRequest, code: &str) -> CheckoutRequest {
  request.coupon_code = Some(code.to_string());
  request
}

/// Places an order as the requesting customer, panicking on failure.
pub async fn place_order(app: &TestApp, request: CheckoutRequest) -> CheckoutOutcome {
  try_place_order(app, request).await.expect("checkout")
}

/// Like [`place_order`] but surfaces the error.
pub async fn try_place_order(
  app: &TestApp,
  request: CheckoutRequest,
) -> crossdock::CoreResult<CheckoutOutcome> {
  submit(&app.assembler, request).await
}

pub async fn submit(
  assembler: &OrderAssembler,
  request: CheckoutRequest,
) -> crossdock::CoreResult<CheckoutOutcome> {
  let actor = Actor::Customer(request.customer_id);
  assembler.create(request, actor).await
}

/// Admin-moves an order to `to`, panicking on failure.
pub fn advance(app: &TestApp, order_id: Uuid, to: OrderStatus) -> Order {
  app
    .machine
    .transition(order_id, to, admin(), None)
    .expect("advance order")
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
