// tests/checkout_tests.rs

mod common;
use common::*;

use std::sync::Arc;

use rust_decimal_macros::dec;
use serial_test::serial;
use uuid::Uuid;

use crossdock::{
  CheckoutItem, CoreError, DiscountError, NotificationKind, OrderStatus, StockReason, StockRef,
  StoreSettings,
};

#[tokio::test]
#[serial]
async fn test_checkout_creates_order_with_line_snapshots() {
  setup_tracing();
  let app = test_app();
  let product = seed_product(&app, "Walnut Desk", dec!(25.50), 10);
  let customer_id = Uuid::new_v4();

  let outcome = place_order(
    &app,
    checkout_request(customer_id, vec![catalog_item(&product, 2)]),
  )
  .await;

  let order = &outcome.order;
  assert_eq!(order.status, OrderStatus::PendingPayment);
  assert_eq!(order.customer_id, customer_id);
  assert_eq!(order.subtotal, dec!(51.00));
  assert_eq!(order.discount_amount, dec!(0));
  assert_eq!(order.total_amount, dec!(51.00));
  assert!(order.coupon_id.is_none());

  assert_eq!(outcome.items.len(), 1);
  let line = &outcome.items[0];
  assert_eq!(line.product_id, Some(product.id));
  assert_eq!(line.product_name, "Walnut Desk");
  assert_eq!(line.product_sku.as_deref(), Some("SKU-WALNUT-DESK"));
  assert_eq!(line.quantity, 2);
  assert_eq!(line.unit_price, dec!(25.50));
  assert_eq!(line.line_total, dec!(51.00));

  // Stock went through the ledger: seed row plus the reservation.
  let restocked = app.catalog.product(product.id).unwrap();
  assert_eq!(restocked.stock_quantity, 8);
  let movements = app.ledger.history(product.id);
  assert_eq!(movements.len(), 2);
  assert_eq!(movements[0].reason, StockReason::Restock);
  assert_eq!(movements[1].reason, StockReason::OrderCreated);
  assert_eq!(movements[1].adjustment, -2);
  assert_eq!(movements[1].old_quantity, 10);
  assert_eq!(movements[1].new_quantity, 8);
  assert_eq!(movements[1].reference, Some(StockRef::Order(order.id)));

  // Creation history row has no predecessor status.
  let history = app.queries.history(order.id).unwrap();
  assert_eq!(history.len(), 1);
  assert_eq!(history[0].old_status, None);
  assert_eq!(history[0].new_status, OrderStatus::PendingPayment);

  assert_eq!(app.sink.kinds(), vec![NotificationKind::OrderCreated]);
  let delivered = app.sink.take();
  assert_eq!(delivered[0].order_number, order.order_number);
  assert!(delivered[0].customer_name.is_some());
}

#[tokio::test]
#[serial]
async fn test_checkout_totals_with_exclusive_tax_and_shipping() {
  setup_tracing();
  let app = app_with(
    StoreSettings {
      tax_rate: dec!(10),
      tax_inclusive: false,
    },
    dec!(60),
  );
  let product = seed_product(&app, "Monitor", dec!(100.00), 5);

  let outcome = place_order(
    &app,
    checkout_request(Uuid::new_v4(), vec![catalog_item(&product, 3)]),
  )
  .await;

  let order = &outcome.order;
  assert_eq!(order.subtotal, dec!(300.00));
  assert_eq!(order.shipping_cost, dec!(60));
  assert_eq!(order.tax_rate, dec!(10));
  assert!(!order.tax_inclusive);
  assert_eq!(order.tax_amount, dec!(30.00));
  assert_eq!(order.total_amount, dec!(390.00));
  assert_eq!(
    order.total_amount,
    order.subtotal - order.discount_amount + order.shipping_cost + order.tax_amount
  );
}

#[tokio::test]
#[serial]
async fn test_checkout_totals_with_inclusive_tax() {
  setup_tracing();
  let app = app_with(
    StoreSettings {
      tax_rate: dec!(10),
      tax_inclusive: true,
    },
    dec!(60),
  );
  let product = seed_product(&app, "Lamp", dec!(110.00), 5);

  let outcome = place_order(
    &app,
    checkout_request(Uuid::new_v4(), vec![catalog_item(&product, 1)]),
  )
  .await;

  let order = &outcome.order;
  // Tax is backed out of the price, never added on top.
  assert_eq!(order.tax_amount, dec!(10.00));
  assert_eq!(order.total_amount, dec!(170.00));
}

#[tokio::test]
#[serial]
async fn test_order_numbers_are_unique_and_dated() {
  setup_tracing();
  let app = test_app();
  let product = seed_product(&app, "Widget", dec!(5.00), 100);

  let mut numbers = std::collections::HashSet::new();
  for _ in 0..20 {
    let outcome = place_order(
      &app,
      checkout_request(Uuid::new_v4(), vec![catalog_item(&product, 1)]),
    )
    .await;
    let number = outcome.order.order_number.clone();
    let parts: Vec<&str> = number.split('-').collect();
    assert_eq!(parts.len(), 3, "unexpected shape: {number}");
    assert_eq!(parts[0], "ORD");
    assert_eq!(parts[1].len(), 8);
    assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
    assert_eq!(parts[2].len(), 6);
    assert!(numbers.insert(number), "order number repeated");
  }
}

#[tokio::test]
#[serial]
async fn test_checkout_rejects_empty_cart() {
  setup_tracing();
  let app = test_app();

  let err = try_place_order(&app, checkout_request(Uuid::new_v4(), vec![]))
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::Validation(_)));
}

#[tokio::test]
#[serial]
async fn test_checkout_rejects_zero_quantity() {
  setup_tracing();
  let app = test_app();
  let product = seed_product(&app, "Widget", dec!(5.00), 10);

  let request = checkout_request(Uuid::new_v4(), vec![catalog_item(&product, 0)]);
  let err = try_place_order(&app, request).await.unwrap_err();
  assert!(matches!(err, CoreError::Validation(_)));
}

#[tokio::test]
#[serial]
async fn test_checkout_rejects_external_line_without_price() {
  setup_tracing();
  let app = test_app();
  let mut item = external_item("Imported Vase", dec!(30.00), 1);
  item.unit_price = None;

  let err = try_place_order(&app, checkout_request(Uuid::new_v4(), vec![item]))
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::Validation(_)));
}

#[tokio::test]
#[serial]
async fn test_checkout_rejects_inactive_product() {
  setup_tracing();
  let app = test_app();
  let product = seed_product(&app, "Retired Chair", dec!(40.00), 10);
  app
    .store
    .transaction(|txn| {
      let mut row = txn.require_product(product.id)?;
      row.active = false;
      txn.put_product(row);
      Ok(())
    })
    .unwrap();

  let request = checkout_request(Uuid::new_v4(), vec![catalog_item(&product, 1)]);
  let err = try_place_order(&app, request).await.unwrap_err();
  assert!(matches!(err, CoreError::Validation(_)));
}

#[tokio::test]
#[serial]
async fn test_checkout_unknown_product_not_found() {
  setup_tracing();
  let app = test_app();
  let ghost = CheckoutItem {
    product_id: Some(Uuid::new_v4()),
    quantity: 1,
    name: None,
    sku: None,
    unit_price: None,
    variation: None,
  };

  let err = try_place_order(&app, checkout_request(Uuid::new_v4(), vec![ghost]))
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::NotFound { entity: "product", .. }));
}

#[tokio::test]
#[serial]
async fn test_checkout_unknown_customer_not_found() {
  setup_tracing();
  let app = test_app();
  let product = seed_product(&app, "Widget", dec!(5.00), 10);
  let assembler = assembler_for(&app, Arc::new(EmptyDirectory), app.sink.clone());

  let request = checkout_request(Uuid::new_v4(), vec![catalog_item(&product, 1)]);
  let err = submit(&assembler, request).await.unwrap_err();
  assert!(matches!(err, CoreError::NotFound { entity: "customer", .. }));
  assert_eq!(app.sink.count(), 0);
}

#[tokio::test]
#[serial]
async fn test_checkout_directory_outage_maps_to_collaborator_error() {
  setup_tracing();
  let app = test_app();
  let product = seed_product(&app, "Widget", dec!(5.00), 10);
  let assembler = assembler_for(&app, Arc::new(FailingDirectory), app.sink.clone());

  let request = checkout_request(Uuid::new_v4(), vec![catalog_item(&product, 1)]);
  let err = submit(&assembler, request).await.unwrap_err();
  assert!(matches!(
    err,
    CoreError::Collaborator {
      name: "customer_directory",
      ..
    }
  ));
  assert_eq!(app.queries.list(None, None).len(), 0);
}

#[tokio::test]
#[serial]
async fn test_checkout_insufficient_stock_leaves_no_trace() {
  setup_tracing();
  let app = test_app();
  let product = seed_product(&app, "Last Unit", dec!(20.00), 1);

  let request = checkout_request(Uuid::new_v4(), vec![catalog_item(&product, 2)]);
  let err = try_place_order(&app, request).await.unwrap_err();
  assert!(matches!(
    err,
    CoreError::InsufficientStock {
      requested: 2,
      available: 1,
      ..
    }
  ));

  // The failed transaction staged nothing.
  assert_eq!(app.queries.list(None, None).len(), 0);
  assert_eq!(app.catalog.product(product.id).unwrap().stock_quantity, 1);
  assert_eq!(app.ledger.history(product.id).len(), 1);
  assert_eq!(app.sink.count(), 0);
}

#[tokio::test]
#[serial]
async fn test_checkout_duplicate_lines_share_one_stock_pool() {
  setup_tracing();
  let app = test_app();
  let product = seed_product(&app, "Scarce", dec!(10.00), 3);

  // Two lines of the same product; the second re-reads staged stock.
  let request = checkout_request(
    Uuid::new_v4(),
    vec![catalog_item(&product, 2), catalog_item(&product, 2)],
  );
  let err = try_place_order(&app, request).await.unwrap_err();
  assert!(matches!(
    err,
    CoreError::InsufficientStock {
      requested: 2,
      available: 1,
      ..
    }
  ));
  assert_eq!(app.catalog.product(product.id).unwrap().stock_quantity, 3);

  // Within the pool it still fits.
  let ok = place_order(
    &app,
    checkout_request(
      Uuid::new_v4(),
      vec![catalog_item(&product, 2), catalog_item(&product, 1)],
    ),
  )
  .await;
  assert_eq!(ok.items.len(), 2);
  assert_eq!(app.catalog.product(product.id).unwrap().stock_quantity, 0);
}

#[tokio::test]
#[serial]
async fn test_checkout_external_lines_bypass_stock() {
  setup_tracing();
  let app = test_app();
  let product = seed_product(&app, "Local Mug", dec!(8.00), 2);

  let outcome = place_order(
    &app,
    checkout_request(
      Uuid::new_v4(),
      vec![
        catalog_item(&product, 1),
        external_item("Dropship Teapot", dec!(42.00), 3),
      ],
    ),
  )
  .await;

  assert_eq!(outcome.order.subtotal, dec!(134.00));
  let external = &outcome.items[1];
  assert_eq!(external.product_id, None);
  assert_eq!(external.product_name, "Dropship Teapot");
  assert_eq!(external.line_total, dec!(126.00));
  // Only the catalog line moved stock.
  assert_eq!(app.catalog.product(product.id).unwrap().stock_quantity, 1);
}

#[tokio::test]
#[serial]
async fn test_checkout_applies_coupon_and_records_usage() {
  setup_tracing();
  let app = test_app();
  let product = seed_product(&app, "Bookshelf", dec!(200.00), 5);
  let coupon = app
    .catalog
    .create_coupon(percent_coupon("SAVE10", dec!(10)))
    .unwrap();
  let customer_id = Uuid::new_v4();

  let request = with_coupon(
    checkout_request(customer_id, vec![catalog_item(&product, 1)]),
    "SAVE10",
  );
  let outcome = place_order(&app, request).await;

  let order = &outcome.order;
  assert_eq!(order.discount_amount, dec!(20.00));
  assert_eq!(order.total_amount, dec!(180.00));
  assert_eq!(order.coupon_id, Some(coupon.id));
  assert_eq!(order.coupon_code.as_deref(), Some("SAVE10"));
  assert!(outcome.coupon_rejection.is_none());

  let usages = app.usage.coupon_usages_for_order(order.id);
  assert_eq!(usages.len(), 1);
  assert_eq!(usages[0].customer_id, customer_id);
  assert_eq!(usages[0].discount_amount, dec!(20.00));
  assert_eq!(usages[0].order_total_before, dec!(200.00));
  assert_eq!(usages[0].order_total_after, dec!(180.00));
  assert_eq!(app.catalog.coupon(coupon.id).unwrap().usage_count, 1);
}

#[tokio::test]
#[serial]
async fn test_checkout_unknown_coupon_fails_closed() {
  setup_tracing();
  let app = test_app();
  let product = seed_product(&app, "Widget", dec!(50.00), 5);

  let request = with_coupon(
    checkout_request(Uuid::new_v4(), vec![catalog_item(&product, 1)]),
    "NOPE",
  );
  let err = try_place_order(&app, request).await.unwrap_err();
  assert!(matches!(
    err,
    CoreError::Discount(DiscountError::CouponNotFound { .. })
  ));
  assert_eq!(app.queries.list(None, None).len(), 0);
}

#[tokio::test]
#[serial]
async fn test_checkout_unknown_coupon_proceeds_when_allowed() {
  setup_tracing();
  let app = test_app();
  let product = seed_product(&app, "Widget", dec!(50.00), 5);

  let mut request = with_coupon(
    checkout_request(Uuid::new_v4(), vec![catalog_item(&product, 1)]),
    "NOPE",
  );
  request.allow_without_coupon = true;
  let outcome = place_order(&app, request).await;

  assert_eq!(outcome.order.discount_amount, dec!(0));
  assert_eq!(outcome.order.total_amount, dec!(50.00));
  assert!(outcome.coupon.is_none());
  assert!(outcome.order.coupon_id.is_none());
  assert_eq!(app.usage.coupon_usages_for_order(outcome.order.id).len(), 0);
}

#[tokio::test]
#[serial]
async fn test_coupon_code_normalization_round_trip() {
  setup_tracing();
  let app = test_app();
  let product = seed_product(&app, "Widget", dec!(50.00), 5);
  let coupon = app
    .catalog
    .create_coupon(percent_coupon("Summer20", dec!(20)))
    .unwrap();
  assert_eq!(coupon.code, "SUMMER20");

  let request = with_coupon(
    checkout_request(Uuid::new_v4(), vec![catalog_item(&product, 1)]),
    "  summer20 ",
  );
  let outcome = place_order(&app, request).await;
  assert_eq!(outcome.order.coupon_code.as_deref(), Some("SUMMER20"));
  assert_eq!(outcome.order.discount_amount, dec!(10.00));
}

#[tokio::test]
#[serial]
async fn test_notification_failure_does_not_fail_checkout() {
  setup_tracing();
  let app = test_app();
  let product = seed_product(&app, "Widget", dec!(5.00), 10);
  let assembler = assembler_for(&app, Arc::new(OpenDirectory), Arc::new(FailingSink));

  let request = checkout_request(Uuid::new_v4(), vec![catalog_item(&product, 1)]);
  let outcome = submit(&assembler, request).await.unwrap();
  // The order committed even though delivery failed.
  assert!(app.queries.summary(outcome.order.id).is_ok());
}
