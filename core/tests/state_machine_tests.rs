// tests/state_machine_tests.rs

mod common;
use common::*;

use rust_decimal_macros::dec;
use serial_test::serial;
use uuid::Uuid;

use crossdock::domain::status::{FULFILLMENT_CHAIN, LEGACY_CHAIN};
use crossdock::{
  transition_allowed, Actor, ActorKind, CoreError, OrderStatus, StockReason,
};

#[test]
fn test_transition_table_shape() {
  use OrderStatus::*;

  // Admin walks forward along a chain, skipping stops freely.
  assert!(transition_allowed(PendingPayment, Purchasing, ActorKind::Admin));
  assert!(transition_allowed(Purchasing, Completed, ActorKind::Admin));
  assert!(transition_allowed(Pending, Shipped, ActorKind::Admin));

  // Never backward, never sideways between chains, never in place.
  assert!(!transition_allowed(Purchasing, PendingPayment, ActorKind::Admin));
  assert!(!transition_allowed(Purchasing, Shipped, ActorKind::Admin));
  assert!(!transition_allowed(Processing, OnTheWayToDelivery, ActorKind::Admin));
  assert!(!transition_allowed(Purchasing, Purchasing, ActorKind::Admin));

  // Terminal states are sealed for everyone.
  for terminal in [Completed, Cancelled, Refunded, Delivered] {
    for target in [PendingPayment, Cancelled, ProcessingForRefund, Refunded] {
      assert!(
        !transition_allowed(terminal, target, ActorKind::Admin),
        "{terminal} -> {target} should be sealed"
      );
    }
  }

  // Admin may cancel from any non-terminal state.
  for from in FULFILLMENT_CHAIN.iter().chain(LEGACY_CHAIN.iter()) {
    if from.is_terminal() {
      continue;
    }
    assert!(
      transition_allowed(*from, Cancelled, ActorKind::Admin),
      "admin should cancel from {from}"
    );
  }

  // Refund processing opens only after money can have moved.
  assert!(!transition_allowed(PendingPayment, ProcessingForRefund, ActorKind::Admin));
  assert!(!transition_allowed(PendingPaymentVerification, ProcessingForRefund, ActorKind::Admin));
  assert!(transition_allowed(PartiallyPaid, ProcessingForRefund, ActorKind::Admin));
  assert!(transition_allowed(OnTheWayToDelivery, ProcessingForRefund, ActorKind::Admin));
  assert!(!transition_allowed(Pending, ProcessingForRefund, ActorKind::Admin));
  assert!(transition_allowed(Processing, ProcessingForRefund, ActorKind::Admin));

  // Refunded is reachable only through processing_for_refund.
  assert!(transition_allowed(ProcessingForRefund, Refunded, ActorKind::Admin));
  assert!(!transition_allowed(PartiallyPaid, Refunded, ActorKind::Admin));

  // Customers get exactly one move: cancel out of an initial state.
  assert!(transition_allowed(PendingPayment, Cancelled, ActorKind::Customer));
  assert!(transition_allowed(Pending, Cancelled, ActorKind::Customer));
  assert!(!transition_allowed(Purchasing, Cancelled, ActorKind::Customer));
  assert!(!transition_allowed(PendingPayment, Purchasing, ActorKind::Customer));
}

#[tokio::test]
#[serial]
async fn test_admin_advances_order_with_audit_trail() {
  setup_tracing();
  let app = test_app();
  let product = seed_product(&app, "Widget", dec!(10.00), 10);
  let outcome = place_order(
    &app,
    checkout_request(Uuid::new_v4(), vec![catalog_item(&product, 1)]),
  )
  .await;
  let order_id = outcome.order.id;

  advance(&app, order_id, OrderStatus::Purchasing);
  advance(&app, order_id, OrderStatus::ReceivedInBdWarehouse);
  let finished = advance(&app, order_id, OrderStatus::Completed);
  assert_eq!(finished.status, OrderStatus::Completed);

  let history = app.queries.history(order_id).unwrap();
  assert_eq!(history.len(), 4);
  assert_eq!(history[0].old_status, None);
  assert_eq!(history[1].old_status, Some(OrderStatus::PendingPayment));
  assert_eq!(history[1].new_status, OrderStatus::Purchasing);
  assert_eq!(history[2].old_status, Some(OrderStatus::Purchasing));
  assert_eq!(history[3].new_status, OrderStatus::Completed);
}

#[tokio::test]
#[serial]
async fn test_rejected_transition_writes_nothing() {
  setup_tracing();
  let app = test_app();
  let product = seed_product(&app, "Widget", dec!(10.00), 10);
  let outcome = place_order(
    &app,
    checkout_request(Uuid::new_v4(), vec![catalog_item(&product, 1)]),
  )
  .await;
  let order_id = outcome.order.id;
  advance(&app, order_id, OrderStatus::Purchasing);

  let err = app
    .machine
    .transition(order_id, OrderStatus::PendingPayment, admin(), None)
    .unwrap_err();
  match err {
    CoreError::InvalidTransition { from, to, role } => {
      assert_eq!(from, OrderStatus::Purchasing);
      assert_eq!(to, OrderStatus::PendingPayment);
      assert_eq!(role, ActorKind::Admin);
    }
    other => panic!("expected InvalidTransition, got {other:?}"),
  }

  // Status and audit trail are exactly as before the attempt.
  let summary = app.queries.summary(order_id).unwrap();
  assert_eq!(summary.status, OrderStatus::Purchasing);
  assert_eq!(app.queries.history(order_id).unwrap().len(), 2);
}

#[tokio::test]
#[serial]
async fn test_terminal_order_is_sealed() {
  setup_tracing();
  let app = test_app();
  let product = seed_product(&app, "Widget", dec!(10.00), 10);
  let outcome = place_order(
    &app,
    checkout_request(Uuid::new_v4(), vec![catalog_item(&product, 1)]),
  )
  .await;
  let order_id = outcome.order.id;
  advance(&app, order_id, OrderStatus::Completed);

  for target in [
    OrderStatus::Cancelled,
    OrderStatus::ProcessingForRefund,
    OrderStatus::OnTheWayToDelivery,
  ] {
    let err = app
      .machine
      .transition(order_id, target, admin(), None)
      .unwrap_err();
    assert!(matches!(err, CoreError::InvalidTransition { .. }));
  }
}

#[tokio::test]
#[serial]
async fn test_legacy_chain_orders_move_on_their_own_track() {
  setup_tracing();
  let app = test_app();
  let product = seed_product(&app, "Widget", dec!(10.00), 10);
  let outcome = place_order(
    &app,
    checkout_request(Uuid::new_v4(), vec![catalog_item(&product, 1)]),
  )
  .await;
  let order_id = outcome.order.id;

  // Imported legacy order: rewrite the status under the hood.
  app
    .store
    .transaction(|txn| {
      let mut order = txn.require_order(order_id)?;
      order.status = OrderStatus::Pending;
      txn.put_order(order);
      Ok(())
    })
    .unwrap();

  advance(&app, order_id, OrderStatus::Processing);
  advance(&app, order_id, OrderStatus::Delivered);

  // Never across to the fulfillment chain.
  let fresh = place_order(
    &app,
    checkout_request(Uuid::new_v4(), vec![catalog_item(&product, 1)]),
  )
  .await;
  let err = app
    .machine
    .transition(fresh.order.id, OrderStatus::Shipped, admin(), None)
    .unwrap_err();
  assert!(matches!(err, CoreError::InvalidTransition { .. }));
}

#[tokio::test]
#[serial]
async fn test_refund_path_runs_through_processing_for_refund() {
  setup_tracing();
  let app = test_app();
  let product = seed_product(&app, "Widget", dec!(10.00), 10);
  let outcome = place_order(
    &app,
    checkout_request(Uuid::new_v4(), vec![catalog_item(&product, 1)]),
  )
  .await;
  let order_id = outcome.order.id;

  // Too early: no payment can have been taken yet.
  let err = app
    .machine
    .transition(order_id, OrderStatus::ProcessingForRefund, admin(), None)
    .unwrap_err();
  assert!(matches!(err, CoreError::InvalidTransition { .. }));

  advance(&app, order_id, OrderStatus::PartiallyPaid);

  // Refunded is never a direct hop.
  let err = app
    .machine
    .transition(order_id, OrderStatus::Refunded, admin(), None)
    .unwrap_err();
  assert!(matches!(err, CoreError::InvalidTransition { .. }));

  advance(&app, order_id, OrderStatus::ProcessingForRefund);
  let refunded = advance(&app, order_id, OrderStatus::Refunded);
  assert_eq!(refunded.status, OrderStatus::Refunded);
  assert!(refunded.status.is_terminal());
}

#[tokio::test]
#[serial]
async fn test_customer_cannot_drive_fulfillment() {
  setup_tracing();
  let app = test_app();
  let product = seed_product(&app, "Widget", dec!(10.00), 10);
  let customer_id = Uuid::new_v4();
  let outcome = place_order(
    &app,
    checkout_request(customer_id, vec![catalog_item(&product, 1)]),
  )
  .await;
  let order_id = outcome.order.id;

  let err = app
    .machine
    .transition(
      order_id,
      OrderStatus::Purchasing,
      Actor::Customer(customer_id),
      None,
    )
    .unwrap_err();
  assert!(matches!(
    err,
    CoreError::InvalidTransition {
      role: ActorKind::Customer,
      ..
    }
  ));
}

#[tokio::test]
#[serial]
async fn test_transition_unknown_order_not_found() {
  setup_tracing();
  let app = test_app();
  let err = app
    .machine
    .transition(Uuid::new_v4(), OrderStatus::Purchasing, admin(), None)
    .unwrap_err();
  assert!(matches!(err, CoreError::NotFound { entity: "order", .. }));
}

#[tokio::test]
#[serial]
async fn test_delete_pending_order_returns_stock() {
  setup_tracing();
  let app = test_app();
  let product = seed_product(&app, "Widget", dec!(10.00), 5);
  let outcome = place_order(
    &app,
    checkout_request(Uuid::new_v4(), vec![catalog_item(&product, 2)]),
  )
  .await;
  let order_id = outcome.order.id;
  assert_eq!(app.catalog.product(product.id).unwrap().stock_quantity, 3);

  app.machine.delete(order_id, admin()).unwrap();

  assert_eq!(app.catalog.product(product.id).unwrap().stock_quantity, 5);
  assert!(matches!(
    app.queries.summary(order_id),
    Err(CoreError::NotFound { .. })
  ));
  // The ledger keeps the full story even after the order is gone.
  let movements = app.ledger.history(product.id);
  assert_eq!(movements.len(), 3);
  assert_eq!(movements[2].reason, StockReason::OrderDeleted);
  assert_eq!(movements[2].adjustment, 2);
}

#[tokio::test]
#[serial]
async fn test_delete_cancelled_order_does_not_restore_twice() {
  setup_tracing();
  let app = test_app();
  let product = seed_product(&app, "Widget", dec!(10.00), 5);
  let outcome = place_order(
    &app,
    checkout_request(Uuid::new_v4(), vec![catalog_item(&product, 2)]),
  )
  .await;
  let order_id = outcome.order.id;

  // Admin cancels outright; the workflow restores the stock.
  app
    .cancellation
    .cancel(order_id, admin(), Some("ops".into()))
    .await
    .unwrap();
  assert_eq!(app.catalog.product(product.id).unwrap().stock_quantity, 5);

  app.machine.delete(order_id, admin()).unwrap();

  // Still 5: the delete must not add the quantity back again.
  assert_eq!(app.catalog.product(product.id).unwrap().stock_quantity, 5);
  let reasons: Vec<StockReason> = app
    .ledger
    .history(product.id)
    .iter()
    .map(|row| row.reason)
    .collect();
  assert_eq!(
    reasons,
    vec![
      StockReason::Restock,
      StockReason::OrderCreated,
      StockReason::OrderCancelled
    ]
  );
}

#[tokio::test]
#[serial]
async fn test_delete_completed_order_conflicts() {
  setup_tracing();
  let app = test_app();
  let product = seed_product(&app, "Widget", dec!(10.00), 5);
  let outcome = place_order(
    &app,
    checkout_request(Uuid::new_v4(), vec![catalog_item(&product, 1)]),
  )
  .await;
  let order_id = outcome.order.id;
  advance(&app, order_id, OrderStatus::Completed);

  let err = app.machine.delete(order_id, admin()).unwrap_err();
  assert!(matches!(err, CoreError::Conflict(_)));

  // Nothing mutated.
  assert!(app.queries.summary(order_id).is_ok());
  assert_eq!(app.catalog.product(product.id).unwrap().stock_quantity, 4);
}

#[tokio::test]
#[serial]
async fn test_mid_pipeline_delete_conflicts() {
  setup_tracing();
  let app = test_app();
  let product = seed_product(&app, "Widget", dec!(10.00), 5);
  let outcome = place_order(
    &app,
    checkout_request(Uuid::new_v4(), vec![catalog_item(&product, 1)]),
  )
  .await;
  let order_id = outcome.order.id;
  advance(&app, order_id, OrderStatus::Purchasing);

  let err = app.machine.delete(order_id, admin()).unwrap_err();
  assert!(matches!(err, CoreError::Conflict(_)));
}

#[tokio::test]
#[serial]
async fn test_sourcing_metadata_patch() {
  setup_tracing();
  let app = test_app();
  let product = seed_product(&app, "Widget", dec!(10.00), 5);
  let outcome = place_order(
    &app,
    checkout_request(Uuid::new_v4(), vec![catalog_item(&product, 1)]),
  )
  .await;
  let order_id = outcome.order.id;
  let item_id = outcome.items[0].id;

  let patched = app
    .machine
    .update_item_sourcing(order_id, item_id, Some("1688-55231".into()), None)
    .unwrap();
  assert_eq!(patched.sourcing_ref.as_deref(), Some("1688-55231"));
  assert_eq!(patched.sourcing_note, None);

  // A second patch fills the note and keeps the reference.
  let patched = app
    .machine
    .update_item_sourcing(order_id, item_id, None, Some("restocked weekly".into()))
    .unwrap();
  assert_eq!(patched.sourcing_ref.as_deref(), Some("1688-55231"));
  assert_eq!(patched.sourcing_note.as_deref(), Some("restocked weekly"));
  // Pricing is untouched.
  assert_eq!(patched.unit_price, dec!(10.00));

  // The item must belong to the order in the path.
  let other = place_order(
    &app,
    checkout_request(Uuid::new_v4(), vec![catalog_item(&product, 1)]),
  )
  .await;
  let err = app
    .machine
    .update_item_sourcing(other.order.id, item_id, Some("x".into()), None)
    .unwrap_err();
  assert!(matches!(err, CoreError::NotFound { entity: "order item", .. }));
}
