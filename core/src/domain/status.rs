// core/src/domain/status.rs

//! The closed order-status vocabulary.
//!
//! Two chains coexist: the full cross-border fulfillment pipeline
//! (supplier → China warehouse → air freight → BD warehouse → delivery) and a
//! short legacy set retained for orders created before the pipeline rollout.
//! The strings produced by `as_str`/serde are persisted; do not rename them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
  // Cross-border fulfillment chain, in pipeline order.
  PendingPayment,
  PendingPaymentVerification,
  PartiallyPaid,
  Purchasing,
  PurchaseCompleted,
  ShippedFromSupplier,
  ReceivedInChinaWarehouse,
  OnTheWayToChinaAirport,
  ReceivedInChinaAirport,
  OnTheWayToBdAirport,
  ReceivedInBdAirport,
  OnTheWayToBdWarehouse,
  ReceivedInBdWarehouse,
  ProcessingForDelivery,
  OnTheWayToDelivery,
  Completed,
  // Side branches.
  Cancelled,
  ProcessingForRefund,
  Refunded,
  // Legacy chain kept for older orders.
  Pending,
  Processing,
  Shipped,
  Delivered,
}

/// The fulfillment chain as a strict order. Index = pipeline position.
pub const FULFILLMENT_CHAIN: [OrderStatus; 16] = [
  OrderStatus::PendingPayment,
  OrderStatus::PendingPaymentVerification,
  OrderStatus::PartiallyPaid,
  OrderStatus::Purchasing,
  OrderStatus::PurchaseCompleted,
  OrderStatus::ShippedFromSupplier,
  OrderStatus::ReceivedInChinaWarehouse,
  OrderStatus::OnTheWayToChinaAirport,
  OrderStatus::ReceivedInChinaAirport,
  OrderStatus::OnTheWayToBdAirport,
  OrderStatus::ReceivedInBdAirport,
  OrderStatus::OnTheWayToBdWarehouse,
  OrderStatus::ReceivedInBdWarehouse,
  OrderStatus::ProcessingForDelivery,
  OrderStatus::OnTheWayToDelivery,
  OrderStatus::Completed,
];

/// The legacy chain as a strict order.
pub const LEGACY_CHAIN: [OrderStatus; 4] = [
  OrderStatus::Pending,
  OrderStatus::Processing,
  OrderStatus::Shipped,
  OrderStatus::Delivered,
];

/// Every status, for iteration in audits and tests.
pub const ALL_STATUSES: [OrderStatus; 23] = [
  OrderStatus::PendingPayment,
  OrderStatus::PendingPaymentVerification,
  OrderStatus::PartiallyPaid,
  OrderStatus::Purchasing,
  OrderStatus::PurchaseCompleted,
  OrderStatus::ShippedFromSupplier,
  OrderStatus::ReceivedInChinaWarehouse,
  OrderStatus::OnTheWayToChinaAirport,
  OrderStatus::ReceivedInChinaAirport,
  OrderStatus::OnTheWayToBdAirport,
  OrderStatus::ReceivedInBdAirport,
  OrderStatus::OnTheWayToBdWarehouse,
  OrderStatus::ReceivedInBdWarehouse,
  OrderStatus::ProcessingForDelivery,
  OrderStatus::OnTheWayToDelivery,
  OrderStatus::Completed,
  OrderStatus::Cancelled,
  OrderStatus::ProcessingForRefund,
  OrderStatus::Refunded,
  OrderStatus::Pending,
  OrderStatus::Processing,
  OrderStatus::Shipped,
  OrderStatus::Delivered,
];

impl OrderStatus {
  /// The persisted string form of this status.
  pub fn as_str(self) -> &'static str {
    match self {
      OrderStatus::PendingPayment => "pending_payment",
      OrderStatus::PendingPaymentVerification => "pending_payment_verification",
      OrderStatus::PartiallyPaid => "partially_paid",
      OrderStatus::Purchasing => "purchasing",
      OrderStatus::PurchaseCompleted => "purchase_completed",
      OrderStatus::ShippedFromSupplier => "shipped_from_supplier",
      OrderStatus::ReceivedInChinaWarehouse => "received_in_china_warehouse",
      OrderStatus::OnTheWayToChinaAirport => "on_the_way_to_china_airport",
      OrderStatus::ReceivedInChinaAirport => "received_in_china_airport",
      OrderStatus::OnTheWayToBdAirport => "on_the_way_to_bd_airport",
      OrderStatus::ReceivedInBdAirport => "received_in_bd_airport",
      OrderStatus::OnTheWayToBdWarehouse => "on_the_way_to_bd_warehouse",
      OrderStatus::ReceivedInBdWarehouse => "received_in_bd_warehouse",
      OrderStatus::ProcessingForDelivery => "processing_for_delivery",
      OrderStatus::OnTheWayToDelivery => "on_the_way_to_delivery",
      OrderStatus::Completed => "completed",
      OrderStatus::Cancelled => "cancelled",
      OrderStatus::ProcessingForRefund => "processing_for_refund",
      OrderStatus::Refunded => "refunded",
      OrderStatus::Pending => "pending",
      OrderStatus::Processing => "processing",
      OrderStatus::Shipped => "shipped",
      OrderStatus::Delivered => "delivered",
    }
  }

  /// Terminal statuses permit no further transition.
  pub fn is_terminal(self) -> bool {
    matches!(
      self,
      OrderStatus::Completed | OrderStatus::Cancelled | OrderStatus::Refunded | OrderStatus::Delivered
    )
  }

  /// The states an order can be created into (one per chain).
  pub fn is_initial(self) -> bool {
    matches!(self, OrderStatus::PendingPayment | OrderStatus::Pending)
  }

  /// Position within the fulfillment chain, if this status belongs to it.
  pub fn fulfillment_index(self) -> Option<usize> {
    FULFILLMENT_CHAIN.iter().position(|s| *s == self)
  }

  /// Position within the legacy chain, if this status belongs to it.
  pub fn legacy_index(self) -> Option<usize> {
    LEGACY_CHAIN.iter().position(|s| *s == self)
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown order status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
  type Err = UnknownStatus;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    ALL_STATUSES
      .iter()
      .copied()
      .find(|status| status.as_str() == s)
      .ok_or_else(|| UnknownStatus(s.to_string()))
  }
}
