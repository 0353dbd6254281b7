// core/src/collaborators.rs

//! Seams to the systems this crate deliberately does not own: identity,
//! shipping rates and outbound notifications. Implementations live with the
//! application; the engine only awaits these before opening a transaction,
//! never inside one.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::domain::OrderStatus;

/// What checkout needs to know about a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerProfile {
  pub id: Uuid,
  pub name: String,
  pub email: Option<String>,
}

#[async_trait]
pub trait CustomerDirectory: Send + Sync {
  /// Resolves a customer id; `Ok(None)` means the customer does not exist,
  /// `Err` means the directory itself failed.
  async fn lookup(&self, customer_id: Uuid) -> anyhow::Result<Option<CustomerProfile>>;
}

#[async_trait]
pub trait ShippingRates: Send + Sync {
  async fn quote(&self, method: &str, line_count: u32) -> anyhow::Result<Decimal>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
  OrderCreated,
  CancellationRequested,
  CancellationApproved,
  CancellationRejected,
  OrderCancelled,
}

impl NotificationKind {
  pub fn as_str(self) -> &'static str {
    match self {
      NotificationKind::OrderCreated => "order_created",
      NotificationKind::CancellationRequested => "cancellation_requested",
      NotificationKind::CancellationApproved => "cancellation_approved",
      NotificationKind::CancellationRejected => "cancellation_rejected",
      NotificationKind::OrderCancelled => "order_cancelled",
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderNotification {
  pub kind: NotificationKind,
  pub order_id: Uuid,
  pub order_number: String,
  pub customer_id: Uuid,
  /// Present when the flow had the profile at hand (checkout does).
  pub customer_name: Option<String>,
  pub total_amount: Decimal,
  pub status: OrderStatus,
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
  async fn deliver(&self, notification: OrderNotification) -> anyhow::Result<()>;
}

/// Post-commit dispatch. A failed delivery is logged and swallowed; it
/// never rolls back the work that produced it.
pub async fn notify(sink: &dyn NotificationSink, notification: OrderNotification) {
  let kind = notification.kind;
  let order_id = notification.order_id;
  if let Err(err) = sink.deliver(notification).await {
    warn!(kind = kind.as_str(), %order_id, error = %err, "notification delivery failed");
  }
}
