// server/src/services/notify.rs

use async_trait::async_trait;
use tracing::info;

use crossdock::{NotificationSink, OrderNotification};

/// Logs notifications instead of delivering them. The production sink is
/// an email/SMS gateway client; either way the engine treats delivery as
/// fire-and-forget after commit.
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
  async fn deliver(&self, notification: OrderNotification) -> anyhow::Result<()> {
    info!(
      kind = notification.kind.as_str(),
      order_number = %notification.order_number,
      customer_id = %notification.customer_id,
      total = %notification.total_amount,
      "order notification"
    );
    Ok(())
  }
}
