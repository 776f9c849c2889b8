use async_trait::async_trait;

use crate::models::{Order, OrderStatus};

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("No email provided for customer")]
    MissingAddress,

    #[error("Failed to send email: {0}")]
    Delivery(String),
}

/// Outbound order-status email boundary. Fire-and-forget relative to the
/// order transaction: the workflow logs failures and never propagates them.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send_order_status(
        &self,
        email: &str,
        order: &Order,
        status: OrderStatus,
    ) -> Result<(), NotificationError>;
}
