use async_trait::async_trait;
use mercato_order::{NotificationError, NotificationSink, Order, OrderStatus};
use tokio::sync::Mutex;

/// Captured copy of one dispatched notification.
#[derive(Debug, Clone)]
pub struct SentNotification {
    pub to: String,
    pub order_number: String,
    pub status: OrderStatus,
}

/// Sink that records instead of sending. `failing` builds one that always
/// errors, for exercising the workflow's fire-and-forget path.
#[derive(Default)]
pub struct MockSink {
    sent: Mutex<Vec<SentNotification>>,
    failure: Option<String>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failure: Some(message.into()),
        }
    }

    pub async fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn was_sent_to(&self, email: &str) -> bool {
        self.sent.lock().await.iter().any(|n| n.to == email)
    }
}

#[async_trait]
impl NotificationSink for MockSink {
    async fn send_order_status(
        &self,
        email: &str,
        order: &Order,
        status: OrderStatus,
    ) -> Result<(), NotificationError> {
        if let Some(message) = &self.failure {
            return Err(NotificationError::Delivery(message.clone()));
        }
        if email.trim().is_empty() {
            return Err(NotificationError::MissingAddress);
        }
        self.sent.lock().await.push(SentNotification {
            to: email.to_string(),
            order_number: order.order_number.clone(),
            status,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mercato_order::Customer;

    use super::*;

    fn order() -> Order {
        Order::new(
            "ORD-1-mocktest00".to_string(),
            Customer {
                name: "Test".into(),
                email: "t@example.com".into(),
                phone: "+1 5550000000".into(),
                address: "1 Test St".into(),
                city: "Testville".into(),
                state: "TS".into(),
                zip: "12345".into(),
            },
            vec![],
            OrderStatus::Approved,
        )
    }

    #[tokio::test]
    async fn records_sends() {
        let sink = MockSink::new();
        sink.send_order_status("t@example.com", &order(), OrderStatus::Approved)
            .await
            .unwrap();
        assert_eq!(sink.sent_count().await, 1);
        assert!(sink.was_sent_to("t@example.com").await);
        assert!(!sink.was_sent_to("other@example.com").await);
    }

    #[tokio::test]
    async fn failing_sink_errors_without_recording() {
        let sink = MockSink::failing("transport down");
        let err = sink
            .send_order_status("t@example.com", &order(), OrderStatus::Approved)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("transport down"));
        assert_eq!(sink.sent_count().await, 0);
    }

    #[tokio::test]
    async fn empty_address_is_rejected() {
        let sink = MockSink::new();
        let err = sink
            .send_order_status("", &order(), OrderStatus::Approved)
            .await
            .unwrap_err();
        assert!(matches!(err, NotificationError::MissingAddress));
    }
}
