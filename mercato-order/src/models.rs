use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use mercato_core::PaymentOutcome;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_ORDER_LINES: usize = 50;

/// Substituted when a product carries no usable image at order time.
pub const FALLBACK_IMAGE_URL: &str =
    "https://samples-files.com/samples/images/jpg/1920-1080-sample.jpg";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.-]+@([\w-]+\.)+[\w-]{2,4}$").expect("email regex"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?\d{1,4}[-.\s]?\d{1,14}$").expect("phone regex"));
static ZIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}(-\d{4})?$").expect("zip regex"));

/// Order lifecycle status. The first four come from the payment outcome;
/// Shipped/Delivered are later fulfillment transitions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Approved,
    Declined,
    Error,
    Shipped,
    Delivered,
}

impl From<PaymentOutcome> for OrderStatus {
    fn from(outcome: PaymentOutcome) -> Self {
        match outcome {
            PaymentOutcome::Approved => OrderStatus::Approved,
            PaymentOutcome::Declined => OrderStatus::Declined,
            PaymentOutcome::Error => OrderStatus::Error,
        }
    }
}

/// The (color, size) pair a customer picked for a line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VariantChoice {
    pub color: String,
    pub size: String,
}

/// Customer snapshot embedded in every order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl Customer {
    pub fn validate(&self) -> Result<(), CustomerInvalid> {
        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("zip", &self.zip),
        ] {
            if value.trim().is_empty() {
                return Err(CustomerInvalid::Missing(field));
            }
        }
        if !EMAIL_RE.is_match(&self.email) {
            return Err(CustomerInvalid::Email);
        }
        if !PHONE_RE.is_match(&self.phone) {
            return Err(CustomerInvalid::Phone);
        }
        if !ZIP_RE.is_match(&self.zip) {
            return Err(CustomerInvalid::Zip);
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CustomerInvalid {
    #[error("Customer {0} is required")]
    Missing(&'static str),

    #[error("Invalid email format")]
    Email,

    #[error("Invalid phone number format")]
    Phone,

    #[error("Invalid zip code format")]
    Zip,
}

/// Denormalized snapshot of one purchased variant. Captured at order time
/// so later catalog changes never alter historical orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(rename = "productId")]
    pub product_id: Uuid,
    pub name: String,
    pub variant: VariantChoice,
    pub quantity: u32,
    pub price: Decimal,
    pub image: String,
}

/// One requested line before validation against the catalog.
#[derive(Debug, Clone)]
pub struct OrderLineRequest {
    pub product_id: Uuid,
    pub variant: VariantChoice,
    pub quantity: u32,
}

/// A committed order. Immutable once created apart from status transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    #[serde(rename = "orderNumber")]
    pub order_number: String,
    pub customer: Customer,
    pub items: Vec<OrderLine>,
    pub status: OrderStatus,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        order_number: String,
        customer: Customer,
        items: Vec<OrderLine>,
        status: OrderStatus,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_number,
            customer,
            items,
            status,
            created_at: Utc::now(),
        }
    }

    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .map(|line| line.price * Decimal::from(line.quantity))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer() -> Customer {
        Customer {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "+1 5551234567".to_string(),
            address: "12 Analytical Way".to_string(),
            city: "London".to_string(),
            state: "LN".to_string(),
            zip: "10001".to_string(),
        }
    }

    #[test]
    fn valid_customer_passes() {
        assert!(customer().validate().is_ok());
    }

    #[test]
    fn missing_field_is_reported_by_name() {
        let mut c = customer();
        c.city = "  ".to_string();
        assert_eq!(
            c.validate().unwrap_err().to_string(),
            "Customer city is required"
        );
    }

    #[test]
    fn malformed_email_phone_zip_rejected() {
        let mut c = customer();
        c.email = "not-an-email".to_string();
        assert!(matches!(c.validate(), Err(CustomerInvalid::Email)));

        let mut c = customer();
        c.phone = "call me".to_string();
        assert!(matches!(c.validate(), Err(CustomerInvalid::Phone)));

        let mut c = customer();
        c.zip = "1234".to_string();
        assert!(matches!(c.validate(), Err(CustomerInvalid::Zip)));
    }

    #[test]
    fn zip_accepts_plus_four() {
        let mut c = customer();
        c.zip = "10001-1234".to_string();
        assert!(c.validate().is_ok());
    }

    #[test]
    fn status_follows_payment_outcome() {
        assert_eq!(
            OrderStatus::from(PaymentOutcome::Approved),
            OrderStatus::Approved
        );
        assert_eq!(
            OrderStatus::from(PaymentOutcome::Declined),
            OrderStatus::Declined
        );
        assert_eq!(OrderStatus::from(PaymentOutcome::Error), OrderStatus::Error);
    }

    #[test]
    fn order_total_sums_quantity_times_price() {
        let order = Order::new(
            "ORD-1-abc".to_string(),
            customer(),
            vec![
                OrderLine {
                    product_id: Uuid::new_v4(),
                    name: "Shirt".to_string(),
                    variant: VariantChoice { color: "red".into(), size: "M".into() },
                    quantity: 2,
                    price: Decimal::new(1050, 2),
                    image: FALLBACK_IMAGE_URL.to_string(),
                },
                OrderLine {
                    product_id: Uuid::new_v4(),
                    name: "Cap".to_string(),
                    variant: VariantChoice { color: "black".into(), size: "OS".into() },
                    quantity: 1,
                    price: Decimal::new(500, 2),
                    image: FALLBACK_IMAGE_URL.to_string(),
                },
            ],
            OrderStatus::Approved,
        );
        assert_eq!(order.total(), Decimal::new(2600, 2));
    }
}
