use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use mercato_order::{NotificationError, NotificationSink, Order, OrderStatus};

#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
    pub frontend_url: String,
}

/// Order-status emails over SMTP. The transport is built once at startup;
/// delivery failures surface as `NotificationError::Delivery` and are the
/// workflow's problem to swallow.
pub struct SmtpSink {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    frontend_url: String,
}

impl SmtpSink {
    pub fn new(config: SmtpConfig) -> Self {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                .port(config.port);
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }
        Self {
            transport: builder.build(),
            from: config.from,
            frontend_url: config.frontend_url,
        }
    }
}

#[async_trait]
impl NotificationSink for SmtpSink {
    async fn send_order_status(
        &self,
        email: &str,
        order: &Order,
        status: OrderStatus,
    ) -> Result<(), NotificationError> {
        if email.trim().is_empty() {
            return Err(NotificationError::MissingAddress);
        }

        let subject = if status == OrderStatus::Approved {
            "Order Confirmation - Thank You for Your Purchase!"
        } else {
            "Order Failed - Action Required"
        };
        let html = render_order_email(order, status, &self.frontend_url);

        let message = Message::builder()
            .from(self
                .from
                .parse()
                .map_err(|e| NotificationError::Delivery(format!("invalid from address: {e}")))?)
            .to(email
                .parse()
                .map_err(|e| NotificationError::Delivery(format!("invalid to address: {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)
            .map_err(|e| NotificationError::Delivery(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotificationError::Delivery(e.to_string()))?;

        tracing::info!(to = %email, order_number = %order.order_number, "order status email sent");
        Ok(())
    }
}

/// HTML body for the two outcomes: a per-line confirmation with shipping
/// details, or a short failure notice pointing back at checkout.
pub fn render_order_email(order: &Order, status: OrderStatus, frontend_url: &str) -> String {
    if status == OrderStatus::Approved {
        let items: String = order
            .items
            .iter()
            .map(|line| {
                format!(
                    concat!(
                        r#"<table cellpadding="10" cellspacing="0" border="0" style="width:100%;background-color:#f9fafb;border-radius:8px;margin-bottom:20px;">"#,
                        r#"<tr><td style="text-align:center;"><img src="{image}" alt="{name}" style="max-width:150px;border-radius:8px;"/></td></tr>"#,
                        r#"<tr><td><strong>Product:</strong> {name}</td></tr>"#,
                        r#"<tr><td><strong>Variant:</strong> {color}, {size}</td></tr>"#,
                        r#"<tr><td><strong>Quantity:</strong> {quantity}</td></tr>"#,
                        r#"<tr><td><strong>Total:</strong> ${total}</td></tr>"#,
                        "</table>"
                    ),
                    image = line.image,
                    name = line.name,
                    color = line.variant.color,
                    size = line.variant.size,
                    quantity = line.quantity,
                    total = line.price * rust_decimal::Decimal::from(line.quantity),
                )
            })
            .collect();

        format!(
            concat!(
                r#"<table cellpadding="0" cellspacing="0" border="0" style="width:100%;max-width:600px;margin:0 auto;font-family:Arial,Helvetica,sans-serif;">"#,
                r#"<tr><td style="padding:30px;background-color:#ffffff;">"#,
                r#"<h1 style="font-size:24px;color:#1f2937;text-align:center;">Order Confirmed: {number}</h1>"#,
                r#"<p style="text-align:center;color:#4b5563;">Thank you for your purchase! We're excited to get your order ready.</p>"#,
                "{items}",
                r#"<p style="color:#4b5563;"><strong>Shipping to:</strong><br/>{name}<br/>{address}, {city}, {state} {zip}<br/>Phone: {phone}<br/>Email: {email}</p>"#,
                r#"<p style="text-align:center;margin:30px 0;"><a href="{frontend}/{number}" style="display:inline-block;padding:12px 24px;background-color:#2563eb;color:#ffffff;text-decoration:none;border-radius:5px;">View Your Order</a></p>"#,
                "</td></tr></table>"
            ),
            number = order.order_number,
            items = items,
            name = order.customer.name,
            address = order.customer.address,
            city = order.customer.city,
            state = order.customer.state,
            zip = order.customer.zip,
            phone = order.customer.phone,
            email = order.customer.email,
            frontend = frontend_url,
        )
    } else {
        format!(
            concat!(
                r#"<table cellpadding="0" cellspacing="0" border="0" style="width:100%;max-width:600px;margin:0 auto;font-family:Arial,Helvetica,sans-serif;">"#,
                r#"<tr><td style="padding:30px;background-color:#ffffff;">"#,
                r#"<h1 style="font-size:24px;color:#1f2937;text-align:center;">Order Failed: {number}</h1>"#,
                r#"<p style="text-align:center;color:#4b5563;">We're sorry, but your transaction could not be processed.</p>"#,
                r#"<p style="text-align:center;color:#4b5563;">Please try again or contact our support team for assistance.</p>"#,
                r#"<p style="text-align:center;margin:30px 0;"><a href="{frontend}/checkout" style="display:inline-block;padding:12px 24px;background-color:#ef4444;color:#ffffff;text-decoration:none;border-radius:5px;">Try Again</a></p>"#,
                "</td></tr></table>"
            ),
            number = order.order_number,
            frontend = frontend_url,
        )
    }
}

#[cfg(test)]
mod tests {
    use mercato_order::{Customer, OrderLine, VariantChoice};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::*;

    fn order() -> Order {
        Order::new(
            "ORD-1700000000000-a1b2c3d4e".to_string(),
            Customer {
                name: "Ada Lovelace".into(),
                email: "ada@example.com".into(),
                phone: "+1 5551234567".into(),
                address: "12 Analytical Way".into(),
                city: "London".into(),
                state: "LN".into(),
                zip: "10001".into(),
            },
            vec![OrderLine {
                product_id: Uuid::new_v4(),
                name: "Logo Tee".into(),
                variant: VariantChoice { color: "red".into(), size: "M".into() },
                quantity: 2,
                price: Decimal::new(1999, 2),
                image: "https://cdn.example.com/tee.jpg".into(),
            }],
            OrderStatus::Approved,
        )
    }

    #[test]
    fn approved_email_lists_items_and_shipping() {
        let html = render_order_email(&order(), OrderStatus::Approved, "https://shop.example.com");
        assert!(html.contains("Order Confirmed: ORD-1700000000000-a1b2c3d4e"));
        assert!(html.contains("Logo Tee"));
        assert!(html.contains("red, M"));
        assert!(html.contains("$39.98"));
        assert!(html.contains("12 Analytical Way"));
        assert!(html.contains("https://shop.example.com/ORD-1700000000000-a1b2c3d4e"));
    }

    #[test]
    fn failed_email_points_back_at_checkout() {
        let html = render_order_email(&order(), OrderStatus::Declined, "https://shop.example.com");
        assert!(html.contains("Order Failed: ORD-1700000000000-a1b2c3d4e"));
        assert!(html.contains("could not be processed"));
        assert!(html.contains("https://shop.example.com/checkout"));
    }
}
