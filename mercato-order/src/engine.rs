use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use mercato_core::{PaymentGateway, StoreError};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{
    Customer, Order, OrderLine, OrderLineRequest, OrderStatus, FALLBACK_IMAGE_URL,
    MAX_ORDER_LINES,
};
use crate::notify::NotificationSink;
use crate::number::OrderNumberGenerator;
use crate::repository::{CheckoutStore, OrderRepository};

const ORDER_NUMBER_ATTEMPTS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("{0}")]
    Validation(String),

    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Invalid variant: {color}, {size}")]
    InvalidVariant { color: String, size: String },

    #[error("Insufficient inventory for {name}")]
    InsufficientInventory { name: String },

    #[error("Failed to generate unique order number after multiple attempts")]
    OrderNumberExhausted,

    #[error("Order number already exists")]
    DuplicateOrderNumber,

    #[error("Order not found")]
    NotFound,

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for OrderError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateOrderNumber => OrderError::DuplicateOrderNumber,
            other => OrderError::Store(other),
        }
    }
}

/// What the caller gets back from a successful checkout.
#[derive(Debug, Clone, Serialize)]
pub struct OrderReceipt {
    #[serde(rename = "orderNumber")]
    pub order_number: String,
    pub status: OrderStatus,
}

/// Inventory debit accumulated during validation, applied only when the
/// payment outcome is Approved.
struct InventoryDebit {
    product_id: Uuid,
    variant_index: usize,
    quantity: u32,
}

/// Coordinates validation, simulated payment, persistence, inventory
/// deduction and notification for order creation. All dependencies are
/// injected once at startup.
pub struct OrderWorkflow {
    store: Arc<dyn CheckoutStore>,
    orders: Arc<dyn OrderRepository>,
    gateway: Arc<dyn PaymentGateway>,
    sink: Arc<dyn NotificationSink>,
    numbers: Arc<dyn OrderNumberGenerator>,
}

impl OrderWorkflow {
    pub fn new(
        store: Arc<dyn CheckoutStore>,
        orders: Arc<dyn OrderRepository>,
        gateway: Arc<dyn PaymentGateway>,
        sink: Arc<dyn NotificationSink>,
        numbers: Arc<dyn OrderNumberGenerator>,
    ) -> Self {
        Self {
            store,
            orders,
            gateway,
            sink,
            numbers,
        }
    }

    /// Places an order. Runs steps 1-6 inside one checkout transaction:
    /// any failure drops the transaction, leaving no order and no
    /// inventory change. The post-commit notification is fire-and-forget.
    pub async fn create_order(
        &self,
        customer: Customer,
        lines: Vec<OrderLineRequest>,
    ) -> Result<OrderReceipt, OrderError> {
        if lines.is_empty() {
            return Err(OrderError::Validation(
                "Order items or product details are required".to_string(),
            ));
        }
        if lines.len() > MAX_ORDER_LINES {
            return Err(OrderError::Validation(
                "Too many items in the order (maximum 50)".to_string(),
            ));
        }
        if lines.iter().any(|line| line.quantity == 0) {
            return Err(OrderError::Validation(
                "Quantity must be a positive integer".to_string(),
            ));
        }
        customer
            .validate()
            .map_err(|e| OrderError::Validation(e.to_string()))?;

        let mut tx = self.store.begin().await?;

        // One snapshot per product id for the whole request: later lines
        // referencing the same product validate against the copy already
        // read, never a re-read.
        let mut snapshots = HashMap::new();
        let mut items: Vec<OrderLine> = Vec::with_capacity(lines.len());
        let mut debits: Vec<InventoryDebit> = Vec::new();

        for line in &lines {
            let product = match snapshots.entry(line.product_id) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    let product = tx
                        .product_by_id(line.product_id)
                        .await?
                        .ok_or(OrderError::ProductNotFound(line.product_id))?;
                    entry.insert(product)
                }
            };

            let variant_index = product
                .variant_index(&line.variant.color, &line.variant.size)
                .ok_or_else(|| OrderError::InvalidVariant {
                    color: line.variant.color.clone(),
                    size: line.variant.size.clone(),
                })?;

            // Inventory must cover this line plus what earlier lines of
            // the same variant already claimed.
            let claimed: u64 = debits
                .iter()
                .filter(|d| d.product_id == line.product_id && d.variant_index == variant_index)
                .map(|d| u64::from(d.quantity))
                .sum();
            let available = u64::from(product.variants[variant_index].inventory);
            if available < claimed + u64::from(line.quantity) {
                return Err(OrderError::InsufficientInventory {
                    name: product.name.clone(),
                });
            }

            items.push(OrderLine {
                product_id: product.id,
                name: product.name.clone(),
                variant: line.variant.clone(),
                quantity: line.quantity,
                price: product.price,
                image: product
                    .primary_image()
                    .unwrap_or(FALLBACK_IMAGE_URL)
                    .to_string(),
            });

            match debits
                .iter_mut()
                .find(|d| d.product_id == line.product_id && d.variant_index == variant_index)
            {
                Some(debit) => debit.quantity += line.quantity,
                None => debits.push(InventoryDebit {
                    product_id: line.product_id,
                    variant_index,
                    quantity: line.quantity,
                }),
            }
        }

        let total: Decimal = items
            .iter()
            .map(|line| line.price * Decimal::from(line.quantity))
            .sum();
        let status = OrderStatus::from(self.gateway.authorize(total).await);

        let mut order_number = None;
        for _ in 0..ORDER_NUMBER_ATTEMPTS {
            let candidate = self.numbers.generate();
            if !tx.order_number_taken(&candidate).await? {
                order_number = Some(candidate);
                break;
            }
        }
        let order_number = order_number.ok_or(OrderError::OrderNumberExhausted)?;

        let order = Order::new(order_number, customer, items, status);
        tx.insert_order(&order).await?;

        // Debits go after the order write so a failure here still aborts
        // the whole transaction.
        if status == OrderStatus::Approved {
            for debit in &debits {
                tx.deduct_inventory(debit.product_id, debit.variant_index, debit.quantity)
                    .await?;
            }
        }

        tx.commit().await?;

        if let Err(err) = self
            .sink
            .send_order_status(&order.customer.email, &order, status)
            .await
        {
            tracing::error!(
                order_number = %order.order_number,
                error = %err,
                "order notification failed"
            );
        }

        Ok(OrderReceipt {
            order_number: order.order_number,
            status,
        })
    }

    pub async fn get_order_by_number(&self, order_number: &str) -> Result<Order, OrderError> {
        self.orders
            .find_by_order_number(order_number)
            .await?
            .ok_or(OrderError::NotFound)
    }
}
