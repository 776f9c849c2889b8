use async_trait::async_trait;
use mercato_catalog::Product;
use mercato_core::StoreError;
use uuid::Uuid;

use crate::models::Order;

/// Read access to committed orders.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn find_by_order_number(&self, order_number: &str)
        -> Result<Option<Order>, StoreError>;
}

/// Atomic scope for one checkout. Reads see a consistent snapshot; writes
/// are staged and become visible only at commit. Dropping the transaction
/// without committing discards every staged write.
#[async_trait]
pub trait CheckoutTransaction: Send {
    async fn product_by_id(&mut self, id: Uuid) -> Result<Option<Product>, StoreError>;

    async fn order_number_taken(&mut self, order_number: &str) -> Result<bool, StoreError>;

    /// Stages the order. A uniqueness violation on the order number is the
    /// typed `StoreError::DuplicateOrderNumber`.
    async fn insert_order(&mut self, order: &Order) -> Result<(), StoreError>;

    /// Decrements the named variant's inventory counter. The workflow has
    /// already verified the result stays non-negative; the store refuses
    /// underflow regardless.
    async fn deduct_inventory(
        &mut self,
        product_id: Uuid,
        variant_index: usize,
        quantity: u32,
    ) -> Result<Product, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

/// Source of checkout transactions.
#[async_trait]
pub trait CheckoutStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn CheckoutTransaction>, StoreError>;
}
