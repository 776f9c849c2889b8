use async_trait::async_trait;
use mercato_core::StoreError;
use uuid::Uuid;

use crate::product::Product;
use crate::query::ProductFilter;

/// Read access to the product collection. Checkout-time reads go through
/// the checkout transaction instead so they see a consistent snapshot.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, StoreError>;

    async fn find(
        &self,
        filter: &ProductFilter,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Product>, StoreError>;

    async fn count(&self, filter: &ProductFilter) -> Result<u64, StoreError>;
}
