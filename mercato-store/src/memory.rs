use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use mercato_catalog::product::ProductInvalid;
use mercato_catalog::{Product, ProductFilter, ProductRepository};
use mercato_core::{StoreError, User, UserRepository};
use mercato_order::{CheckoutStore, CheckoutTransaction, Order, OrderRepository};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// In-process transactional document store.
///
/// Checkout transactions take the collections mutex for their whole
/// lifetime, so concurrent checkouts serialize and every read inside a
/// transaction sees a consistent snapshot. Writes are staged on the
/// transaction and published at commit; a dropped transaction leaves the
/// collections untouched.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<Mutex<Collections>>,
}

#[derive(Default)]
struct Collections {
    /// Insertion-ordered so listing pagination is stable.
    products: Vec<Product>,
    /// Keyed by order number, the collection's unique index.
    orders: HashMap<String, Order>,
    users: Vec<User>,
}

impl Collections {
    fn product_by_id(&self, id: Uuid) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    fn product_by_id_mut(&mut self, id: Uuid) -> Option<&mut Product> {
        self.products.iter_mut().find(|p| p.id == id)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a product after checking its document invariants.
    pub async fn insert_product(&self, product: Product) -> Result<(), ProductInvalid> {
        product.validate()?;
        self.collections.lock().await.products.push(product);
        Ok(())
    }

    /// Loads a JSON array of products, e.g. a demo catalog at startup.
    pub async fn load_products(&self, path: &Path) -> Result<usize, SeedError> {
        let raw = std::fs::read_to_string(path)?;
        let products: Vec<Product> = serde_json::from_str(&raw)?;
        let count = products.len();
        for product in products {
            self.insert_product(product).await?;
        }
        tracing::info!(count, path = %path.display(), "seeded product catalog");
        Ok(count)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] ProductInvalid),
}

pub struct MemoryTransaction {
    guard: OwnedMutexGuard<Collections>,
    staged_products: HashMap<Uuid, Product>,
    staged_orders: Vec<Order>,
}

#[async_trait]
impl CheckoutStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn CheckoutTransaction>, StoreError> {
        let guard = self.collections.clone().lock_owned().await;
        Ok(Box::new(MemoryTransaction {
            guard,
            staged_products: HashMap::new(),
            staged_orders: Vec::new(),
        }))
    }
}

#[async_trait]
impl CheckoutTransaction for MemoryTransaction {
    async fn product_by_id(&mut self, id: Uuid) -> Result<Option<Product>, StoreError> {
        if let Some(staged) = self.staged_products.get(&id) {
            return Ok(Some(staged.clone()));
        }
        Ok(self.guard.product_by_id(id).cloned())
    }

    async fn order_number_taken(&mut self, order_number: &str) -> Result<bool, StoreError> {
        Ok(self
            .staged_orders
            .iter()
            .any(|o| o.order_number == order_number)
            || self.guard.orders.contains_key(order_number))
    }

    async fn insert_order(&mut self, order: &Order) -> Result<(), StoreError> {
        if self.order_number_taken(&order.order_number).await? {
            return Err(StoreError::DuplicateOrderNumber);
        }
        self.staged_orders.push(order.clone());
        Ok(())
    }

    async fn deduct_inventory(
        &mut self,
        product_id: Uuid,
        variant_index: usize,
        quantity: u32,
    ) -> Result<Product, StoreError> {
        let mut product = match self.staged_products.get(&product_id) {
            Some(staged) => staged.clone(),
            None => self
                .guard
                .product_by_id(product_id)
                .cloned()
                .ok_or_else(|| StoreError::Backend(format!("no such product: {product_id}")))?,
        };
        let variant = product.variants.get_mut(variant_index).ok_or_else(|| {
            StoreError::Backend(format!("variant index {variant_index} out of range"))
        })?;
        variant.inventory = variant
            .inventory
            .checked_sub(quantity)
            .ok_or_else(|| StoreError::Backend("inventory underflow".to_string()))?;
        self.staged_products.insert(product_id, product.clone());
        Ok(product)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let this = *self;
        let mut guard = this.guard;
        for (id, staged) in this.staged_products {
            match guard.product_by_id_mut(id) {
                Some(product) => *product = staged,
                None => guard.products.push(staged),
            }
        }
        for order in this.staged_orders {
            guard.orders.insert(order.order_number.clone(), order);
        }
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        Ok(self.collections.lock().await.product_by_id(id).cloned())
    }

    async fn find(
        &self,
        filter: &ProductFilter,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Product>, StoreError> {
        Ok(self
            .collections
            .lock()
            .await
            .products
            .iter()
            .filter(|p| filter.matches(p))
            .skip(skip as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &ProductFilter) -> Result<u64, StoreError> {
        Ok(self
            .collections
            .lock()
            .await
            .products
            .iter()
            .filter(|p| filter.matches(p))
            .count() as u64)
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn find_by_order_number(
        &self,
        order_number: &str,
    ) -> Result<Option<Order>, StoreError> {
        Ok(self.collections.lock().await.orders.get(order_number).cloned())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let needle = email.to_lowercase();
        Ok(self
            .collections
            .lock()
            .await
            .users
            .iter()
            .find(|u| u.email.to_lowercase() == needle)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self
            .collections
            .lock()
            .await
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn create(&self, user: User) -> Result<User, StoreError> {
        let mut collections = self.collections.lock().await;
        let email = user.email.to_lowercase();
        if collections
            .users
            .iter()
            .any(|u| u.email.to_lowercase() == email)
        {
            return Err(StoreError::DuplicateEmail);
        }
        collections.users.push(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use mercato_catalog::Variant;
    use mercato_order::{Customer, OrderStatus};
    use rust_decimal::Decimal;

    use super::*;

    fn product(name: &str, inventory: u32) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: "test product".to_string(),
            price: Decimal::new(2500, 2),
            images: vec!["https://cdn.example.com/p.jpg".to_string()],
            variants: vec![Variant {
                color: "black".into(),
                size: "M".into(),
                inventory,
            }],
        }
    }

    fn order(number: &str) -> Order {
        Order::new(
            number.to_string(),
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
            OrderStatus::Pending,
        )
    }

    #[tokio::test]
    async fn staged_writes_are_invisible_until_commit() {
        let store = MemoryStore::new();
        let p = product("Tee", 5);
        store.insert_product(p.clone()).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.deduct_inventory(p.id, 0, 2).await.unwrap();
        tx.insert_order(&order("ORD-1-aaaaaaaaa")).await.unwrap();

        // Reads inside the transaction see the staged state.
        let staged = tx.product_by_id(p.id).await.unwrap().unwrap();
        assert_eq!(staged.variants[0].inventory, 3);

        tx.commit().await.unwrap();

        let committed = ProductRepository::find_by_id(&store, p.id).await.unwrap().unwrap();
        assert_eq!(committed.variants[0].inventory, 3);
        assert!(store
            .find_by_order_number("ORD-1-aaaaaaaaa")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn dropped_transaction_discards_all_writes() {
        let store = MemoryStore::new();
        let p = product("Tee", 5);
        store.insert_product(p.clone()).await.unwrap();

        {
            let mut tx = store.begin().await.unwrap();
            tx.deduct_inventory(p.id, 0, 5).await.unwrap();
            tx.insert_order(&order("ORD-2-bbbbbbbbb")).await.unwrap();
            // No commit.
        }

        let committed = ProductRepository::find_by_id(&store, p.id).await.unwrap().unwrap();
        assert_eq!(committed.variants[0].inventory, 5);
        assert!(store
            .find_by_order_number("ORD-2-bbbbbbbbb")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn duplicate_order_number_is_a_typed_error() {
        let store = MemoryStore::new();

        let mut tx = store.begin().await.unwrap();
        tx.insert_order(&order("ORD-3-ccccccccc")).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert!(tx.order_number_taken("ORD-3-ccccccccc").await.unwrap());
        let err = tx.insert_order(&order("ORD-3-ccccccccc")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateOrderNumber));
    }

    #[tokio::test]
    async fn duplicate_staged_order_number_is_rejected_too() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert_order(&order("ORD-4-ddddddddd")).await.unwrap();
        let err = tx.insert_order(&order("ORD-4-ddddddddd")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateOrderNumber));
    }

    #[tokio::test]
    async fn inventory_underflow_is_refused() {
        let store = MemoryStore::new();
        let p = product("Tee", 1);
        store.insert_product(p.clone()).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let err = tx.deduct_inventory(p.id, 0, 2).await.unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[tokio::test]
    async fn invalid_product_documents_are_rejected() {
        let store = MemoryStore::new();
        let mut p = product("Tee", 1);
        p.images.clear();
        assert!(store.insert_product(p).await.is_err());
    }

    #[tokio::test]
    async fn listing_is_stable_across_pages() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store
                .insert_product(product(&format!("Product {i}"), 1))
                .await
                .unwrap();
        }

        let filter = ProductFilter::default();
        let first = store.find(&filter, 0, 2).await.unwrap();
        let second = store.find(&filter, 2, 2).await.unwrap();
        let third = store.find(&filter, 4, 2).await.unwrap();

        let names: Vec<String> = first
            .into_iter()
            .chain(second)
            .chain(third)
            .map(|p| p.name)
            .collect();
        assert_eq!(
            names,
            vec!["Product 0", "Product 1", "Product 2", "Product 3", "Product 4"]
        );
        assert_eq!(store.count(&filter).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn user_emails_are_unique_case_insensitively() {
        let store = MemoryStore::new();
        store
            .create(User::new(
                "Ada".into(),
                "Ada@Example.com".into(),
                "hash".into(),
            ))
            .await
            .unwrap();

        let err = store
            .create(User::new(
                "Imposter".into(),
                "ada@example.com".into(),
                "hash".into(),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));

        assert!(store
            .find_by_email("ADA@EXAMPLE.COM")
            .await
            .unwrap()
            .is_some());
    }
}
