use std::sync::Arc;

use mercato_core::StoreError;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::product::Product;
use crate::repository::ProductRepository;

pub const DEFAULT_PAGE_SIZE: u64 = 9;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Product not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Catalog listing filter: case-insensitive substring match on name,
/// inclusive price bounds.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

impl ProductFilter {
    /// Predicate shared by the query service tests and the store's scan.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(search) = &self.search {
            if !product
                .name
                .to_lowercase()
                .contains(&search.to_lowercase())
            {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if product.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if product.price > max {
                return false;
            }
        }
        true
    }
}

/// One page of catalog results.
#[derive(Debug, Serialize)]
pub struct CatalogPage {
    pub products: Vec<Product>,
    pub total: u64,
    pub page: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

/// Paginated, filterable product listing and lookup.
pub struct CatalogService {
    products: Arc<dyn ProductRepository>,
}

impl CatalogService {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    pub async fn list(
        &self,
        filter: ProductFilter,
        page: u64,
        limit: u64,
    ) -> Result<CatalogPage, CatalogError> {
        let page = page.max(1);
        let limit = limit.max(1);
        let skip = (page - 1) * limit;

        let total = self.products.count(&filter).await?;
        let products = self.products.find(&filter, skip, limit).await?;

        Ok(CatalogPage {
            products,
            total,
            page,
            total_pages: total.div_ceil(limit),
        })
    }

    pub async fn get(&self, id: Uuid) -> Result<Product, CatalogError> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound)
    }
}
