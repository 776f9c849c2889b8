use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use mercato_catalog::{query::DEFAULT_PAGE_SIZE, CatalogError, CatalogPage, Product, ProductFilter};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/{id}", get(get_product))
}

#[derive(Debug, Deserialize)]
pub struct ProductListParams {
    pub search: Option<String>,
    #[serde(rename = "minPrice")]
    pub min_price: Option<String>,
    #[serde(rename = "maxPrice")]
    pub max_price: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

fn parse_price(raw: Option<String>, field: &str) -> Result<Option<Decimal>, AppError> {
    raw.filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<Decimal>()
                .map_err(|_| AppError::BadRequest(format!("{field} must be a number")))
        })
        .transpose()
}

/// GET /products?search&minPrice&maxPrice&page&limit
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ProductListParams>,
) -> Result<Json<CatalogPage>, AppError> {
    let filter = ProductFilter {
        search: params.search.filter(|s| !s.is_empty()),
        min_price: parse_price(params.min_price, "minPrice")?,
        max_price: parse_price(params.max_price, "maxPrice")?,
    };

    let page = state
        .catalog
        .list(
            filter,
            params.page.unwrap_or(1),
            params.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        )
        .await
        .map_err(|err| AppError::Internal(err.into()))?;

    Ok(Json(page))
}

/// GET /products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, AppError> {
    match state.catalog.get(id).await {
        Ok(product) => Ok(Json(product)),
        Err(CatalogError::NotFound) => Err(AppError::NotFound("Product not found".to_string())),
        Err(err) => Err(AppError::Internal(err.into())),
    }
}
