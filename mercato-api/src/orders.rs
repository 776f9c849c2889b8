use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use mercato_order::{
    Customer, Order, OrderError, OrderLineRequest, OrderReceipt, VariantChoice,
};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_order))
        .route("/{order_number}", get(get_order))
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateOrderBody {
    pub items: Option<Vec<OrderItemBody>>,
    #[serde(rename = "productId")]
    pub product_id: Option<Uuid>,
    pub variant: Option<VariantBody>,
    pub quantity: Option<i64>,
    pub customer: Option<CustomerBody>,
}

#[derive(Debug, Deserialize)]
pub struct OrderItemBody {
    #[serde(rename = "productId")]
    pub product_id: Option<Uuid>,
    pub variant: Option<VariantBody>,
    pub quantity: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct VariantBody {
    pub color: Option<String>,
    pub size: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CustomerBody {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
}

impl CustomerBody {
    /// Customer snapshot with markup stripped from every field.
    fn sanitized(&self) -> Customer {
        Customer {
            name: strip_markup(&self.name),
            email: strip_markup(&self.email),
            phone: strip_markup(&self.phone),
            address: strip_markup(&self.address),
            city: strip_markup(&self.city),
            state: strip_markup(&self.state),
            zip: strip_markup(&self.zip),
        }
    }
}

/// Drops `<...>` tags, keeping the text between them.
fn strip_markup(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_tag = false;
    for c in value.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Unifies the items-array and single-product input forms into one line
/// sequence. The items array wins when both are supplied.
fn normalize_lines(body: &CreateOrderBody) -> Result<Vec<OrderLineRequest>, AppError> {
    if let Some(items) = &body.items {
        if items.is_empty() {
            return Err(AppError::BadRequest(
                "Items must be a non-empty array".to_string(),
            ));
        }
        if items.len() > 50 {
            return Err(AppError::BadRequest(
                "Too many items in the order (maximum 50)".to_string(),
            ));
        }
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let (Some(product_id), Some(variant), Some(quantity)) =
                    (item.product_id, item.variant.as_ref(), item.quantity)
                else {
                    return Err(AppError::BadRequest(format!(
                        "Item at index {index} is missing required fields (productId, variant, quantity)"
                    )));
                };
                let variant = variant_choice(variant).ok_or_else(|| {
                    AppError::BadRequest(format!(
                        "Item at index {index} is missing variant details (color, size)"
                    ))
                })?;
                let quantity = positive_quantity(quantity).ok_or_else(|| {
                    AppError::BadRequest(format!(
                        "Item at index {index} has an invalid quantity (must be a positive integer)"
                    ))
                })?;
                Ok(OrderLineRequest {
                    product_id,
                    variant,
                    quantity,
                })
            })
            .collect()
    } else if let (Some(product_id), Some(variant), Some(quantity)) =
        (body.product_id, body.variant.as_ref(), body.quantity)
    {
        let variant = variant_choice(variant).ok_or_else(|| {
            AppError::BadRequest("Variant must include color and size".to_string())
        })?;
        let quantity = positive_quantity(quantity).ok_or_else(|| {
            AppError::BadRequest("Quantity must be a positive integer".to_string())
        })?;
        Ok(vec![OrderLineRequest {
            product_id,
            variant,
            quantity,
        }])
    } else {
        Err(AppError::BadRequest(
            "Order items or product details are required".to_string(),
        ))
    }
}

fn variant_choice(variant: &VariantBody) -> Option<VariantChoice> {
    let color = variant.color.clone().filter(|c| !c.is_empty())?;
    let size = variant.size.clone().filter(|s| !s.is_empty())?;
    Some(VariantChoice { color, size })
}

fn positive_quantity(quantity: i64) -> Option<u32> {
    if quantity < 1 {
        return None;
    }
    u32::try_from(quantity).ok()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /orders
/// Place an order; body carries either an items array or a single-product
/// selection, plus the customer record.
pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<CreateOrderBody>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderReceipt>), AppError> {
    let Json(body) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let customer = body
        .customer
        .as_ref()
        .ok_or_else(|| AppError::BadRequest("Customer details are required".to_string()))?
        .sanitized();
    let lines = normalize_lines(&body)?;

    let receipt = state
        .orders
        .create_order(customer, lines)
        .await
        .map_err(map_create_error)?;

    tracing::info!(
        order_number = %receipt.order_number,
        status = ?receipt.status,
        "order created"
    );
    Ok((StatusCode::CREATED, Json(receipt)))
}

fn map_create_error(err: OrderError) -> AppError {
    match err {
        OrderError::Validation(_)
        | OrderError::ProductNotFound(_)
        | OrderError::InvalidVariant { .. }
        | OrderError::InsufficientInventory { .. }
        | OrderError::OrderNumberExhausted
        | OrderError::DuplicateOrderNumber => AppError::BadRequest(err.to_string()),
        OrderError::NotFound => AppError::NotFound(err.to_string()),
        OrderError::Store(err) => AppError::Internal(err.into()),
    }
}

/// GET /orders/{orderNumber}
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
) -> Result<Json<Order>, AppError> {
    match state.orders.get_order_by_number(&order_number).await {
        Ok(order) => Ok(Json(order)),
        Err(OrderError::NotFound) => Err(AppError::NotFound("Order not found".to_string())),
        Err(err) => Err(AppError::Internal(err.into())),
    }
}
