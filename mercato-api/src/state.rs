use std::sync::Arc;

use mercato_catalog::CatalogService;
use mercato_core::UserRepository;
use mercato_order::OrderWorkflow;

#[derive(Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub jwt_refresh_secret: String,
    pub access_token_minutes: i64,
    pub refresh_token_days: i64,
}

/// Shared handler dependencies, wired once in `main`.
#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<OrderWorkflow>,
    pub catalog: Arc<CatalogService>,
    pub users: Arc<dyn UserRepository>,
    pub auth: AuthSettings,
}
