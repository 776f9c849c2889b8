use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use mercato_api::{app, AppState, AuthSettings};
use mercato_catalog::{CatalogService, ProductRepository};
use mercato_core::payment::RandomPaymentGateway;
use mercato_core::UserRepository;
use mercato_order::{CheckoutStore, OrderRepository, OrderWorkflow, TimestampOrderNumbers};
use mercato_notify::{SmtpConfig, SmtpSink};
use mercato_store::MemoryStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mercato_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = mercato_store::Config::load().expect("Failed to load config");
    tracing::info!("Starting Mercato API on port {}", config.server.port);

    let store = Arc::new(MemoryStore::new());
    if let Some(seed_path) = &config.store.seed_path {
        store
            .load_products(Path::new(seed_path))
            .await
            .expect("Failed to load product seed");
    }

    let sink = SmtpSink::new(SmtpConfig {
        host: config.smtp.host.clone(),
        port: config.smtp.port,
        username: config.smtp.username.clone(),
        password: config.smtp.password.clone(),
        from: config.smtp.from.clone(),
        frontend_url: config.smtp.frontend_url.clone(),
    });

    let checkout: Arc<dyn CheckoutStore> = store.clone();
    let orders: Arc<dyn OrderRepository> = store.clone();
    let products: Arc<dyn ProductRepository> = store.clone();
    let users: Arc<dyn UserRepository> = store.clone();

    let workflow = OrderWorkflow::new(
        checkout,
        orders,
        Arc::new(RandomPaymentGateway),
        Arc::new(sink),
        Arc::new(TimestampOrderNumbers),
    );

    let state = AppState {
        orders: Arc::new(workflow),
        catalog: Arc::new(CatalogService::new(products)),
        users,
        auth: AuthSettings {
            jwt_secret: config.auth.jwt_secret.clone(),
            jwt_refresh_secret: config.auth.jwt_refresh_secret.clone(),
            access_token_minutes: config.auth.access_token_minutes,
            refresh_token_days: config.auth.refresh_token_days,
        },
    };

    let app = app(state, config.server.cors_origin.as_deref());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");
    axum::serve(listener, app).await.expect("Server error");
}
