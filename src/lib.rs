pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod services;

use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;

/// Shared application state threaded through every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: events::EventSender,
    ) -> Self {
        let services = handlers::AppServices::new(db.clone(), event_sender.clone());
        Self {
            db,
            config,
            event_sender,
            services,
        }
    }
}

/// All versioned API routes, mounted by `main` under `/api/v1`.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/products", handlers::products::products_routes())
        .nest(
            "/cart",
            handlers::carts::carts_routes().merge(handlers::checkout::cart_checkout_routes()),
        )
        .merge(handlers::checkout::payments_routes())
        .nest("/orders", handlers::orders::orders_routes())
        .nest("/bookings", handlers::bookings::bookings_routes())
        .merge(handlers::dashboards::dashboards_routes())
}

/// Full application router: health endpoint plus the versioned API.
pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(handlers::health::health_routes())
        .nest("/api/v1", api_router())
        .with_state(state)
}
