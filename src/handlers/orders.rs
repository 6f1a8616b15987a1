use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::errors::ApiError;
use crate::handlers::common::{map_service_error, success_response, PaginationParams};
use crate::AppState;

/// Creates the router for order history endpoints
pub fn orders_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_orders))
        .route("/:id", get(get_order))
}

/// The customer's orders, newest first, with derived delivery stages
async fn list_orders(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let (page, per_page) = pagination.clamped(
        state.config.api_default_page_size,
        state.config.api_max_page_size,
    );

    let orders = state
        .services
        .orders
        .list_orders(ctx.account_id, page, per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(orders))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let order = state
        .services
        .orders
        .get_order(ctx.account_id, id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(order))
}
