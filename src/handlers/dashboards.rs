use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::errors::{ApiError, ServiceError};
use crate::handlers::common::{map_service_error, success_response};
use crate::AppState;

/// Creates the router for seller and installer dashboard endpoints
pub fn dashboards_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sellers/:id/dashboard", get(seller_dashboard))
        .route("/installers/:id/dashboard", get(installer_dashboard))
}

fn require_self(ctx: &AuthContext, id: Uuid) -> Result<(), ApiError> {
    if ctx.account_id != id {
        return Err(ApiError::ServiceError(ServiceError::Forbidden(
            "Dashboards are only visible to their owner".to_string(),
        )));
    }
    Ok(())
}

async fn seller_dashboard(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    require_self(&ctx, id)?;

    let dashboard = state
        .services
        .dashboards
        .seller_dashboard(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(dashboard))
}

async fn installer_dashboard(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    require_self(&ctx, id)?;

    let dashboard = state
        .services
        .dashboards
        .installer_dashboard(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(dashboard))
}
