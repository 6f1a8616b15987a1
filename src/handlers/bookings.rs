use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthContext;
use crate::entities::{AccountRole, BookingStatus};
use crate::errors::ApiError;
use crate::handlers::common::{created_response, map_service_error, success_response, validate_input};
use crate::services::bookings::NewBooking;
use crate::AppState;

/// Creates the router for installation booking endpoints
pub fn bookings_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_booking))
        .route("/", get(list_bookings))
        .route("/:id/decision", post(decide_booking))
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateBookingRequest {
    pub installer_id: Uuid,
    pub product_id: Option<Uuid>,
    /// Car fields omitted here fall back to the customer's saved car.
    pub car_brand: Option<String>,
    pub car_model: Option<String>,
    #[validate(range(min = 1950, max = 2100))]
    pub car_year: Option<i32>,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct BookingDecisionRequest {
    pub accept: bool,
}

#[derive(Debug, Deserialize)]
pub struct BookingListQuery {
    /// Installer-side status filter; ignored for customers.
    pub status: Option<BookingStatus>,
}

async fn create_booking(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;
    ctx.require_role(AccountRole::Customer)
        .map_err(map_service_error)?;

    let booking = state
        .services
        .bookings
        .create_booking(
            ctx.account_id,
            NewBooking {
                installer_id: payload.installer_id,
                product_id: payload.product_id,
                car_brand: payload.car_brand,
                car_model: payload.car_model,
                car_year: payload.car_year,
                scheduled_date: payload.scheduled_date,
                scheduled_time: payload.scheduled_time,
            },
        )
        .await
        .map_err(map_service_error)?;

    Ok(created_response(booking))
}

/// Accept or reject a pending booking; installer-only
async fn decide_booking(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<BookingDecisionRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let booking = state
        .services
        .bookings
        .decide(ctx.account_id, id, payload.accept)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(booking))
}

/// Bookings scoped to the caller: customers see the ones they made,
/// installers the ones assigned to them
async fn list_bookings(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Query(query): Query<BookingListQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let bookings = match ctx.role {
        AccountRole::Installer => state
            .services
            .bookings
            .list_for_installer(ctx.account_id, query.status)
            .await,
        _ => state.services.bookings.list_for_customer(ctx.account_id).await,
    }
    .map_err(map_service_error)?;

    Ok(success_response(bookings))
}
