use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::AuthContext;
use crate::errors::ApiError;
use crate::handlers::common::{created_response, map_service_error, success_response, validate_input};
use crate::services::carts::Cart;
use crate::AppState;

/// Checkout preview, mounted under the cart routes
pub fn cart_checkout_routes() -> Router<Arc<AppState>> {
    Router::new().route("/checkout", post(preview_checkout))
}

/// Creates the router for the payment (checkout commit) endpoint
pub fn payments_routes() -> Router<Arc<AppState>> {
    Router::new().route("/payments", post(commit_checkout))
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CheckoutPreviewRequest {
    pub cart: Cart,
    /// Voucher code to apply; ineligible codes price as no discount.
    #[serde(default)]
    pub voucher_code: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct PaymentRequest {
    pub cart: Cart,
    #[serde(default)]
    pub voucher_code: String,
    #[validate(length(min = 1, max = 50, message = "Payment method is required"))]
    pub payment_method: String,
}

/// Price the cart without committing anything
async fn preview_checkout(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Json(payload): Json<CheckoutPreviewRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let pending = state
        .services
        .checkout
        .preview(ctx.account_id, &payload.cart, &payload.voucher_code)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(pending))
}

/// Commit the checkout and return the receipt
async fn commit_checkout(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Json(payload): Json<PaymentRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let receipt = state
        .services
        .checkout
        .commit(
            ctx.account_id,
            &payload.cart,
            &payload.voucher_code,
            &payload.payment_method,
        )
        .await
        .map_err(map_service_error)?;

    Ok(created_response(receipt))
}
