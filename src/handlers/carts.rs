use axum::{
    extract::{Path, State},
    routing::{post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthContext;
use crate::errors::ApiError;
use crate::handlers::common::{map_service_error, success_response, validate_input};
use crate::services::carts::{Cart, CartView};
use crate::services::vouchers::VoucherOption;
use crate::AppState;

/// Creates the router for cart endpoints.
///
/// The cart is a session value: every request carries the current cart and
/// every response returns the updated one for the caller to store.
pub fn carts_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/items", post(add_item))
        .route("/items/:product_id", put(update_item))
        .route("/items/:product_id/remove", post(remove_item))
        .route("/view", post(view_cart))
}

/// Updated cart plus its rendered view.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartEnvelope {
    pub cart: Cart,
    pub view: CartView,
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct AddCartItemRequest {
    #[serde(default)]
    pub cart: Cart,
    pub product_id: Uuid,
    #[serde(default)]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateCartItemRequest {
    pub cart: Cart,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CartStateRequest {
    #[serde(default)]
    pub cart: Cart,
}

/// Cart view with the vouchers the customer could apply at checkout.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartViewResponse {
    pub view: CartView,
    pub available_vouchers: Vec<VoucherOption>,
}

async fn add_item(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AddCartItemRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let cart = state
        .services
        .carts
        .add_item(payload.cart, payload.product_id, payload.quantity)
        .await
        .map_err(map_service_error)?;

    let view = CartView::from(&cart);
    Ok(success_response(CartEnvelope { cart, view }))
}

async fn update_item(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let cart = state
        .services
        .carts
        .update_quantity(payload.cart, product_id, payload.quantity)
        .await
        .map_err(map_service_error)?;

    let view = CartView::from(&cart);
    Ok(success_response(CartEnvelope { cart, view }))
}

async fn remove_item(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<CartStateRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let cart = state
        .services
        .carts
        .remove_item(payload.cart, product_id)
        .map_err(map_service_error)?;

    let view = CartView::from(&cart);
    Ok(success_response(CartEnvelope { cart, view }))
}

/// Render the cart with totals and the customer's usable vouchers
async fn view_cart(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Json(payload): Json<CartStateRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let available_vouchers = state
        .services
        .vouchers
        .list_available(ctx.account_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(CartViewResponse {
        view: CartView::from(&payload.cart),
        available_vouchers,
    }))
}
