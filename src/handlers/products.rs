use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthContext;
use crate::entities::AccountRole;
use crate::errors::ApiError;
use crate::handlers::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
};
use crate::services::products::{NewProduct, ProductFilter, ProductUpdate};
use crate::AppState;

/// Creates the router for catalog and seller listing endpoints
pub fn products_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_products))
        .route("/", post(create_product))
        .route("/mine", get(list_own_products))
        .route("/:id", get(get_product))
        .route("/:id", put(update_product))
        .route("/:id", delete(delete_product))
        .route("/:id/stock", post(add_stock))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ProductListQuery {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    #[serde(default)]
    pub page: u64,
    #[serde(default)]
    pub per_page: u64,
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200, message = "Product name must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub brand: String,
    #[validate(length(min = 1, max = 100))]
    pub model: String,
    /// Comma-separated compatible car years, e.g. "2014,2015,2016".
    #[serde(default)]
    pub compatible_years: String,
    pub price: Decimal,
    #[serde(default)]
    pub stock: i32,
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub brand: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub model: Option<String>,
    pub compatible_years: Option<String>,
    pub price: Option<Decimal>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct AddStockRequest {
    #[validate(range(min = 1, message = "Restock quantity must be at least 1"))]
    pub quantity: i32,
}

/// Browse the catalog with optional brand, model, and year filters
async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProductListQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let page = query.page.max(1);
    let per_page = if query.per_page == 0 {
        u64::from(state.config.api_default_page_size)
    } else {
        query.per_page.min(u64::from(state.config.api_max_page_size))
    };

    let page = state
        .services
        .products
        .list_products(ProductFilter {
            brand: query.brand,
            model: query.model,
            year: query.year,
            page,
            page_size: per_page,
        })
        .await
        .map_err(map_service_error)?;

    Ok(success_response(page))
}

async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let product = state
        .services
        .products
        .get_product(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(product))
}

/// Create a listing owned by the authenticated seller
async fn create_product(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;
    ctx.require_role(AccountRole::Seller)
        .map_err(map_service_error)?;

    let product = state
        .services
        .products
        .create_product(
            ctx.account_id,
            NewProduct {
                name: payload.name,
                brand: payload.brand,
                model: payload.model,
                compatible_years: payload.compatible_years,
                price: payload.price,
                stock: payload.stock,
            },
        )
        .await
        .map_err(map_service_error)?;

    Ok(created_response(product))
}

async fn update_product(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let product = state
        .services
        .products
        .update_product(
            ctx.account_id,
            id,
            ProductUpdate {
                name: payload.name,
                brand: payload.brand,
                model: payload.model,
                compatible_years: payload.compatible_years,
                price: payload.price,
            },
        )
        .await
        .map_err(map_service_error)?;

    Ok(success_response(product))
}

async fn delete_product(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .products
        .delete_product(ctx.account_id, id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

async fn add_stock(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddStockRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let product = state
        .services
        .products
        .add_stock(ctx.account_id, id, payload.quantity)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(product))
}

async fn list_own_products(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    ctx.require_role(AccountRole::Seller)
        .map_err(map_service_error)?;

    let products = state
        .services
        .products
        .list_for_seller(ctx.account_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(products))
}
