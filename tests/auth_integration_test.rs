//! Identity header handling across the API surface, plus the health
//! endpoint smoke check.

mod common;

use axum::http::{Method, StatusCode};
use common::{response_json, TestApp};
use partshub_api::auth::{ACCOUNT_ID_HEADER, ACCOUNT_ROLE_HEADER};
use partshub_api::entities::AccountRole;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
#[ignore = "requires a SQLite integration environment"]
async fn health_reports_database_up() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;

    assert_eq!(body["status"], "up");
    assert_eq!(body["database"]["status"], "up");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
#[ignore = "requires a SQLite integration environment"]
async fn missing_identity_headers_are_unauthorized() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/cart/view",
            Some(json!({ "cart": { "lines": [] } })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
#[ignore = "requires a SQLite integration environment"]
async fn malformed_account_id_is_unauthorized() {
    let app = TestApp::new().await;

    let response = app
        .request_with_headers(
            Method::GET,
            "/api/v1/orders",
            None,
            &[
                (ACCOUNT_ID_HEADER, "not-a-uuid"),
                (ACCOUNT_ROLE_HEADER, "customer"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires a SQLite integration environment"]
async fn unknown_role_header_is_unauthorized() {
    let app = TestApp::new().await;
    let id = Uuid::new_v4().to_string();

    let response = app
        .request_with_headers(
            Method::GET,
            "/api/v1/orders",
            None,
            &[(ACCOUNT_ID_HEADER, &id), (ACCOUNT_ROLE_HEADER, "wizard")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires a SQLite integration environment"]
async fn role_mismatch_is_forbidden_not_unauthorized() {
    let app = TestApp::new().await;
    let customer = app.seed_account(AccountRole::Customer).await;

    let response = app
        .request_as(
            &customer,
            Method::POST,
            "/api/v1/products",
            Some(json!({
                "name": "Tow hook",
                "brand": "Ford",
                "model": "Ranger",
                "compatible_years": "2020",
                "price": "900",
                "stock": 1
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Forbidden");
}

#[tokio::test]
#[ignore = "requires a SQLite integration environment"]
async fn catalog_browsing_needs_no_identity() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/v1/products", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["total"], 0);
}
