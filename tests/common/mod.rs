#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use partshub_api::auth::{ACCOUNT_ID_HEADER, ACCOUNT_ROLE_HEADER};
use partshub_api::config::AppConfig;
use partshub_api::db;
use partshub_api::entities::{account, product, voucher_ledger, AccountRole};
use partshub_api::events::{self, EventSender};
use partshub_api::AppState;

/// Helper harness for spinning up an application backed by a throwaway
/// SQLite database file.
pub struct TestApp {
    router: Router,
    pub state: Arc<AppState>,
    db_file: String,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let db_file = format!("partshub_test_{}.db", Uuid::new_v4().simple());
        let _ = std::fs::remove_file(&db_file);

        let mut cfg = AppConfig::new(
            format!("sqlite://{db_file}?mode=rwc"),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = Arc::new(AppState::new(db_arc, cfg, event_sender));
        let router = partshub_api::app_router(state.clone());

        Self {
            router,
            state,
            db_file,
            _event_task: event_task,
        }
    }

    /// Send a request against the router, optionally acting as an account.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        acting_as: Option<&account::Model>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(acct) = acting_as {
            builder = builder
                .header(ACCOUNT_ID_HEADER, acct.id.to_string())
                .header(ACCOUNT_ROLE_HEADER, acct.role.to_string());
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Convenience wrapper for requests issued by an account.
    pub async fn request_as(
        &self,
        account: &account::Model,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response {
        self.request(method, uri, body, Some(account)).await
    }

    /// Send a request with raw identity headers, for malformed-header cases.
    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn seed_account(&self, role: AccountRole) -> account::Model {
        self.seed_account_with_car(role, None, None, None).await
    }

    pub async fn seed_account_with_car(
        &self,
        role: AccountRole,
        brand: Option<&str>,
        model: Option<&str>,
        year: Option<i32>,
    ) -> account::Model {
        account::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(format!("user-{}", Uuid::new_v4().simple())),
            role: Set(role),
            saved_car_brand: Set(brand.map(str::to_string)),
            saved_car_model: Set(model.map(str::to_string)),
            saved_car_year: Set(year),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed account for tests")
    }

    pub async fn seed_product(
        &self,
        seller_id: Uuid,
        name: &str,
        price: Decimal,
        stock: i32,
    ) -> product::Model {
        self.seed_listing(
            seller_id,
            name,
            "Toyota",
            "Vios",
            "2014,2015,2016",
            price,
            stock,
        )
        .await
    }

    pub async fn seed_listing(
        &self,
        seller_id: Uuid,
        name: &str,
        brand: &str,
        model: &str,
        compatible_years: &str,
        price: Decimal,
        stock: i32,
    ) -> product::Model {
        product::ActiveModel {
            id: Set(Uuid::new_v4()),
            seller_id: Set(seller_id),
            name: Set(name.to_string()),
            brand: Set(brand.to_string()),
            model: Set(model.to_string()),
            compatible_years: Set(compatible_years.to_string()),
            price: Set(price),
            stock: Set(stock),
            version: Set(0),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed product for tests")
    }

    /// Seed a voucher ledger. Keep `extra_vouchers_earned` consistent with
    /// `total_spent`; the milestone math treats earned blocks as cumulative.
    pub async fn seed_ledger(
        &self,
        account_id: Uuid,
        total_spent: Decimal,
        extra_voucher_balance: i32,
        extra_vouchers_earned: i32,
    ) -> voucher_ledger::Model {
        voucher_ledger::ActiveModel {
            id: Set(Uuid::new_v4()),
            account_id: Set(account_id),
            total_spent: Set(total_spent),
            five_pct_used: Set(false),
            ten_pct_used: Set(false),
            twenty_pct_used: Set(false),
            extra_voucher_balance: Set(extra_voucher_balance),
            extra_vouchers_earned: Set(extra_vouchers_earned),
            version: Set(0),
            updated_at: Set(Utc::now()),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed voucher ledger for tests")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", self.db_file, suffix));
        }
    }
}

/// Decode a response body as JSON.
pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

/// Parse a decimal field serialized as a JSON string.
pub fn decimal_field(value: &Value) -> Decimal {
    value
        .as_str()
        .unwrap_or_else(|| panic!("expected decimal string, got {value}"))
        .parse()
        .expect("decimal field")
}
