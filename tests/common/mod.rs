use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use shopledger_api::{
    clock::{FixedClock, SharedClock},
    config::AppConfig,
    db,
    events::{self, EventSender},
    handlers::AppServices,
    AppState,
};
use tokio::sync::mpsc;
use tower::ServiceExt;

/// Header every mutating request must carry.
pub const ACTOR: &str = "tester";

/// Harness spinning up the full router against a temporary SQLite database,
/// with the clock pinned so invoice numbers and windows are deterministic.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
    _db_dir: tempfile::TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_dir = tempfile::tempdir().expect("create temp dir for test database");
        let db_path = db_dir.path().join("shopledger_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.auto_migrate = true;
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

        let clock: SharedClock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap(),
        ));
        let services = AppServices::new(db_arc.clone(), clock.clone(), Arc::new(event_sender.clone()));

        let state = AppState {
            db: db_arc,
            config: cfg,
            clock,
            event_sender,
            services,
        };

        let router = shopledger_api::app_router(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
            _db_dir: db_dir,
        }
    }

    /// Raw request without the actor header.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        self.request_with_headers(method, uri, body, &[]).await
    }

    /// Request carrying the default test actor.
    pub async fn request_as_actor(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        self.request_with_headers(method, uri, body, &[("x-actor-id", ACTOR)])
            .await
    }

    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> axum::response::Response {
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

    /// Seeds a SKU through the API and returns its response payload.
    pub async fn seed_sku(&self, code: &str, opening_quantity: &str, sale_price: &str) -> Value {
        let response = self
            .request_as_actor(
                Method::POST,
                "/api/v1/skus",
                Some(json!({
                    "code": code,
                    "name": format!("Test item {}", code),
                    "opening_quantity": opening_quantity,
                    "purchase_price": "5.00",
                    "sale_price": sale_price,
                    "reorder_level": "2",
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK, "seeding SKU {}", code);
        data(response).await
    }

    pub async fn seed_customer(&self, name: &str) -> Value {
        let response = self
            .request_as_actor(
                Method::POST,
                "/api/v1/customers",
                Some(json!({ "name": name })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK, "seeding customer {}", name);
        data(response).await
    }

    pub async fn seed_supplier(&self, name: &str) -> Value {
        let response = self
            .request_as_actor(
                Method::POST,
                "/api/v1/suppliers",
                Some(json!({ "name": name })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK, "seeding supplier {}", name);
        data(response).await
    }
}

/// Parses a response body into JSON.
pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

/// Unwraps the `data` field of the standard response envelope.
pub async fn data(response: axum::response::Response) -> Value {
    let envelope = body_json(response).await;
    assert_eq!(envelope["success"], json!(true), "envelope: {}", envelope);
    envelope["data"].clone()
}

/// Reads a Decimal out of a JSON value, accepting both string and number
/// encodings.
pub fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().expect("decimal string"),
        Value::Number(n) => n.to_string().parse().expect("decimal number"),
        other => panic!("expected decimal-like JSON value, got {}", other),
    }
}

pub fn uuid_of(value: &Value) -> String {
    value.as_str().expect("uuid string").to_string()
}
