//! ShopLedger API Library
//!
//! Stock ledger, invoicing, installment plans, returns, and period reporting
//! for a small retail operation.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod clock;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod services;
pub mod tracing;

use axum::{extract::State, response::Json, routing::get, routing::post, Router};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<db::DbPool>,
    pub config: config::AppConfig,
    pub clock: clock::SharedClock,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

// Common response wrappers
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn validation_errors(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some("Validation failed".to_string()),
            errors: Some(errors),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

// API routes, mounted under /api/v1
pub fn api_v1_routes() -> Router<AppState> {
    let skus = Router::new()
        .route(
            "/skus",
            get(handlers::skus::list_skus).post(handlers::skus::create_sku),
        )
        .route(
            "/skus/:id",
            get(handlers::skus::get_sku).put(handlers::skus::update_sku),
        )
        .route("/skus/by-code/:code", get(handlers::skus::get_sku_by_code))
        .route("/skus/:id/deactivate", post(handlers::skus::deactivate_sku))
        .route("/skus/:id/movements", get(handlers::stock::sku_movements))
        .route("/skus/:id/adjust", post(handlers::stock::adjust_stock))
        .route("/skus/:id/expected", get(handlers::stock::expected_quantity));

    let stock = Router::new()
        .route("/stock/movements", post(handlers::stock::record_movement))
        .route("/stock/low", get(handlers::stock::low_stock))
        .route("/stock/expiring", get(handlers::stock::expiring));

    let sales = Router::new()
        .route(
            "/sales-invoices",
            get(handlers::sales::list_invoices).post(handlers::sales::create_invoice),
        )
        .route("/sales-invoices/:id", get(handlers::sales::get_invoice));

    let purchases = Router::new()
        .route(
            "/purchase-invoices",
            get(handlers::purchases::list_invoices).post(handlers::purchases::create_invoice),
        )
        .route(
            "/purchase-invoices/:id",
            get(handlers::purchases::get_invoice),
        );

    let installments = Router::new()
        .route(
            "/installment-plans",
            get(handlers::installments::list_plans),
        )
        .route(
            "/installment-plans/:id",
            get(handlers::installments::get_plan),
        )
        .route(
            "/installment-plans/:id/payments",
            get(handlers::installments::list_payments)
                .post(handlers::installments::apply_payment),
        );

    let returns = Router::new()
        .route(
            "/returns",
            get(handlers::returns::list_returns).post(handlers::returns::create_return),
        )
        .route("/returns/:id", get(handlers::returns::get_return))
        .route("/returns/:id/approve", post(handlers::returns::approve_return))
        .route("/returns/:id/reject", post(handlers::returns::reject_return));

    let reports = Router::new()
        .route("/reports/daily", get(handlers::reports::daily_summary))
        .route("/reports/summary", get(handlers::reports::period_summary))
        .route("/reports/top-sellers", get(handlers::reports::top_sellers))
        .route("/reports/dashboard", get(handlers::reports::dashboard));

    let stock_takes = Router::new()
        .route(
            "/stock-takes",
            get(handlers::stock_takes::list_takes).post(handlers::stock_takes::record_counts),
        )
        .route("/stock-takes/sheet", get(handlers::stock_takes::sheet));

    let ledger = Router::new().route(
        "/ledger-entries",
        get(handlers::ledger_entries::list_entries).post(handlers::ledger_entries::record_entry),
    );

    let parties = Router::new()
        .route(
            "/customers",
            get(handlers::customers::list_customers).post(handlers::customers::create_customer),
        )
        .route("/customers/:id", get(handlers::customers::get_customer))
        .route(
            "/suppliers",
            get(handlers::suppliers::list_suppliers).post(handlers::suppliers::create_supplier),
        )
        .route("/suppliers/:id", get(handlers::suppliers::get_supplier));

    Router::new()
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        .merge(skus)
        .merge(stock)
        .merge(sales)
        .merge(purchases)
        .merge(installments)
        .merge(returns)
        .merge(reports)
        .merge(stock_takes)
        .merge(ledger)
        .merge(parties)
}

/// Full application router with the request-id middleware attached. The
/// binary layers CORS, tracing, and compression on top.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_v1_routes())
        .layer(axum::middleware::from_fn(tracing::request_id_middleware))
        .with_state(state)
}

async fn api_status() -> ApiResult<Value> {
    let status_data = json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "shopledger-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(State(state): State<AppState>) -> ApiResult<Value> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[tokio::test]
    async fn error_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-err"), async {
                ApiResponse::<()>::error("oops".into())
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-err"));
        assert!(!meta.timestamp.is_empty());
    }

    #[tokio::test]
    async fn validation_errors_response_includes_metadata() {
        let response = crate::tracing::scope_request_id(
            crate::tracing::RequestId::new("meta-validation"),
            async { ApiResponse::<()>::validation_errors(vec!["missing".into()]) },
        )
        .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-validation"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }
}
