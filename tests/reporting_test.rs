mod common;

use axum::http::{Method, StatusCode};
use common::{data, decimal, uuid_of, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

/// Seeds a day of trade: two sales (100 fully paid + 200 half paid), one
/// purchase of 80, and one approved sales return of 40.
async fn seed_trading_day(app: &TestApp) {
    let sku_a = app.seed_sku("REP-A", "50", "10.00").await;
    let sku_b = app.seed_sku("REP-B", "50", "20.00").await;
    let sku_a_id = uuid_of(&sku_a["id"]);
    let sku_b_id = uuid_of(&sku_b["id"]);
    let customer = app.seed_customer("Report customer").await;
    let customer_id = uuid_of(&customer["id"]);
    let supplier = app.seed_supplier("Report supplier").await;

    let response = app
        .request_as_actor(
            Method::POST,
            "/api/v1/sales-invoices",
            Some(json!({
                "customer_id": customer_id,
                "lines": [{ "sku_id": sku_a_id, "quantity": "10", "unit_price": "10.00" }],
                "amount_paid": "100.00",
            })),
        )
        .await;
    let invoice_id = uuid_of(&data(response).await["id"]);

    // Half-paid sale via an installment down payment.
    app.request_as_actor(
        Method::POST,
        "/api/v1/sales-invoices",
        Some(json!({
            "customer_id": customer_id,
            "lines": [{ "sku_id": sku_b_id, "quantity": "10", "unit_price": "20.00" }],
            "amount_paid": "100.00",
            "installment": { "kind": "Standard", "down_payment": "100.00", "months": 2 },
        })),
    )
    .await;

    app.request_as_actor(
        Method::POST,
        "/api/v1/purchase-invoices",
        Some(json!({
            "supplier_id": uuid_of(&supplier["id"]),
            "lines": [{ "sku_id": sku_a_id, "quantity": "10", "unit_price": "8.00" }],
            "amount_paid": "80.00",
        })),
    )
    .await;

    let response = app
        .request_as_actor(
            Method::POST,
            "/api/v1/returns",
            Some(json!({
                "direction": "Sales",
                "invoice_id": invoice_id,
                "counterparty_id": customer_id,
                "lines": [{ "sku_id": sku_a_id, "quantity": "4", "unit_price": "10.00" }],
            })),
        )
        .await;
    let return_id = uuid_of(&data(response).await["id"]);
    app.request_as_actor(
        Method::POST,
        &format!("/api/v1/returns/{}/approve", return_id),
        None,
    )
    .await;
}

#[tokio::test]
async fn daily_summary_nets_approved_returns_off_gross() {
    let app = TestApp::new().await;
    seed_trading_day(&app).await;

    let response = app
        .request(Method::GET, "/api/v1/reports/daily?date=2026-03-10", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let summary = data(response).await;
    assert_eq!(decimal(&summary["gross_sales"]), dec!(300.00));
    assert_eq!(decimal(&summary["sales_collected"]), dec!(200.00));
    assert_eq!(decimal(&summary["sales_outstanding"]), dec!(100.00));
    assert_eq!(summary["invoice_count"], json!(2));
    assert_eq!(decimal(&summary["purchases_total"]), dec!(80.00));
    assert_eq!(decimal(&summary["returns_total"]), dec!(40.00));
    assert_eq!(summary["returns_count"], json!(1));
    assert_eq!(decimal(&summary["net_sales"]), dec!(260.00));
}

#[tokio::test]
async fn summary_window_excludes_activity_outside_it() {
    let app = TestApp::new().await;
    seed_trading_day(&app).await;

    let response = app
        .request(
            Method::GET,
            "/api/v1/reports/summary?from=2026-03-01&to=2026-03-05",
            None,
        )
        .await;
    let summary = data(response).await;
    assert_eq!(decimal(&summary["gross_sales"]), dec!(0));
    assert_eq!(summary["invoice_count"], json!(0));

    // Inverted windows are rejected.
    let response = app
        .request(
            Method::GET,
            "/api/v1/reports/summary?from=2026-03-10&to=2026-03-01",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn top_sellers_rank_by_quantity_sold() {
    let app = TestApp::new().await;
    seed_trading_day(&app).await;

    // Sell 2 more of REP-B so both SKUs have distinct quantities (10 vs 12).
    let sku_b = {
        let response = app
            .request(Method::GET, "/api/v1/skus/by-code/REP-B", None)
            .await;
        data(response).await
    };
    let customer = app.seed_customer("Tie breaker").await;
    app.request_as_actor(
        Method::POST,
        "/api/v1/sales-invoices",
        Some(json!({
            "customer_id": uuid_of(&customer["id"]),
            "lines": [{ "sku_id": uuid_of(&sku_b["id"]), "quantity": "2", "unit_price": "20.00" }],
            "amount_paid": "40.00",
        })),
    )
    .await;

    let response = app
        .request(
            Method::GET,
            "/api/v1/reports/top-sellers?from=2026-03-10&to=2026-03-10&limit=5",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let sellers = data(response).await;
    let sellers = sellers.as_array().unwrap();
    assert_eq!(sellers.len(), 2);
    assert_eq!(sellers[0]["code"], json!("REP-B"));
    assert_eq!(decimal(&sellers[0]["quantity_sold"]), dec!(12));
    assert_eq!(decimal(&sellers[0]["revenue"]), dec!(240.00));
    assert_eq!(sellers[1]["code"], json!("REP-A"));
}

#[tokio::test]
async fn dashboard_compares_today_with_yesterday() {
    let app = TestApp::new().await;
    seed_trading_day(&app).await;

    let response = app
        .request(Method::GET, "/api/v1/reports/dashboard", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let dashboard = data(response).await;

    assert_eq!(decimal(&dashboard["today"]["net_sales"]), dec!(260.00));
    assert_eq!(decimal(&dashboard["yesterday"]["net_sales"]), dec!(0));
    // Growth from an empty yesterday reports 100.
    assert_eq!(decimal(&dashboard["net_sales_change_pct"]), dec!(100));
    assert_eq!(dashboard["pending_returns_count"], json!(0));
    assert_eq!(dashboard["active_plans_count"], json!(1));
    assert_eq!(decimal(&dashboard["active_plans_remaining"]), dec!(100.00));
    assert!(!dashboard["month_top_sellers"].as_array().unwrap().is_empty());
}
