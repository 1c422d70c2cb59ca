mod common;

use axum::http::{Method, StatusCode};
use common::{data, decimal, uuid_of, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn daily_sheet_lists_active_skus_with_expected_quantities() {
    let app = TestApp::new().await;
    let sku_a = app.seed_sku("TAKE-A", "10", "5.00").await;
    app.seed_sku("TAKE-B", "0", "5.00").await;

    // One outbound movement so expected differs from opening.
    app.request_as_actor(
        Method::POST,
        &format!("/api/v1/skus/{}/adjust", uuid_of(&sku_a["id"])),
        Some(json!({ "delta": "-2" })),
    )
    .await;

    let response = app
        .request(Method::GET, "/api/v1/stock-takes/sheet?kind=Daily", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let sheet = data(response).await;
    assert_eq!(sheet["kind"], json!("Daily"));
    assert_eq!(sheet["window_start"], json!("2026-03-10"));
    assert_eq!(sheet["window_end"], json!("2026-03-10"));

    let rows = sheet["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["code"], json!("TAKE-A"));
    assert_eq!(decimal(&rows[0]["expected_quantity"]), dec!(8));
    assert_eq!(decimal(&rows[1]["expected_quantity"]), dec!(0));
}

#[tokio::test]
async fn monthly_sheet_spans_the_calendar_month() {
    let app = TestApp::new().await;
    app.seed_sku("TAKE-C", "3", "5.00").await;

    let response = app
        .request(Method::GET, "/api/v1/stock-takes/sheet?kind=Monthly", None)
        .await;
    let sheet = data(response).await;
    assert_eq!(sheet["window_start"], json!("2026-03-01"));
    assert_eq!(sheet["window_end"], json!("2026-03-31"));
}

#[tokio::test]
async fn recording_counts_stores_differences_without_touching_stock() {
    let app = TestApp::new().await;
    let sku = app.seed_sku("TAKE-D", "10", "5.00").await;
    let sku_id = uuid_of(&sku["id"]);

    let response = app
        .request_as_actor(
            Method::POST,
            "/api/v1/stock-takes",
            Some(json!({
                "kind": "Daily",
                "counts": [{ "sku_id": sku_id, "counted_quantity": "9" }],
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let recorded = data(response).await;
    let recorded = recorded.as_array().unwrap();
    assert_eq!(recorded.len(), 1);
    assert_eq!(decimal(&recorded[0]["expected_quantity"]), dec!(10));
    assert_eq!(decimal(&recorded[0]["counted_quantity"]), dec!(9));
    assert_eq!(decimal(&recorded[0]["difference"]), dec!(-1));
    assert_eq!(recorded[0]["taken_by"], json!("tester"));

    // The count is a snapshot; fixing the shortfall is a separate adjustment.
    let response = app
        .request(Method::GET, &format!("/api/v1/skus/{}", sku_id), None)
        .await;
    assert_eq!(decimal(&data(response).await["quantity_on_hand"]), dec!(10));

    let response = app
        .request(Method::GET, "/api/v1/stock-takes?kind=Daily", None)
        .await;
    assert_eq!(data(response).await["total"], json!(1));
}

#[tokio::test]
async fn counts_are_validated() {
    let app = TestApp::new().await;
    let sku = app.seed_sku("TAKE-E", "10", "5.00").await;
    let sku_id = uuid_of(&sku["id"]);

    let response = app
        .request_as_actor(
            Method::POST,
            "/api/v1/stock-takes",
            Some(json!({ "kind": "Daily", "counts": [] })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request_as_actor(
            Method::POST,
            "/api/v1/stock-takes",
            Some(json!({
                "kind": "Daily",
                "counts": [{ "sku_id": sku_id, "counted_quantity": "-1" }],
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request_as_actor(
            Method::POST,
            "/api/v1/stock-takes",
            Some(json!({
                "kind": "Daily",
                "counts": [{
                    "sku_id": "00000000-0000-0000-0000-000000000001",
                    "counted_quantity": "1"
                }],
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
