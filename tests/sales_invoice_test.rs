mod common;

use axum::http::{Method, StatusCode};
use common::{data, decimal, uuid_of, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn paid_in_full_sale_moves_stock_and_settles() {
    let app = TestApp::new().await;
    let sku = app.seed_sku("SAL-001", "10", "50.00").await;
    let sku_id = uuid_of(&sku["id"]);
    let customer = app.seed_customer("Walk-in customer").await;
    let customer_id = uuid_of(&customer["id"]);

    let response = app
        .request_as_actor(
            Method::POST,
            "/api/v1/sales-invoices",
            Some(json!({
                "customer_id": customer_id,
                "lines": [{ "sku_id": sku_id, "quantity": "3", "unit_price": "50.00" }],
                "amount_paid": "150.00",
                "payment_method": "cash",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let invoice = data(response).await;
    assert_eq!(decimal(&invoice["total_amount"]), dec!(150.00));
    assert_eq!(decimal(&invoice["paid_amount"]), dec!(150.00));
    assert_eq!(decimal(&invoice["balance"]), dec!(0.00));
    assert_eq!(invoice["settlement"], json!("Paid"));
    // Numbering derives from the pinned clock date.
    assert_eq!(invoice["invoice_number"], json!("202603100001"));

    let response = app
        .request(Method::GET, &format!("/api/v1/skus/{}", sku_id), None)
        .await;
    assert_eq!(decimal(&data(response).await["quantity_on_hand"]), dec!(7));

    // Fully paid sale leaves the customer's receivable untouched.
    let response = app
        .request(Method::GET, &format!("/api/v1/customers/{}", customer_id), None)
        .await;
    assert_eq!(decimal(&data(response).await["balance"]), dec!(0));
}

#[tokio::test]
async fn underpayment_rejects_and_persists_nothing() {
    let app = TestApp::new().await;
    let sku = app.seed_sku("SAL-002", "10", "50.00").await;
    let sku_id = uuid_of(&sku["id"]);
    let customer = app.seed_customer("Short payer").await;
    let customer_id = uuid_of(&customer["id"]);

    let response = app
        .request_as_actor(
            Method::POST,
            "/api/v1/sales-invoices",
            Some(json!({
                "customer_id": customer_id,
                "lines": [{ "sku_id": sku_id, "quantity": "3", "unit_price": "50.00" }],
                "amount_paid": "100.00",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Stock untouched, no invoice on record.
    let response = app
        .request(Method::GET, &format!("/api/v1/skus/{}", sku_id), None)
        .await;
    assert_eq!(decimal(&data(response).await["quantity_on_hand"]), dec!(10));

    let response = app.request(Method::GET, "/api/v1/sales-invoices", None).await;
    let listing = data(response).await;
    assert_eq!(listing["total"], json!(0));
}

#[tokio::test]
async fn invoice_numbers_increment_within_the_day() {
    let app = TestApp::new().await;
    let sku = app.seed_sku("SAL-003", "20", "10.00").await;
    let sku_id = uuid_of(&sku["id"]);
    let customer = app.seed_customer("Repeat customer").await;
    let customer_id = uuid_of(&customer["id"]);

    for expected_number in ["202603100001", "202603100002", "202603100003"] {
        let response = app
            .request_as_actor(
                Method::POST,
                "/api/v1/sales-invoices",
                Some(json!({
                    "customer_id": customer_id,
                    "lines": [{ "sku_id": sku_id, "quantity": "1", "unit_price": "10.00" }],
                    "amount_paid": "10.00",
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let invoice = data(response).await;
        assert_eq!(invoice["invoice_number"], json!(expected_number));
    }
}

#[tokio::test]
async fn multi_line_invoice_reports_line_totals() {
    let app = TestApp::new().await;
    let sku_a = app.seed_sku("SAL-004A", "10", "10.00").await;
    let sku_b = app.seed_sku("SAL-004B", "10", "7.50").await;
    let customer = app.seed_customer("Basket customer").await;

    let response = app
        .request_as_actor(
            Method::POST,
            "/api/v1/sales-invoices",
            Some(json!({
                "customer_id": uuid_of(&customer["id"]),
                "lines": [
                    { "sku_id": uuid_of(&sku_a["id"]), "quantity": "2", "unit_price": "10.00" },
                    { "sku_id": uuid_of(&sku_b["id"]), "quantity": "4", "unit_price": "7.50" },
                ],
                "amount_paid": "50.00",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let invoice = data(response).await;
    assert_eq!(decimal(&invoice["total_amount"]), dec!(50.00));

    let invoice_id = uuid_of(&invoice["id"]);
    let response = app
        .request(Method::GET, &format!("/api/v1/sales-invoices/{}", invoice_id), None)
        .await;
    let fetched = data(response).await;
    assert_eq!(decimal(&fetched["balance"]), dec!(0));
    assert_eq!(fetched["settlement"], json!("Paid"));
    let lines = fetched["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 2);
    let line_sum: rust_decimal::Decimal = lines.iter().map(|l| decimal(&l["line_total"])).sum();
    assert_eq!(line_sum, dec!(50.00));
}

#[tokio::test]
async fn listing_folds_totals_over_the_filter() {
    let app = TestApp::new().await;
    let sku = app.seed_sku("SAL-005", "20", "10.00").await;
    let sku_id = uuid_of(&sku["id"]);
    let customer = app.seed_customer("Totals customer").await;
    let customer_id = uuid_of(&customer["id"]);

    for _ in 0..2 {
        let response = app
            .request_as_actor(
                Method::POST,
                "/api/v1/sales-invoices",
                Some(json!({
                    "customer_id": customer_id,
                    "lines": [{ "sku_id": sku_id, "quantity": "2", "unit_price": "10.00" }],
                    "amount_paid": "20.00",
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .request(
            Method::GET,
            "/api/v1/sales-invoices?from=2026-03-10&to=2026-03-10",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let listing = data(response).await;
    assert_eq!(listing["total"], json!(2));
    assert_eq!(decimal(&listing["totals"]["gross"]), dec!(40.00));
    assert_eq!(decimal(&listing["totals"]["paid"]), dec!(40.00));
    assert_eq!(decimal(&listing["totals"]["outstanding"]), dec!(0.00));

    // A window before the pinned day is empty.
    let response = app
        .request(
            Method::GET,
            "/api/v1/sales-invoices?from=2026-03-01&to=2026-03-09",
            None,
        )
        .await;
    let listing = data(response).await;
    assert_eq!(listing["total"], json!(0));
}

#[tokio::test]
async fn selling_an_unknown_or_deactivated_sku_fails() {
    let app = TestApp::new().await;
    let customer = app.seed_customer("Ghost buyer").await;
    let customer_id = uuid_of(&customer["id"]);

    let response = app
        .request_as_actor(
            Method::POST,
            "/api/v1/sales-invoices",
            Some(json!({
                "customer_id": customer_id,
                "lines": [{
                    "sku_id": "00000000-0000-0000-0000-000000000001",
                    "quantity": "1",
                    "unit_price": "5.00"
                }],
                "amount_paid": "5.00",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let sku = app.seed_sku("SAL-006", "5", "5.00").await;
    let sku_id = uuid_of(&sku["id"]);
    let response = app
        .request_as_actor(
            Method::POST,
            &format!("/api/v1/skus/{}/deactivate", sku_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request_as_actor(
            Method::POST,
            "/api/v1/sales-invoices",
            Some(json!({
                "customer_id": customer_id,
                "lines": [{ "sku_id": sku_id, "quantity": "1", "unit_price": "5.00" }],
                "amount_paid": "5.00",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
