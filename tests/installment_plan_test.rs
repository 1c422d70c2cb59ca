mod common;

use axum::http::{Method, StatusCode};
use common::{data, decimal, uuid_of, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

async fn sell_with_plan(app: &TestApp, kind: &str, down: &str, months: i32) -> serde_json::Value {
    let sku = app.seed_sku(&format!("INS-{}-{}", kind, months), "10", "200.00").await;
    let customer = app.seed_customer(&format!("{} plan customer", kind)).await;

    let response = app
        .request_as_actor(
            Method::POST,
            "/api/v1/sales-invoices",
            Some(json!({
                "customer_id": uuid_of(&customer["id"]),
                "lines": [{ "sku_id": uuid_of(&sku["id"]), "quantity": "3", "unit_price": "200.00" }],
                "amount_paid": down,
                "installment": { "kind": kind, "down_payment": down, "months": months },
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    data(response).await
}

#[tokio::test]
async fn standard_plan_opens_with_derived_terms() {
    let app = TestApp::new().await;
    // 600 total, 100 down, 5 months.
    let invoice = sell_with_plan(&app, "Standard", "100.00", 5).await;
    assert_eq!(decimal(&invoice["paid_amount"]), dec!(100.00));
    assert_eq!(invoice["settlement"], json!("Partial"));

    let plan_id = uuid_of(&invoice["installment_plan_id"]);
    let response = app
        .request(Method::GET, &format!("/api/v1/installment-plans/{}", plan_id), None)
        .await;
    let plan = data(response).await;
    assert_eq!(plan["status"], json!("Active"));
    assert_eq!(decimal(&plan["remaining_amount"]), dec!(500.00));
    assert_eq!(plan["months_left"], json!(5));
    assert_eq!(decimal(&plan["monthly_amount"]), dec!(100.00));
    // One calendar month after the pinned clock.
    assert!(plan["next_due_date"]
        .as_str()
        .unwrap()
        .starts_with("2026-04-10T12:00:00"));
}

#[tokio::test]
async fn payments_walk_the_plan_to_completion() {
    let app = TestApp::new().await;
    let invoice = sell_with_plan(&app, "Standard", "100.00", 5).await;
    let plan_id = uuid_of(&invoice["installment_plan_id"]);

    let response = app
        .request_as_actor(
            Method::POST,
            &format!("/api/v1/installment-plans/{}/payments", plan_id),
            Some(json!({ "amount": "100.00", "method": "cash" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let plan = data(response).await;
    assert_eq!(decimal(&plan["remaining_amount"]), dec!(400.00));
    assert_eq!(plan["months_left"], json!(4));
    assert_eq!(decimal(&plan["monthly_amount"]), dec!(100.00));
    assert_eq!(plan["status"], json!("Active"));

    // Overpaying the remainder floors at zero and completes the plan.
    let response = app
        .request_as_actor(
            Method::POST,
            &format!("/api/v1/installment-plans/{}/payments", plan_id),
            Some(json!({ "amount": "450.00" })),
        )
        .await;
    let plan = data(response).await;
    assert_eq!(plan["status"], json!("Completed"));
    assert_eq!(decimal(&plan["remaining_amount"]), dec!(0.00));
    assert!(plan["next_due_date"].is_null());

    // A completed plan no longer accepts payments.
    let response = app
        .request_as_actor(
            Method::POST,
            &format!("/api/v1/installment-plans/{}/payments", plan_id),
            Some(json!({ "amount": "10.00" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Both payments are on record.
    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/installment-plans/{}/payments", plan_id),
            None,
        )
        .await;
    let payments = data(response).await;
    assert_eq!(payments.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn bank_plan_is_settled_by_the_bank_at_creation() {
    let app = TestApp::new().await;
    let invoice = sell_with_plan(&app, "Bank", "100.00", 12).await;
    // The invoice is paid out in full by the bank.
    assert_eq!(decimal(&invoice["paid_amount"]), dec!(600.00));
    assert_eq!(invoice["settlement"], json!("Paid"));

    let plan_id = uuid_of(&invoice["installment_plan_id"]);
    let response = app
        .request(Method::GET, &format!("/api/v1/installment-plans/{}", plan_id), None)
        .await;
    let plan = data(response).await;
    assert_eq!(plan["status"], json!("BankCollected"));
    assert_eq!(decimal(&plan["remaining_amount"]), dec!(0.00));

    // The bank's settlement shows up as one payment record.
    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/installment-plans/{}/payments", plan_id),
            None,
        )
        .await;
    let payments = data(response).await;
    let payments = payments.as_array().unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(decimal(&payments[0]["amount"]), dec!(500.00));
    assert_eq!(payments[0]["method"], json!("bank"));

    // Terminal from creation.
    let response = app
        .request_as_actor(
            Method::POST,
            &format!("/api/v1/installment-plans/{}/payments", plan_id),
            Some(json!({ "amount": "50.00" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn down_payment_must_cover_the_installment_sale() {
    let app = TestApp::new().await;
    let sku = app.seed_sku("INS-SHORT", "10", "200.00").await;
    let customer = app.seed_customer("Short down payer").await;

    // amount_paid below the declared down payment is rejected.
    let response = app
        .request_as_actor(
            Method::POST,
            "/api/v1/sales-invoices",
            Some(json!({
                "customer_id": uuid_of(&customer["id"]),
                "lines": [{ "sku_id": uuid_of(&sku["id"]), "quantity": "3", "unit_price": "200.00" }],
                "amount_paid": "50.00",
                "installment": { "kind": "Standard", "down_payment": "100.00", "months": 5 },
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Down payment above the total is rejected too.
    let response = app
        .request_as_actor(
            Method::POST,
            "/api/v1/sales-invoices",
            Some(json!({
                "customer_id": uuid_of(&customer["id"]),
                "lines": [{ "sku_id": uuid_of(&sku["id"]), "quantity": "1", "unit_price": "200.00" }],
                "amount_paid": "300.00",
                "installment": { "kind": "Standard", "down_payment": "300.00", "months": 5 },
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn plan_listing_filters_by_status() {
    let app = TestApp::new().await;
    let standard = sell_with_plan(&app, "Standard", "100.00", 5).await;
    let bank = sell_with_plan(&app, "Bank", "0.00", 6).await;

    let response = app
        .request(Method::GET, "/api/v1/installment-plans?status=Active", None)
        .await;
    let page = data(response).await;
    assert_eq!(page["total"], json!(1));
    assert_eq!(
        page["items"][0]["id"],
        standard["installment_plan_id"]
    );

    let response = app
        .request(
            Method::GET,
            "/api/v1/installment-plans?status=BankCollected",
            None,
        )
        .await;
    let page = data(response).await;
    assert_eq!(page["items"][0]["id"], bank["installment_plan_id"]);

    // Active plan is due within 60 days of the pinned clock.
    let response = app
        .request(
            Method::GET,
            "/api/v1/installment-plans?due_within_days=60",
            None,
        )
        .await;
    assert_eq!(data(response).await["total"], json!(1));
}
