mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, data, decimal, uuid_of, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn health_and_status_answer() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/v1/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let health = data(response).await;
    assert_eq!(health["checks"]["database"], json!("healthy"));

    let response = app.request(Method::GET, "/api/v1/status", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let status = data(response).await;
    assert_eq!(status["status"], json!("ok"));
    assert_eq!(status["service"], json!("shopledger-api"));
}

#[tokio::test]
async fn mutations_require_the_actor_header() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/skus",
            Some(json!({ "code": "HDR-001", "name": "No actor" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("x-actor-id"));

    // A blank header is as bad as a missing one.
    let response = app
        .request_with_headers(
            Method::POST,
            "/api/v1/skus",
            Some(json!({ "code": "HDR-001", "name": "Blank actor" })),
            &[("x-actor-id", "   ")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Reads do not need it.
    let response = app.request(Method::GET, "/api/v1/skus", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn sku_catalog_round_trip() {
    let app = TestApp::new().await;
    let sku = app.seed_sku("CAT-001", "5", "9.99").await;
    let sku_id = uuid_of(&sku["id"]);
    assert_eq!(sku["version"], json!(1));

    // Duplicate codes are rejected.
    let response = app
        .request_as_actor(
            Method::POST,
            "/api/v1/skus",
            Some(json!({ "code": "CAT-001", "name": "Duplicate" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request(Method::GET, "/api/v1/skus/by-code/CAT-001", None)
        .await;
    assert_eq!(uuid_of(&data(response).await["id"]), sku_id);

    // Update bumps the version; a stale version conflicts.
    let response = app
        .request_as_actor(
            Method::PUT,
            &format!("/api/v1/skus/{}", sku_id),
            Some(json!({ "version": 1, "sale_price": "12.50" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = data(response).await;
    assert_eq!(updated["version"], json!(2));
    assert_eq!(decimal(&updated["sale_price"]), dec!(12.50));

    let response = app
        .request_as_actor(
            Method::PUT,
            &format!("/api/v1/skus/{}", sku_id),
            Some(json!({ "version": 1, "sale_price": "13.00" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Deactivation hides the SKU from the default listing.
    let response = app
        .request_as_actor(
            Method::POST,
            &format!("/api/v1/skus/{}/deactivate", sku_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.request(Method::GET, "/api/v1/skus", None).await;
    assert_eq!(data(response).await["total"], json!(0));

    let response = app
        .request(Method::GET, "/api/v1/skus?active_only=false", None)
        .await;
    assert_eq!(data(response).await["total"], json!(1));

    // Deactivating twice is an invalid operation.
    let response = app
        .request_as_actor(
            Method::POST,
            &format!("/api/v1/skus/{}/deactivate", sku_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_resources_return_not_found() {
    let app = TestApp::new().await;
    let missing = "00000000-0000-0000-0000-000000000009";

    for uri in [
        format!("/api/v1/skus/{}", missing),
        format!("/api/v1/sales-invoices/{}", missing),
        format!("/api/v1/purchase-invoices/{}", missing),
        format!("/api/v1/installment-plans/{}", missing),
        format!("/api/v1/returns/{}", missing),
        format!("/api/v1/customers/{}", missing),
        format!("/api/v1/suppliers/{}", missing),
    ] {
        let response = app.request(Method::GET, &uri, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
    }
}

#[tokio::test]
async fn listings_clamp_pagination() {
    let app = TestApp::new().await;
    for i in 0..3 {
        app.seed_sku(&format!("PAGE-{:03}", i), "1", "1.00").await;
    }

    let response = app
        .request(Method::GET, "/api/v1/skus?page=1&limit=2", None)
        .await;
    let page = data(response).await;
    assert_eq!(page["items"].as_array().unwrap().len(), 2);
    assert_eq!(page["total"], json!(3));
    assert_eq!(page["total_pages"], json!(2));

    // Oversized limits clamp to the configured maximum instead of failing.
    let response = app
        .request(Method::GET, "/api/v1/skus?limit=100000", None)
        .await;
    let page = data(response).await;
    assert_eq!(page["limit"], json!(100));
}

#[tokio::test]
async fn party_search_matches_name_or_phone() {
    let app = TestApp::new().await;
    app.seed_customer("Amina Hassan").await;
    let response = app
        .request_as_actor(
            Method::POST,
            "/api/v1/customers",
            Some(json!({ "name": "Omar Said", "phone": "0912-555-777" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(Method::GET, "/api/v1/customers?search=Amina", None)
        .await;
    assert_eq!(data(response).await["total"], json!(1));

    let response = app
        .request(Method::GET, "/api/v1/customers?search=555-777", None)
        .await;
    let page = data(response).await;
    assert_eq!(page["total"], json!(1));
    assert_eq!(page["items"][0]["name"], json!("Omar Said"));
}
