//! HTTP integration tests driving the storefront router against a seeded in-memory store.

#![allow(clippy::unwrap_used, clippy::panic)]

use autotechno::{
    api::{AppState, create_router},
    config::{AdminConfig, AppConfig, database},
    core::{auth, seed},
};
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use serde_json::{Value, json};
use tower::ServiceExt; // for `oneshot`

async fn create_test_app(admin: AdminConfig) -> Router {
    let db = database::connect("sqlite::memory:").await.unwrap();
    database::create_tables(&db).await.unwrap();
    seed::seed_store(&db).await.unwrap();

    let mut config = AppConfig::default();
    config.store.purchase_settle_ms = 0;

    create_router(AppState::new(db, config, admin))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app(AdminConfig::default()).await;
    let (status, json) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "autotechno");
}

#[tokio::test]
async fn test_list_files_is_paginated() {
    let app = create_test_app(AdminConfig::default()).await;

    let (status, json) = get(&app, "/api/ecu").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 15);
    assert_eq!(json["page"], 1);
    assert_eq!(json["perPage"], 10);
    assert_eq!(json["totalPages"], 2);
    assert_eq!(json["files"].as_array().unwrap().len(), 10);

    let (_, second) = get(&app, "/api/ecu?page=2").await;
    assert_eq!(second["files"].as_array().unwrap().len(), 5);

    let (_, past_end) = get(&app, "/api/ecu?page=9").await;
    assert_eq!(past_end["total"], 15);
    assert!(past_end["files"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_list_files_search_and_filters() {
    let app = create_test_app(AdminConfig::default()).await;

    let (_, turbo) = get(&app, "/api/ecu?search=turbo").await;
    assert_eq!(turbo["total"], 2);

    let (_, original) = get(&app, "/api/ecu?search=turbo&originalOnly=true").await;
    assert_eq!(original["total"], 1);
    assert!(original["files"][0]["isOriginal"].as_bool().unwrap());

    let (_, none) = get(&app, "/api/ecu?search=no-such-file").await;
    assert_eq!(none["total"], 0);
    assert!(none["files"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_list_files_sorts_by_downloads() {
    let app = create_test_app(AdminConfig::default()).await;

    let (status, json) = get(&app, "/api/ecu?sortBy=downloads&sortOrder=desc&perPage=15").await;
    assert_eq!(status, StatusCode::OK);

    let downloads: Vec<i64> = json["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["downloads"].as_i64().unwrap())
        .collect();
    let mut sorted = downloads.clone();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(downloads, sorted);
}

#[tokio::test]
async fn test_list_files_rejects_unknown_sort() {
    let app = create_test_app(AdminConfig::default()).await;

    let (status, json) = get(&app, "/api/ecu?sortBy=colour&sortOrder=sideways").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let fields: Vec<&str> = json["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["sortBy", "sortOrder"]);
}

#[tokio::test]
async fn test_list_files_category_all_means_no_filter() {
    let app = create_test_app(AdminConfig::default()).await;

    for uri in ["/api/ecu?category=all", "/api/ecu?category=All", "/api/ecu?category="] {
        let (status, json) = get(&app, uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(json["total"], 15, "{uri}");
    }

    let (status, json) = get(&app, "/api/ecu?category=performance&perPage=15").await;
    assert_eq!(status, StatusCode::OK);
    let files = json["files"].as_array().unwrap();
    assert!(!files.is_empty());
    assert!(files.iter().all(|f| f["category"] == "performance"));

    let (status, json) = get(&app, "/api/ecu?category=spaceflight").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["errors"][0]["field"], "category");
}

#[tokio::test]
async fn test_malformed_query_string_is_a_json_error() {
    let app = create_test_app(AdminConfig::default()).await;

    let (status, json) = get(&app, "/api/ecu?year=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Please correct the highlighted fields");
    assert_eq!(json["errors"][0]["field"], "query");
    assert!(json["errors"][0]["message"].as_str().unwrap().contains("year"));
}

#[tokio::test]
async fn test_malformed_body_is_a_json_error() {
    let app = create_test_app(AdminConfig::default()).await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/ecu")
        .header("content-type", "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["errors"][0]["field"], "body");
}

#[tokio::test]
async fn test_non_numeric_id_is_a_json_error() {
    let app = create_test_app(AdminConfig::default()).await;

    let (status, json) = get(&app, "/api/ecu/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["errors"][0]["field"], "path");
}

#[tokio::test]
async fn test_create_file_reports_field_errors() {
    let app = create_test_app(AdminConfig::default()).await;

    let (status, json) = post(&app, "/api/ecu", json!({ "price": 10.0 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let fields: Vec<&str> = json["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"title"));
    assert!(fields.contains(&"brandId"));
    assert!(fields.contains(&"description"));
}

#[tokio::test]
async fn test_created_file_is_pending_and_hidden() {
    let app = create_test_app(AdminConfig::default()).await;

    let (status, json) = post(
        &app,
        "/api/ecu",
        json!({
            "title": "Audi S3 2.0 TFSI - Stage 1",
            "description": "Stage 1 remap for the 8V S3",
            "brandId": "audi",
            "category": "performance",
            "year": 2018,
            "price": 129.0,
            "tags": ["stage1", "tfsi"]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["file"]["status"], "pending");
    assert_eq!(json["file"]["priceCents"], 12900);

    let id = json["file"]["id"].as_i64().unwrap();
    let (status, _) = get(&app, &format!("/api/ecu/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = get(&app, "/api/ecu").await;
    assert_eq!(list["total"], 15);
}

#[tokio::test]
async fn test_get_file_with_related() {
    let app = create_test_app(AdminConfig::default()).await;

    let (status, json) = get(&app, "/api/ecu/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["file"]["id"], 1);

    let related = json["related"].as_array().unwrap();
    assert!(related.len() <= 3);
    assert!(related.iter().all(|f| f["id"] != 1));

    let (status, json) = get(&app, "/api/ecu/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "ECU file 999 not found");
}

#[tokio::test]
async fn test_download_counts() {
    let app = create_test_app(AdminConfig::default()).await;

    let (_, before) = get(&app, "/api/ecu/1").await;
    let downloads = before["file"]["downloads"].as_i64().unwrap();

    let (status, json) = post(&app, "/api/ecu/1/download", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["downloads"], downloads + 1);
}

#[tokio::test]
async fn test_catalog_listings() {
    let app = create_test_app(AdminConfig::default()).await;

    let (_, brands) = get(&app, "/api/brands").await;
    assert_eq!(brands.as_array().unwrap().len(), 12);

    let (_, packages) = get(&app, "/api/tokens/packages").await;
    assert_eq!(packages.as_array().unwrap().len(), 4);

    let (_, services) = get(&app, "/api/tokens/services").await;
    assert_eq!(services.as_array().unwrap().len(), 5);

    let (_, methods) = get(&app, "/api/tokens/payment-methods").await;
    let ids: Vec<&str> = methods
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["credit_card", "paypal", "bank_transfer"]);
}

#[tokio::test]
async fn test_login_disabled_without_admin() {
    let app = create_test_app(AdminConfig::default()).await;

    let (status, _) = post(
        &app,
        "/api/auth/login",
        json!({ "email": "admin@example.com", "password": "secret" }),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, json) = post(&app, "/api/auth/login", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["errors"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_login_with_configured_admin() {
    let admin = AdminConfig {
        email: Some("admin@autotechno.test".to_string()),
        name: "Admin User".to_string(),
        password_hash: Some(auth::hash_password("correct horse").unwrap()),
        ..AdminConfig::default()
    };
    let app = create_test_app(admin).await;

    let (status, json) = post(
        &app,
        "/api/auth/login",
        json!({ "email": "Admin@AutoTechno.test", "password": "correct horse" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Login successful");
    assert_eq!(json["user"]["role"], "admin");
    assert!(json["user"].get("password").is_none());

    let (status, wrong_password) = post(
        &app,
        "/api/auth/login",
        json!({ "email": "admin@autotechno.test", "password": "wrong" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, wrong_email) = post(
        &app,
        "/api/auth/login",
        json!({ "email": "someone@autotechno.test", "password": "correct horse" }),
    )
    .await;
    assert_eq!(wrong_password["message"], wrong_email["message"]);

    let (status, _) = post(&app, "/api/auth/logout", json!({})).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_balance_and_transactions() {
    let app = create_test_app(AdminConfig::default()).await;

    let (status, json) = get(&app, "/api/customers/1/balance").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["balance"], 25);

    let (status, page) = get(&app, "/api/customers/1/transactions").await;
    assert_eq!(status, StatusCode::OK);
    let items = page["items"].as_array().unwrap();
    assert!(!items.is_empty());
    assert!(items.iter().all(|t| t["customerId"] == 1));
    let total: i64 = items.iter().map(|t| t["amount"].as_i64().unwrap()).sum();
    assert_eq!(total, 25);

    let (status, _) = get(&app, "/api/customers/404/balance").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_purchase_flow() {
    let app = create_test_app(AdminConfig::default()).await;

    let (_, idle) = get(&app, "/api/customers/1/purchase").await;
    assert_eq!(idle["state"], "idle");

    let (status, _) = post(
        &app,
        "/api/customers/1/purchase/payment-method",
        json!({ "method": "paypal" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, selected) = post(
        &app,
        "/api/customers/1/purchase/package",
        json!({ "packageId": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(selected["state"], "package_selected");
    assert_eq!(selected["package"]["tokens"], 50);

    let (status, _) = post(
        &app,
        "/api/customers/1/purchase/payment-method",
        json!({ "method": "bitcoin" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, method) = post(
        &app,
        "/api/customers/1/purchase/payment-method",
        json!({ "method": "paypal" }),
    )
    .await;
    assert_eq!(method["state"], "payment_method_selected");

    let (status, complete) = post(&app, "/api/customers/1/purchase/confirm", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(complete["state"], "complete");
    assert_eq!(complete["balance"], 75);

    let (_, balance) = get(&app, "/api/customers/1/balance").await;
    assert_eq!(balance["balance"], 75);

    let (_, reset) = post(&app, "/api/customers/1/purchase/reset", json!({})).await;
    assert_eq!(reset["state"], "idle");
}

#[tokio::test]
async fn test_service_usage_debits_tokens() {
    let app = create_test_app(AdminConfig::default()).await;

    let (status, json) = post(&app, "/api/customers/1/services/ecu_decrypt", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["transaction"]["amount"], -2);
    assert_eq!(json["balance"], 23);

    // Rachel Green holds 8 tokens
    let (status, json) = post(&app, "/api/customers/6/services/special_files", json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["message"], "Insufficient tokens: balance is 8, 10 required");

    let (status, _) = post(&app, "/api/customers/1/services/teleport", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_feature_catalog_filters_and_groups() {
    let app = create_test_app(AdminConfig::default()).await;

    let (status, json) = get(&app, "/api/features?perPage=50").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 15);
    assert_eq!(json["sections"].as_array().unwrap().len(), 5);

    let (status, json) = get(&app, "/api/features?status=beta&group=all").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 3);
    assert!(
        json["features"]
            .as_array()
            .unwrap()
            .iter()
            .all(|f| f["status"] == "beta")
    );

    let (_, json) = get(&app, "/api/features?search=email&group=customer-tools").await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["features"][0]["id"], "bulk-email");
    assert_eq!(json["sections"][0]["group"]["name"], "Customer Tools");

    let (status, json) = get(&app, "/api/features?group=marketing&status=retired").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["errors"][0]["field"], "status");
}
