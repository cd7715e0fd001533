//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint against in-memory stores.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use store_probe::{
    create_router,
    db::{DatabaseSummary, Item, ItemStore, MemoryItemStore, NewItem},
    kv::{KvBackend, MemoryKv},
    AppError, AppState, Result,
};
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> Router {
    create_router(AppState::in_memory())
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

fn down() -> AppError {
    AppError::Internal("Connection refused (os error 111)".to_string())
}

/// Relational store whose every call fails.
struct DownItemStore;

#[async_trait]
impl ItemStore for DownItemStore {
    async fn bootstrap(&self) -> Result<()> {
        Err(down())
    }
    async fn list(&self) -> Result<Vec<Item>> {
        Err(down())
    }
    async fn create(&self, _item: NewItem) -> Result<Item> {
        Err(down())
    }
    async fn delete(&self, _id: i32) -> Result<Option<Item>> {
        Err(down())
    }
    async fn summary(&self) -> Result<DatabaseSummary> {
        Err(down())
    }
}

/// Key-value backend whose every call fails.
struct DownKv;

#[async_trait]
impl KvBackend for DownKv {
    async fn scan(&self, _cursor: u64, _pattern: &str, _count: usize) -> Result<(u64, Vec<String>)> {
        Err(down())
    }
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(down())
    }
    async fn ttl(&self, _key: &str) -> Result<i64> {
        Err(down())
    }
    async fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(down())
    }
    async fn set_ex(&self, _key: &str, _value: &str, _seconds: u64) -> Result<()> {
        Err(down())
    }
    async fn del(&self, _key: &str) -> Result<u64> {
        Err(down())
    }
    async fn ping(&self) -> Result<String> {
        Err(down())
    }
    async fn dbsize(&self) -> Result<u64> {
        Err(down())
    }
    async fn info(&self) -> Result<String> {
        Err(down())
    }
}

fn create_down_app() -> Router {
    create_router(AppState::new(Arc::new(DownItemStore), Arc::new(DownKv)))
}

// == Items Endpoint Tests ==

#[tokio::test]
async fn test_item_lifecycle() {
    let app = create_test_app();

    let (status, json) = send(
        &app,
        "POST",
        "/items",
        Some(r#"{"name":"widget","description":"x"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["item"]["id"], 1);
    assert_eq!(json["item"]["name"], "widget");
    assert_eq!(json["item"]["description"], "x");
    assert!(json["item"]["created_at"].is_string());

    let (status, json) = send(&app, "GET", "/items", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["items"].as_array().unwrap().len(), 1);
    assert_eq!(json["items"][0]["id"], 1);

    let (status, json) = send(&app, "DELETE", "/items/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["deleted"]["id"], 1);
    assert_eq!(json["deleted"]["name"], "widget");

    let (status, json) = send(&app, "DELETE", "/items/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Item not found");

    let (_, json) = send(&app, "GET", "/items", None).await;
    assert!(json["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_items_listed_newest_first_with_fresh_ids() {
    let app = create_test_app();

    for name in ["a", "b", "c"] {
        let body = format!(r#"{{"name":"{}"}}"#, name);
        let (status, _) = send(&app, "POST", "/items", Some(&body)).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, json) = send(&app, "GET", "/items", None).await;
    let ids: Vec<i64> = json["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![3, 2, 1]);
    assert!(json["items"][0]["description"].is_null());
}

#[tokio::test]
async fn test_create_item_missing_name() {
    let app = create_test_app();

    let (status, json) = send(&app, "POST", "/items", Some(r#"{"description":"x"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Name is required");
}

#[tokio::test]
async fn test_delete_item_never_issued() {
    let app = create_test_app();

    let (status, json) = send(&app, "DELETE", "/items/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Item not found");
}

#[tokio::test]
async fn test_delete_item_non_numeric_id() {
    let app = create_test_app();

    let (status, json) = send(&app, "DELETE", "/items/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json.get("error").is_some());
}

// == Redis Endpoint Tests ==

#[tokio::test]
async fn test_key_lifecycle() {
    let app = create_test_app();

    let (status, json) = send(
        &app,
        "POST",
        "/redis",
        Some(r#"{"key":"a","value":"1","ttl":60}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["key"], "test:a");
    assert_eq!(json["value"], "1");

    let (status, json) = send(&app, "GET", "/redis", None).await;
    assert_eq!(status, StatusCode::OK);
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["key"], "test:a");
    assert_eq!(items[0]["value"], "1");
    let ttl = items[0]["ttl"].as_i64().unwrap();
    assert!(ttl > 0 && ttl <= 60);

    let (status, json) = send(&app, "DELETE", "/redis/test:a", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let (_, json) = send(&app, "GET", "/redis", None).await;
    assert!(json["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_set_without_ttl_reports_no_expiry() {
    let app = create_test_app();

    send(&app, "POST", "/redis", Some(r#"{"key":"plain","value":"v"}"#)).await;

    let (_, json) = send(&app, "GET", "/redis", None).await;
    assert_eq!(json["items"][0]["ttl"], -1);
}

#[tokio::test]
async fn test_set_already_prefixed_key_not_doubled() {
    let app = create_test_app();

    let (_, json) = send(&app, "POST", "/redis", Some(r#"{"key":"test:b","value":"v"}"#)).await;
    assert_eq!(json["key"], "test:b");
}

#[tokio::test]
async fn test_set_rejects_missing_key_or_value() {
    let app = create_test_app();

    for body in [
        r#"{"value":"v"}"#,
        r#"{"key":"","value":"v"}"#,
        r#"{"key":"k","value":""}"#,
        r#"{"key":"k"}"#,
    ] {
        let (status, json) = send(&app, "POST", "/redis", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {}", body);
        assert!(json.get("error").is_some());
    }

    let (_, json) = send(&app, "GET", "/redis", None).await;
    assert!(json["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_missing_key_is_success() {
    let app = create_test_app();

    let (status, json) = send(&app, "DELETE", "/redis/test:never", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
}

#[tokio::test]
async fn test_undecodable_path_is_json_400() {
    let app = create_test_app();

    for uri in ["/redis/%FF", "/items/%FF"] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let json = body_to_json(response.into_body()).await;
        assert!(json["error"].as_str().unwrap().contains("UTF-8"));
    }
}

#[tokio::test]
async fn test_delete_percent_encoded_key() {
    let app = create_test_app();

    send(&app, "POST", "/redis", Some(r#"{"key":"with space","value":"v"}"#)).await;

    let (status, _) = send(&app, "DELETE", "/redis/test%3Awith%20space", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send(&app, "GET", "/redis", None).await;
    assert!(json["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_blank_key_rejected() {
    let app = create_test_app();

    let (status, json) = send(&app, "DELETE", "/redis/%20%20", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_listing_ignores_foreign_keys() {
    let kv = Arc::new(MemoryKv::new());
    kv.set("other:x", "1").await.unwrap();
    let app = create_router(AppState::new(Arc::new(MemoryItemStore::new()), kv));

    send(&app, "POST", "/redis", Some(r#"{"key":"mine","value":"2"}"#)).await;

    let (_, json) = send(&app, "GET", "/redis", None).await;
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["key"], "test:mine");
}

// == Diagnostics Endpoint Tests ==

#[tokio::test]
async fn test_db_info_connected() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/db-info", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["connected"], true);
    assert!(json["version"].is_string());
    assert!(json["tables"].is_array());
    assert!(json["databaseSize"].is_string());
}

#[tokio::test]
async fn test_redis_info_connected() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/redis-info", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["connected"], true);
    assert_eq!(json["ping"], "PONG");
    assert_eq!(json["dbSize"], 0);
    assert!(json["info"].is_string());
}

// == Store Failure Tests ==

#[tokio::test]
async fn test_diagnostics_report_disconnected() {
    let app = create_down_app();

    for uri in ["/db-info", "/redis-info"] {
        let (status, json) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
        assert_eq!(json["connected"], false);
        assert_eq!(json["error"], "Connection refused (os error 111)");
    }
}

#[tokio::test]
async fn test_store_errors_are_500_envelopes() {
    let app = create_down_app();

    let cases = [
        ("GET", "/items", None),
        ("POST", "/items", Some(r#"{"name":"w"}"#)),
        ("DELETE", "/items/1", None),
        ("GET", "/redis", None),
        ("POST", "/redis", Some(r#"{"key":"a","value":"1"}"#)),
        ("DELETE", "/redis/a", None),
    ];

    for (method, uri, body) in cases {
        let (status, json) = send(&app, method, uri, body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{} {}", method, uri);
        assert_eq!(json["error"], "Connection refused (os error 111)");
    }
}

#[tokio::test]
async fn test_validation_precedes_store_calls() {
    let app = create_down_app();

    let (status, _) = send(&app, "POST", "/redis", Some(r#"{"key":"","value":"v"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "POST", "/items", Some(r#"{"name":""}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// == Error Response Tests ==

#[tokio::test]
async fn test_invalid_json_request() {
    let app = create_test_app();

    let (status, json) = send(&app, "POST", "/redis", Some(r#"{"invalid json"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_responses_disable_caching() {
    let app = create_test_app();

    for uri in ["/items", "/redis", "/db-info", "/redis-info"] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let cache_control = response.headers()[header::CACHE_CONTROL].to_str().unwrap();
        assert!(cache_control.contains("no-store"), "{}", uri);
        assert!(cache_control.contains("no-cache"), "{}", uri);
    }
}

// == Health Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}
