//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use compcache::{api::create_router, AppState, Cache, CacheConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> Router {
    create_router(AppState::new(Cache::default()))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

// == SET / GET ==

#[tokio::test]
async fn test_set_and_get_json_value() {
    let app = create_test_app();
    let value = json!({"id": 42, "roles": ["admin", "auditor"]});

    let (status, body) = send(
        &app,
        json_request("PUT", "/set", json!({"key": "user:42", "value": value.clone()})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("user:42"));

    let (status, body) = send(&app, empty_request("GET", "/get/user:42")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], value);
}

#[tokio::test]
async fn test_large_value_roundtrips_through_compression() {
    let app = create_test_app();
    let text = "the quick brown fox ".repeat(500);

    send(
        &app,
        json_request("PUT", "/set", json!({"key": "doc", "value": text.clone()})),
    )
    .await;

    let (_, body) = send(&app, empty_request("GET", "/get/doc")).await;
    assert_eq!(body["value"], json!(text));

    let (_, stats) = send(&app, empty_request("GET", "/stats")).await;
    assert!(stats["compression_ratio"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_set_empty_key_rejected() {
    let app = create_test_app();

    let (status, body) = send(
        &app,
        json_request("PUT", "/set", json!({"key": "", "value": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("error").is_some());
}

#[tokio::test]
async fn test_get_missing_key() {
    let app = create_test_app();

    let (status, body) = send(&app, empty_request("GET", "/get/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("nope"));
}

#[tokio::test]
async fn test_ttl_expiry_over_http() {
    let app = create_test_app();

    send(
        &app,
        json_request("PUT", "/set", json!({"key": "short", "value": "v", "ttl": 1})),
    )
    .await;
    let (status, _) = send(&app, empty_request("GET", "/get/short")).await;
    assert_eq!(status, StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(1100)).await;

    let (status, _) = send(&app, empty_request("GET", "/get/short")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, stats) = send(&app, empty_request("GET", "/stats")).await;
    assert_eq!(stats["store"]["entry_count"], 0);
    assert_eq!(stats["expirations"], 1);
}

// == MGET ==

#[tokio::test]
async fn test_mget() {
    let app = create_test_app();
    send(
        &app,
        json_request("PUT", "/set", json!({"key": "a", "value": 1})),
    )
    .await;

    let (status, body) = send(
        &app,
        json_request("POST", "/mget", json!({"keys": ["a", "b"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["results"],
        json!([{"key": "a", "value": 1}, {"key": "b", "value": null}])
    );
}

// == DELETE ==

#[tokio::test]
async fn test_delete_endpoint() {
    let app = create_test_app();
    send(
        &app,
        json_request("PUT", "/set", json!({"key": "gone", "value": true})),
    )
    .await;

    let (status, _) = send(&app, empty_request("DELETE", "/del/gone")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, empty_request("DELETE", "/del/gone")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_pattern_endpoint() {
    let app = create_test_app();
    for key in ["a:1", "a:2", "b:1"] {
        send(
            &app,
            json_request("PUT", "/set", json!({"key": key, "value": key})),
        )
        .await;
    }

    let (status, body) = send(
        &app,
        json_request("POST", "/delete-pattern", json!({"pattern": "^a:"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 2);

    let (status, body) = send(&app, empty_request("GET", "/get/b:1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], "b:1");
}

#[tokio::test]
async fn test_delete_pattern_invalid_regex() {
    let app = create_test_app();
    send(
        &app,
        json_request("PUT", "/set", json!({"key": "a:1", "value": 1})),
    )
    .await;

    let (status, _) = send(
        &app,
        json_request("POST", "/delete-pattern", json!({"pattern": "a:("})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, empty_request("GET", "/get/a:1")).await;
    assert_eq!(status, StatusCode::OK);
}

// == STATS / CLEAR ==

#[tokio::test]
async fn test_stats_hit_rate() {
    let app = create_test_app();
    send(
        &app,
        json_request("PUT", "/set", json!({"key": "k", "value": 1})),
    )
    .await;

    for _ in 0..3 {
        send(&app, empty_request("GET", "/get/k")).await;
    }
    send(&app, empty_request("GET", "/get/missing")).await;

    let (status, stats) = send(&app, empty_request("GET", "/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["hits"], 3);
    assert_eq!(stats["misses"], 1);
    assert_eq!(stats["hit_rate"], 0.75);
    assert_eq!(stats["top_keys"][0]["key"], "k");
    assert_eq!(stats["top_keys"][0]["access_count"], 3);
}

#[tokio::test]
async fn test_clear_resets_stats() {
    let app = create_test_app();
    send(
        &app,
        json_request("PUT", "/set", json!({"key": "k", "value": 1})),
    )
    .await;
    send(&app, empty_request("GET", "/get/k")).await;

    let (status, _) = send(&app, empty_request("POST", "/clear")).await;
    assert_eq!(status, StatusCode::OK);

    let (_, stats) = send(&app, empty_request("GET", "/stats")).await;
    assert_eq!(stats["hits"], 0);
    assert_eq!(stats["misses"], 0);
    assert_eq!(stats["store"]["entry_count"], 0);
    assert_eq!(stats["store"]["total_size"], 0);
}

#[tokio::test]
async fn test_evictions_reported() {
    let cache = Cache::new(CacheConfig {
        max_entries: 2,
        ..Default::default()
    });
    let app = create_router(AppState::new(cache));

    for key in ["a", "b", "c"] {
        send(
            &app,
            json_request("PUT", "/set", json!({"key": key, "value": 0})),
        )
        .await;
    }

    let (_, stats) = send(&app, empty_request("GET", "/stats")).await;
    assert_eq!(stats["evictions"], 1);
    assert_eq!(stats["store"]["entry_count"], 2);
}

// == HEALTH ==

#[tokio::test]
async fn test_health_reports_low_hit_rate() {
    let app = create_test_app();
    send(&app, empty_request("GET", "/get/missing")).await;

    let (status, body) = send(&app, empty_request("GET", "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "warning");
    assert_eq!(body["issues"].as_array().unwrap().len(), 1);
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 1);
    assert!(body.get("timestamp").is_some());
}
