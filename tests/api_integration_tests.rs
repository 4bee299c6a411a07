//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use notifier_cache::cache::{Cache, CacheStore, RetryPolicy};
use notifier_cache::models::TrackedEntity;
use notifier_cache::source::MemorySource;
use notifier_cache::tasks::{CacheMonitor, MonitorSettings};
use notifier_cache::{api::create_router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app(characters: Vec<TrackedEntity>) -> (Router, Cache) {
    let cache = Cache::new(Arc::new(CacheStore::new()), RetryPolicy::none());
    let monitor = CacheMonitor::new(
        cache.clone(),
        Arc::new(MemorySource::new(characters)),
        MonitorSettings::default(),
    );
    let app = create_router(AppState::new(cache.clone(), Arc::new(monitor)));
    (app, cache)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

// == GET /cache/:key ==

#[tokio::test]
async fn test_get_cached_value_with_ttl() {
    let (app, cache) = create_test_app(Vec::new());
    cache
        .set("map:system:30000142", json!({"name": "Jita"}), Some(600))
        .await
        .unwrap();

    let response = app.oneshot(get("/cache/map:system:30000142")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["key"], "map:system:30000142");
    assert_eq!(json["pattern"], "map:system");
    assert_eq!(json["value"]["name"], "Jita");
    assert!(json["ttl_remaining"].as_u64().unwrap() <= 600);
}

#[tokio::test]
async fn test_get_tracked_list_defaults_to_empty() {
    let (app, _) = create_test_app(Vec::new());

    let response = app.oneshot(get("/cache/tracked:systems")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["value"], json!([]));
    assert!(json.get("ttl_remaining").is_none());
}

#[tokio::test]
async fn test_get_missing_key_returns_404() {
    let (app, _) = create_test_app(Vec::new());

    let response = app.oneshot(get("/cache/map:character:42")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("map:character:42"));
}

// == DELETE /cache/:key ==

#[tokio::test]
async fn test_delete_then_get() {
    let (app, cache) = create_test_app(Vec::new());
    cache.put("map:character:1", json!({"name": "Alpha"})).await.unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/cache/map:character:1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/cache/map:character:1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_absent_key_is_ok() {
    let (app, _) = create_test_app(Vec::new());

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/cache/map:character:404")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// == POST /monitor/check and GET /stats ==

#[tokio::test]
async fn test_manual_check_then_stats() {
    let characters = vec![
        TrackedEntity::new(95465499i64, "Kael Tor").unwrap(),
        TrackedEntity::new(2112625428i64, "Vexa Lin").unwrap(),
    ];
    let (app, cache) = create_test_app(characters);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/monitor/check")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["outcome"]["status"], "checked");
    assert_eq!(json["outcome"]["missing"], json!(["95465499", "2112625428"]));
    assert_eq!(json["outcome"]["resynced"], true);
    assert_eq!(cache.tracked_characters().await.len(), 2);

    let response = app.oneshot(get("/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["monitor"]["checks_run"], 1);
    assert_eq!(json["monitor"]["total_fixed"], 3);
    assert_eq!(json["cache"]["total_entries"], 5);
}

#[tokio::test]
async fn test_failed_check_returns_bad_gateway() {
    let cache = Cache::new(Arc::new(CacheStore::new()), RetryPolicy::none());
    let source = Arc::new(MemorySource::new(Vec::new()));
    source.set_failure(Some("database offline".into())).await;
    let monitor = CacheMonitor::new(cache.clone(), source, MonitorSettings::default());
    let app = create_router(AppState::new(cache, Arc::new(monitor)));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/monitor/check")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("database offline"));
}

// == GET /health ==

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = create_test_app(Vec::new());

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
}
