// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot, with a
// keyless configuration so nothing reaches the network.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use news_veracity_analyzer::activity::{ActivityKind, ActivityStore, MemoryStore};
use news_veracity_analyzer::api::{create_router, AppState};
use news_veracity_analyzer::config::{AiConfig, AppConfig};

fn keyless_state(store: Arc<MemoryStore>) -> AppState {
    let config = AppConfig {
        ai: AiConfig::default(),
        news_api: None,
        bind_addr: "127.0.0.1:0".to_string(),
        activity_store_path: String::new(),
    };
    AppState::from_config(&config, store)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_answers_ok() {
    let app = create_router(keyless_state(Arc::new(MemoryStore::new())));
    let resp = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn status_reports_keyless_configuration() {
    let app = create_router(keyless_state(Arc::new(MemoryStore::new())));
    let resp = app
        .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    assert_eq!(body["ai_configured"], json!(false));
    assert_eq!(body["news_api_configured"], json!(false));
    assert_eq!(body["rate_limit"]["can_make_request"], json!(true));
    assert_eq!(body["rate_limit"]["max_requests_per_window"], json!(10));
}

#[tokio::test]
async fn verify_without_input_is_invalid() {
    let app = create_router(keyless_state(Arc::new(MemoryStore::new())));
    let resp = app.oneshot(post_json("/verify", json!({}))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    assert_eq!(body["verdict"], json!("Invalid"));
    assert_eq!(body["confidence"], json!(0));
    assert_eq!(body["explanation"], json!("no input provided"));
}

#[tokio::test]
async fn verify_rejects_broken_base64_documents() {
    let app = create_router(keyless_state(Arc::new(MemoryStore::new())));
    let resp = app
        .oneshot(post_json(
            "/verify",
            json!({"document_base64": "!!! not base64 !!!"}),
        ))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["verdict"], json!("Invalid"));
}

#[tokio::test]
async fn verify_increments_the_fact_check_counter() {
    let store = Arc::new(MemoryStore::new());
    let app = create_router(keyless_state(store.clone()));
    let _ = app
        .oneshot(post_json(
            "/verify",
            json!({"text": "Some claim", "user": "alice"}),
        ))
        .await
        .unwrap();
    assert_eq!(store.count("alice", ActivityKind::FactChecksPerformed), 1);
}

#[tokio::test]
async fn summarize_short_text_passes_through_and_counts() {
    let store = Arc::new(MemoryStore::new());
    let app = create_router(keyless_state(store.clone()));
    let resp = app
        .oneshot(post_json(
            "/summarize",
            json!({"text": "Nine words is not enough to summarize anything", "user": "bob"}),
        ))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(
        body["summary"],
        json!("Nine words is not enough to summarize anything")
    );
    assert_eq!(store.count("bob", ActivityKind::SummariesGenerated), 1);
}

#[tokio::test]
async fn sentiment_uses_the_lexical_path_when_ai_is_off() {
    let app = create_router(keyless_state(Arc::new(MemoryStore::new())));
    let resp = app
        .oneshot(post_json(
            "/sentiment",
            json!({"text": "a terrible disaster with many deaths"}),
        ))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["label"], json!("Negative"));
    assert!(body["explanation"]
        .as_str()
        .unwrap()
        .contains("Lexical analysis"));
}

#[tokio::test]
async fn catalog_lists_code_tables() {
    let app = create_router(keyless_state(Arc::new(MemoryStore::new())));
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/catalog")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert!(body["countries"]
        .as_array()
        .unwrap()
        .contains(&json!(["Worldwide", "worldwide"])));
    assert!(body["categories"]
        .as_array()
        .unwrap()
        .contains(&json!(["Business", "business"])));
}

#[tokio::test]
async fn ask_degrades_gracefully_without_a_backend() {
    let app = create_router(keyless_state(Arc::new(MemoryStore::new())));
    let resp = app
        .oneshot(post_json("/ask", json!({"question": "What happened today?"})))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert!(body["answer"]
        .as_str()
        .unwrap()
        .contains("AI service unavailable"));
}
