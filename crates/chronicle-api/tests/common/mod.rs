//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use chronicle_blob_store::InMemoryBlobStore;
use chronicle_core::completion::CompletionEngine;
use chronicle_core::storage::BlobStore;
use chronicle_proposals::EmbeddedTemplateProvider;
use chronicle_test_support::{
    ScriptedCompletionEngine, SequenceVersionIds, SteppingClock, fixed_time,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use chronicle_api::app;
use chronicle_api::state::AppState;

/// Build the full app router over `blobs` and `engine` with a deterministic
/// clock and version ids. Uses the same router as `main.rs`.
pub fn build_test_app_with(
    blobs: Arc<dyn BlobStore>,
    engine: Arc<dyn CompletionEngine>,
) -> Router {
    let state = AppState::new(
        blobs,
        Arc::new(SteppingClock::starting_at(fixed_time())),
        Arc::new(SequenceVersionIds::new()),
        Arc::new(EmbeddedTemplateProvider),
        engine,
        Some("Testing".to_owned()),
    );
    app(state)
}

/// Build the full app over a fresh in-memory blob store and an engine that
/// replays `responses` in order.
pub fn build_test_app(responses: &[&str]) -> (Router, Arc<ScriptedCompletionEngine>) {
    let engine = Arc::new(ScriptedCompletionEngine::new(responses.iter().copied()));
    let app = build_test_app_with(Arc::new(InMemoryBlobStore::new()), engine.clone());
    (app, engine)
}

/// Send `request` and return status, headers and JSON body (null if empty).
pub async fn send(
    app: Router,
    request: Request<Body>,
) -> (StatusCode, HeaderMap, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body_bytes).unwrap_or(serde_json::Value::Null);

    (status, headers, json)
}

/// Send a POST request with a JSON body as `user` and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    user: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-user-id", user)
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let (status, _, json) = send(app, request).await;
    (status, json)
}

/// Send a GET request as `user` and return the response.
pub async fn get_json(app: Router, uri: &str, user: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .header("x-user-id", user)
        .body(Body::empty())
        .unwrap();

    let (status, _, json) = send(app, request).await;
    (status, json)
}
