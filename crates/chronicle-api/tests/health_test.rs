//! Integration tests for the health endpoint and cross-cutting middleware.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};

#[tokio::test]
async fn test_health_returns_200_with_status_ok() {
    let (app, _) = common::build_test_app(&[]);

    let (status, json) = common::get_json(app, "/health", "alice").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let (app, _) = common::build_test_app(&[]);

    let (status, _) = common::get_json(app, "/api/v1/nonexistent", "alice").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_correlation_id_is_echoed_and_stamped_on_errors() {
    // Arrange
    let (app, _) = common::build_test_app(&[]);
    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/story-root")
        .header("x-correlation-id", "corr-abc")
        .body(Body::empty())
        .unwrap();

    // Act
    let (status, headers, json) = common::send(app, request).await;

    // Assert
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(headers["x-correlation-id"], "corr-abc");
    assert_eq!(json["correlation_id"], "corr-abc");
}
