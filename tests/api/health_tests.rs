//! Health and metrics endpoint tests

use axum::http::StatusCode;
use axum_test::TestServer;
use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::common::TestApp;

fn server() -> TestServer {
    TestServer::new(TestApp::new().router).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let response = server().get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_liveness_probe() {
    let response = server().get("/health/live").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn test_readiness_reports_unreachable_database() {
    let response = server().get("/health/ready").await;

    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["checks"]["database"]["status"], "unhealthy");
    assert_eq!(body["checks"]["websocket"]["active_connections"], 0);
    assert_eq!(body["checks"]["websocket"]["active_rooms"], 0);
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_collab_metrics() {
    let response = server().get("/metrics").await;

    response.assert_status_ok();
    assert!(response
        .text()
        .contains("collab_server_websocket_connections_active"));
}
