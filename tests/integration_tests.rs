// Integration tests: HTTP and WebSocket endpoints

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use hostpulse::broadcast::Broadcaster;
use hostpulse::registry::ConnectionRegistry;
use hostpulse::routes;
use std::sync::Arc;
use tokio::time::Duration;

fn test_app() -> (axum::Router, Broadcaster) {
    let broadcaster = Broadcaster::new(Arc::new(ConnectionRegistry::new()));
    (routes::app(broadcaster.clone()), broadcaster)
}

/// Build TestServer with http_transport (required for WebSocket tests).
fn test_server_with_http() -> (TestServer, Broadcaster) {
    let (app, broadcaster) = test_app();
    let server = TestServer::builder().http_transport().build(app).unwrap();
    (server, broadcaster)
}

#[tokio::test]
async fn test_root_endpoint() {
    let (app, _) = test_app();
    let server = TestServer::new(app).unwrap();
    let response = server.get("/").await;
    response.assert_status_ok();
    response.assert_text("hostpulse: live host dashboard feed at /ws");
}

#[tokio::test]
async fn test_version_endpoint() {
    let (app, _) = test_app();
    let server = TestServer::new(app).unwrap();
    let response = server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json.get("name").and_then(|v| v.as_str()), Some("hostpulse"));
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_latest_snapshot_empty_before_first_tick() {
    let (app, _) = test_app();
    let server = TestServer::new(app).unwrap();
    server
        .get("/api/snapshot")
        .await
        .assert_status(StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_latest_snapshot_after_publish() {
    let (app, broadcaster) = test_app();
    let server = TestServer::new(app).unwrap();
    broadcaster.publish(&common::sample_snapshot(5)).unwrap();
    let response = server.get("/api/snapshot").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["generation"], 5);
    assert_eq!(json["host"]["hostname"], "testbox");
}

// --- WebSocket message tests (require http_transport + ws feature) ---

async fn receive_json(ws: &mut axum_test::TestWebSocket) -> serde_json::Value {
    let text = tokio::time::timeout(Duration::from_secs(3), ws.receive_text())
        .await
        .expect("timed out waiting for a frame");
    serde_json::from_str(&text).expect("frame is JSON")
}

async fn wait_for_clients(broadcaster: &Broadcaster, n: usize) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
    while broadcaster.client_count() < n {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for client registration"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn test_ws_receives_published_snapshot() {
    let (server, broadcaster) = test_server_with_http();
    let mut ws = server.get_websocket("/ws").await.into_websocket().await;
    wait_for_clients(&broadcaster, 1).await;

    broadcaster.publish(&common::sample_snapshot(1)).unwrap();
    let json = receive_json(&mut ws).await;
    assert_eq!(json["generation"], 1);
    assert_eq!(json["cpu"]["model"], "Test CPU");

    broadcaster.publish(&common::sample_snapshot(2)).unwrap();
    let json = receive_json(&mut ws).await;
    assert_eq!(json["generation"], 2);
}

#[tokio::test]
async fn test_ws_new_client_gets_latest_immediately() {
    let (server, broadcaster) = test_server_with_http();
    broadcaster.publish(&common::sample_snapshot(7)).unwrap();
    let mut ws = server.get_websocket("/ws").await.into_websocket().await;
    let json = receive_json(&mut ws).await;
    assert_eq!(json["generation"], 7);
}

#[tokio::test]
async fn test_ws_every_client_receives_broadcast() {
    let (server, broadcaster) = test_server_with_http();
    let mut a = server.get_websocket("/ws").await.into_websocket().await;
    let mut b = server.get_websocket("/ws").await.into_websocket().await;
    wait_for_clients(&broadcaster, 2).await;

    broadcaster.publish(&common::sample_snapshot(3)).unwrap();
    assert_eq!(receive_json(&mut a).await["generation"], 3);
    assert_eq!(receive_json(&mut b).await["generation"], 3);
}

#[tokio::test]
async fn test_ws_close_unregisters_client() {
    let (server, broadcaster) = test_server_with_http();
    let ws = server.get_websocket("/ws").await.into_websocket().await;
    wait_for_clients(&broadcaster, 1).await;
    ws.close().await;

    let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
    while broadcaster.client_count() > 0 {
        assert!(tokio::time::Instant::now() < deadline, "client never removed");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let report = broadcaster.publish(&common::sample_snapshot(1)).unwrap();
    assert_eq!(report.delivered, 0);
}
