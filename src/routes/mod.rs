// HTTP + WebSocket routes

mod http;
mod ws;

use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};

use crate::broadcast::Broadcaster;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) broadcaster: Broadcaster,
}

pub fn app(broadcaster: Broadcaster) -> Router {
    let state = AppState { broadcaster };
    Router::new()
        .route("/", get(|| async { "hostpulse: live host dashboard feed at /ws" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/snapshot", get(http::latest_snapshot_handler)) // GET /api/snapshot
        .route("/ws", get(ws::ws_snapshots)) // WS /ws
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
