// GET handlers: version, latest snapshot

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use super::AppState;
use crate::version::{NAME, VERSION};

/// GET /version: returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/snapshot: the most recently published snapshot, as sent on /ws.
/// 204 until the sampler has completed its first tick.
pub(super) async fn latest_snapshot_handler(State(state): State<AppState>) -> Response {
    match state.broadcaster.latest() {
        Some(frame) => (
            [(header::CONTENT_TYPE, "application/json")],
            frame.payload.to_string(),
        )
            .into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}
