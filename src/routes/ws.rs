// WebSocket handler: one task per connected dashboard

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::HeaderMap,
    response::IntoResponse,
};
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio::time::{Duration, timeout};

use super::AppState;
use crate::broadcast::Broadcaster;

pub(super) const WS_PING_INTERVAL: Duration = Duration::from_secs(30);
/// Max time to wait for a send before treating the client as dead.
pub(super) const WS_SEND_TIMEOUT: Duration = Duration::from_secs(10);

pub(super) async fn ws_snapshots(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let broadcaster = state.broadcaster.clone();
    let peer = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("direct")
        .to_string();
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = stream_snapshots(socket, broadcaster, peer).await {
            tracing::info!("Snapshot stream error: {}", e);
        }
    })
}

/// Pushes the newest frame whenever the client's mailbox changes. Intermediate
/// frames published while a send is in flight are skipped, never queued.
async fn stream_snapshots(
    socket: WebSocket,
    broadcaster: Broadcaster,
    peer: String,
) -> anyhow::Result<()> {
    let (registration, mut rx) = broadcaster.attach(peer);
    let client_id = registration.id();
    tracing::info!(client_id, "Client connected to snapshot stream");

    let (mut sink, mut incoming) = socket.split();
    let mut ping_interval = tokio::time::interval_at(
        tokio::time::Instant::now() + WS_PING_INTERVAL,
        WS_PING_INTERVAL,
    );
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut last_sent: u64 = 0;

    let result = loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let frame = rx.borrow_and_update().clone();
                let Some(frame) = frame else { continue };
                if frame.generation <= last_sent {
                    continue;
                }
                let r = timeout(
                    WS_SEND_TIMEOUT,
                    sink.send(Message::Text(frame.payload.to_string().into())),
                )
                .await;
                if !matches!(r, Ok(Ok(()))) {
                    break Ok(());
                }
                last_sent = frame.generation;
            }
            _ = ping_interval.tick() => {
                let r = timeout(WS_SEND_TIMEOUT, sink.send(Message::Ping(Bytes::new()))).await;
                if !matches!(r, Ok(Ok(()))) {
                    break Ok(());
                }
            }
            msg = incoming.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break Ok(()),
                    Some(Err(e)) => break Err(e.into()),
                    // Push-only channel; anything the client sends is ignored.
                    Some(Ok(_)) => {}
                }
            }
        }
    };

    drop(registration);
    tracing::info!(client_id, last_sent, "Client disconnected from snapshot stream");
    result
}
