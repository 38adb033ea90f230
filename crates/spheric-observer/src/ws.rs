//! `WebSocket` handler for real-time per-face change-set streaming.
//!
//! Clients connect to `GET /ws/faces/{face}` and receive a JSON-encoded
//! [`ChangeSet`](spheric_types::ChangeSet) each time the engine completes
//! a tick for that face. All clients subscribed to the same face see the
//! same stream; a client on face 3 never receives traffic for face 17.
//!
//! If a client falls behind, lagged change-sets are silently skipped
//! and the client resumes from the most recent one.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tracing::{debug, warn};

use crate::error::ObserverError;
use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming change-sets for the requested face.
///
/// # Route
///
/// `GET /ws/faces/{face}`
///
/// # Errors
///
/// Returns [`ObserverError::InvalidQuery`] if `face` is not `0..30`.
pub async fn ws_face(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(face): Path<u8>,
) -> Result<impl IntoResponse, ObserverError> {
    let rx = state
        .subscribe_face(face)
        .ok_or_else(|| ObserverError::InvalidQuery(format!("face {face} is out of range")))?;

    Ok(ws.on_upgrade(move |socket| handle_ws(socket, face, rx)))
}

/// Handle the `WebSocket` lifecycle: forward each change-set on `rx` as
/// a text frame until the client disconnects.
async fn handle_ws(
    mut socket: WebSocket,
    face: u8,
    mut rx: tokio::sync::broadcast::Receiver<spheric_types::ChangeSet>,
) {
    debug!(face, "WebSocket client connected");

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(changeset) => {
                        let json = match serde_json::to_string(&changeset) {
                            Ok(j) => j,
                            Err(e) => {
                                warn!("Failed to serialize change-set: {e}");
                                continue;
                            }
                        };
                        let msg: Message = Message::Text(json.into());
                        if socket.send(msg).await.is_err() {
                            debug!(face, "WebSocket client disconnected (send failed)");
                            return;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        debug!(face, skipped = n, "WebSocket client lagged, skipping ahead");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        debug!(face, "Broadcast channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(face, "WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let pong = Message::Pong(data);
                        if socket.send(pong).await.is_err() {
                            debug!(face, "WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(face, "WebSocket error: {e}");
                        return;
                    }
                    _ => {
                        // Ignore other message types (text, binary from client).
                    }
                }
            }
        }
    }
}
