//! `WebSocket` handler for real-time event streaming.
//!
//! Clients connect to `GET /ws`. Each connection owns a bounded queue that
//! is registered with the station's broadcast hub as an observer sink; the
//! connection task drains that queue into the socket. Inbound frames are
//! ignored except for close and ping, which only serve to detect
//! disconnects.
//!
//! The hub never waits on the socket: if a client falls
//! [`OBSERVER_QUEUE_CAPACITY`] events behind, further events are dropped
//! for that client until it catches up.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::mpsc;
use tracing::debug;

use crate::state::{AppState, OBSERVER_QUEUE_CAPACITY};

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming station events.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_events(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Handle the `WebSocket` lifecycle: register with the hub, forward
/// queued events, unregister on disconnect.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let hub = Arc::clone(state.station.hub());
    let (tx, mut rx) = mpsc::channel::<String>(OBSERVER_QUEUE_CAPACITY);
    let observer_id = hub.register(Arc::new(tx)).await;
    debug!(%observer_id, "WebSocket client connected");

    loop {
        tokio::select! {
            // Forward the next queued event.
            outgoing = rx.recv() => {
                let Some(payload) = outgoing else {
                    debug!(%observer_id, "Observer queue closed");
                    break;
                };
                if socket.send(Message::Text(payload.into())).await.is_err() {
                    debug!(%observer_id, "WebSocket client disconnected (send failed)");
                    break;
                }
            }
            // Watch the client side for disconnects.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(%observer_id, "WebSocket client disconnected");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!(%observer_id, "WebSocket client disconnected (pong failed)");
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(%observer_id, "WebSocket error: {e}");
                        break;
                    }
                    _ => {
                        // Inbound text/binary is not used.
                    }
                }
            }
        }
    }

    hub.unregister(observer_id).await;
}
