//! WebSocket upgrade handler and per-connection event loop.
//!
//! Each connection gets a registry entry and a bounded outbound queue. A
//! forward task drains the queue into the socket while the main loop
//! dispatches incoming frames. Malformed frames are ignored; well-formed
//! frames carrying a bad session id get an `error` event back. Within one
//! connection, frames are processed in arrival order.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt, stream::SplitSink};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::protocol::{ClientMessage, ServerMessage, validate_session_id};
use crate::registry::{JoinRefusal, PEER_QUEUE_DEPTH, PeerHandle, SessionRegistry};

/// Shared state for WebSocket handlers.
#[derive(Clone)]
pub struct RelayState {
    pub registry: Arc<SessionRegistry>,
    /// Frames larger than this are discarded without parsing.
    pub max_frame_bytes: usize,
}

/// GET /ws — WebSocket upgrade handler.
pub async fn ws_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<RelayState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle a single peer connection from accept to disconnect.
async fn handle_socket(socket: WebSocket, state: RelayState) {
    let (mut sink, mut stream) = socket.split();

    let (tx, mut rx) = mpsc::channel::<ServerMessage>(PEER_QUEUE_DEPTH);
    let peer = state.registry.register(tx).await;
    let peer_id = peer.peer_id.clone();

    // Drain the outbound queue into the socket.
    let forward_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_send(&mut sink, &msg).await.is_err() {
                break; // Client disconnected.
            }
        }
    });

    while let Some(Ok(msg)) = stream.next().await {
        match msg {
            Message::Text(text) => {
                handle_frame(&state, &peer, text.as_str()).await;
            }
            Message::Close(_) => break,
            _ => {} // Ignore binary, ping, pong.
        }
    }

    state.registry.unregister(&peer_id).await;
    forward_task.abort();
    info!(peer_id = %peer_id, "Connection closed");
}

/// Dispatch one text frame from a peer.
async fn handle_frame(state: &RelayState, peer: &PeerHandle, text: &str) {
    if text.len() > state.max_frame_bytes {
        debug!(peer_id = %peer.peer_id, len = text.len(), "Discarding oversized frame");
        return;
    }

    let Ok(msg) = serde_json::from_str::<ClientMessage>(text) else {
        debug!(peer_id = %peer.peer_id, "Ignoring malformed frame");
        return;
    };

    match msg {
        ClientMessage::JoinSession { session_id } => {
            if let Err(reason) = validate_session_id(&session_id) {
                peer.try_deliver(ServerMessage::Error {
                    message: reason.to_string(),
                });
                return;
            }
            if let Err(JoinRefusal::SessionFull) =
                state.registry.join(&peer.peer_id, &session_id).await
            {
                peer.try_deliver(ServerMessage::Error {
                    message: "session is full".to_string(),
                });
            }
        }
        ClientMessage::Signal {
            session_id,
            payload,
        } => {
            // Sender membership is not verified; forwarding is keyed purely
            // on the claimed session id.
            let delivered = state
                .registry
                .broadcast_signal(&session_id, &peer.peer_id, payload)
                .await;
            debug!(peer_id = %peer.peer_id, session_id = %session_id, delivered, "Relayed signal");
        }
    }
}

/// Serialize a `ServerMessage` and send it over the WebSocket sink.
async fn ws_send(sink: &mut SplitSink<WebSocket, Message>, msg: &ServerMessage) -> Result<(), ()> {
    let json = serde_json::to_string(msg).unwrap_or_default();
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}
