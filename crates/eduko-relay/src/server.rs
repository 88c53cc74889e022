//! Router construction for the relay process.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;

use crate::registry::SessionRegistry;
use crate::ws::{RelayState, ws_upgrade};

/// Build the relay router: the WebSocket endpoint plus a liveness probe.
/// Cross-origin access is unrestricted; browser peers connect from anywhere.
pub fn build_router(registry: Arc<SessionRegistry>, max_frame_bytes: usize) -> Router {
    let state = RelayState {
        registry,
        max_frame_bytes,
    };
    Router::new()
        .route("/ws", get(ws_upgrade))
        .route("/healthz", get(|| async { "ok" }))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
