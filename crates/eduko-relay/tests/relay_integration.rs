//! End-to-end relay tests over real WebSocket connections.

#![allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use eduko_relay::registry::SessionRegistry;
use eduko_relay::server::build_router;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Spawn a relay on an ephemeral port, returning its address and registry.
async fn spawn_relay() -> (SocketAddr, Arc<SessionRegistry>) {
    let registry = Arc::new(SessionRegistry::new(16));
    let app = build_router(Arc::clone(&registry), 64 * 1024);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, registry)
}

async fn connect(addr: SocketAddr) -> Client {
    let (ws, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    ws
}

async fn send_json(client: &mut Client, value: Value) {
    client
        .send(Message::Text(value.to_string()))
        .await
        .unwrap();
}

async fn join(client: &mut Client, session_id: &str) {
    send_json(
        client,
        json!({"type": "join-session", "sessionId": session_id}),
    )
    .await;
}

/// Receive the next JSON message within two seconds.
async fn recv_json(client: &mut Client) -> Value {
    let msg = tokio::time::timeout(Duration::from_secs(2), client.next())
        .await
        .expect("timed out waiting for a message")
        .expect("connection closed")
        .unwrap();
    match msg {
        Message::Text(text) => serde_json::from_str(&text).unwrap(),
        other => panic!("unexpected frame: {other:?}"),
    }
}

/// Assert no message arrives within a grace window.
async fn assert_silent(client: &mut Client) {
    let result = tokio::time::timeout(Duration::from_millis(200), client.next()).await;
    assert!(result.is_err(), "expected silence, got: {result:?}");
}

/// Wait until a session holds `expected` members.
async fn wait_for_members(registry: &SessionRegistry, session_id: &str, expected: usize) {
    for _ in 0..100 {
        if registry.session_len(session_id).await == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("session {session_id} never reached {expected} members");
}

#[tokio::test]
async fn signal_reaches_session_peer_but_not_sender() {
    let (addr, registry) = spawn_relay().await;
    let mut a = connect(addr).await;
    let mut b = connect(addr).await;

    join(&mut a, "room1").await;
    join(&mut b, "room1").await;
    wait_for_members(&registry, "room1", 2).await;

    send_json(
        &mut a,
        json!({"type": "signal", "sessionId": "room1", "payload": {"type": "offer"}}),
    )
    .await;

    let msg = recv_json(&mut b).await;
    assert_eq!(msg["type"], "signal");
    assert_eq!(msg["payload"]["type"], "offer");
    assert!(msg["from"].is_string(), "from must carry the sender id");

    // A never receives its own signal back.
    assert_silent(&mut a).await;
}

#[tokio::test]
async fn other_sessions_hear_nothing() {
    let (addr, registry) = spawn_relay().await;
    let mut a = connect(addr).await;
    let mut c = connect(addr).await;

    join(&mut a, "room1").await;
    join(&mut c, "room2").await;
    wait_for_members(&registry, "room1", 1).await;
    wait_for_members(&registry, "room2", 1).await;

    send_json(
        &mut a,
        json!({"type": "signal", "sessionId": "room1", "payload": {"sdp": "v=0"}}),
    )
    .await;

    assert_silent(&mut c).await;
}

#[tokio::test]
async fn disconnect_leaves_remaining_peers_working() {
    let (addr, registry) = spawn_relay().await;
    let mut a = connect(addr).await;
    let mut b = connect(addr).await;

    join(&mut a, "room1").await;
    join(&mut b, "room1").await;
    wait_for_members(&registry, "room1", 2).await;

    drop(a);
    wait_for_members(&registry, "room1", 1).await;

    // B is now the sole (and excluded) member: no recipients, no error.
    send_json(
        &mut b,
        json!({"type": "signal", "sessionId": "room1", "payload": {"x": 1}}),
    )
    .await;
    assert_silent(&mut b).await;

    // A newcomer still pairs up with B.
    let mut d = connect(addr).await;
    join(&mut d, "room1").await;
    wait_for_members(&registry, "room1", 2).await;

    send_json(
        &mut b,
        json!({"type": "signal", "sessionId": "room1", "payload": {"type": "answer"}}),
    )
    .await;
    let msg = recv_json(&mut d).await;
    assert_eq!(msg["payload"]["type"], "answer");
}

#[tokio::test]
async fn empty_session_id_gets_error_event() {
    let (addr, _registry) = spawn_relay().await;
    let mut a = connect(addr).await;

    join(&mut a, "").await;

    let msg = recv_json(&mut a).await;
    assert_eq!(msg["type"], "error");
}

#[tokio::test]
async fn malformed_frames_are_ignored() {
    let (addr, registry) = spawn_relay().await;
    let mut a = connect(addr).await;

    a.send(Message::Text("not json at all".to_string()))
        .await
        .unwrap();
    send_json(&mut a, json!({"type": "leave-session"})).await;

    // The connection survives and still accepts a join afterwards.
    join(&mut a, "room1").await;
    wait_for_members(&registry, "room1", 1).await;
}

#[tokio::test]
async fn session_over_capacity_refuses_join() {
    let registry = Arc::new(SessionRegistry::new(1));
    let app = build_router(Arc::clone(&registry), 64 * 1024);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let mut a = connect(addr).await;
    let mut b = connect(addr).await;
    join(&mut a, "room1").await;
    wait_for_members(&registry, "room1", 1).await;

    join(&mut b, "room1").await;
    let msg = recv_json(&mut b).await;
    assert_eq!(msg["type"], "error");
}
