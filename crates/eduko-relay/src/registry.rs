//! In-memory peer and session registry.
//!
//! Sessions exist implicitly: a session is the set of currently-connected
//! peers that joined its id, and it disappears when the last member leaves.
//! Nothing here is persisted; a relay restart drops all state and peers must
//! rejoin.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::protocol::ServerMessage;

/// Outbound queue depth per peer. Fills only when a client stops reading.
pub const PEER_QUEUE_DEPTH: usize = 32;

/// Holds the send side of one connected peer.
pub struct PeerHandle {
    /// Connection id assigned at accept time.
    pub peer_id: String,
    /// Sender for pushing messages to the peer's socket task.
    tx: mpsc::Sender<ServerMessage>,
}

impl PeerHandle {
    /// Non-blocking delivery. A full or closed queue drops the message;
    /// signalling is fire-and-forget and a slow recipient must never block
    /// the others.
    pub fn try_deliver(&self, msg: ServerMessage) -> bool {
        self.tx.try_send(msg).is_ok()
    }
}

/// Why a join was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinRefusal {
    /// The session already holds the configured maximum of peers.
    SessionFull,
}

#[derive(Default)]
struct RegistryState {
    /// All connected peers by connection id.
    peers: HashMap<String, Arc<PeerHandle>>,
    /// Current session of each joined peer. A peer belongs to at most one
    /// session; re-joining replaces the entry.
    membership: HashMap<String, String>,
    /// Member sets per session id. Entries are removed when they empty out.
    sessions: HashMap<String, HashSet<String>>,
}

/// Thread-safe registry of peers and their session membership.
///
/// A single lock guards all three maps so that membership and member sets
/// never disagree.
pub struct SessionRegistry {
    max_session_peers: usize,
    state: RwLock<RegistryState>,
}

impl SessionRegistry {
    pub fn new(max_session_peers: usize) -> Self {
        Self {
            max_session_peers,
            state: RwLock::new(RegistryState::default()),
        }
    }

    /// Register a new peer and hand back its handle with a fresh id.
    pub async fn register(&self, tx: mpsc::Sender<ServerMessage>) -> Arc<PeerHandle> {
        let peer_id = Uuid::new_v4().to_string();
        let handle = Arc::new(PeerHandle {
            peer_id: peer_id.clone(),
            tx,
        });
        self.state
            .write()
            .await
            .peers
            .insert(peer_id.clone(), Arc::clone(&handle));
        info!(peer_id = %peer_id, "Peer connected");
        handle
    }

    /// Put `peer_id` into `session_id`, implicitly leaving any previous
    /// session. Idempotent when the peer is already a member.
    pub async fn join(&self, peer_id: &str, session_id: &str) -> Result<(), JoinRefusal> {
        let mut state = self.state.write().await;

        if state.membership.get(peer_id).map(String::as_str) == Some(session_id) {
            return Ok(());
        }

        if state.sessions.get(session_id).map_or(0, HashSet::len) >= self.max_session_peers {
            warn!(peer_id = %peer_id, session_id = %session_id, "Join refused, session full");
            return Err(JoinRefusal::SessionFull);
        }
        state
            .sessions
            .entry(session_id.to_string())
            .or_default()
            .insert(peer_id.to_string());

        let previous = state
            .membership
            .insert(peer_id.to_string(), session_id.to_string());
        if let Some(old_session) = previous {
            remove_member(&mut state.sessions, &old_session, peer_id);
        }

        info!(peer_id = %peer_id, session_id = %session_id, "Peer joined session");
        Ok(())
    }

    /// Deliver `payload` from `sender_id` to every other current member of
    /// `session_id`. Sender membership is deliberately not checked; peers are
    /// trusted and the relay carries no authentication. Returns the number of
    /// queued deliveries.
    pub async fn broadcast_signal(
        &self,
        session_id: &str,
        sender_id: &str,
        payload: Value,
    ) -> usize {
        let state = self.state.read().await;
        let Some(members) = state.sessions.get(session_id) else {
            debug!(session_id = %session_id, "Signal for unknown session, no recipients");
            return 0;
        };

        let mut delivered = 0;
        for member_id in members {
            if member_id == sender_id {
                continue;
            }
            let Some(peer) = state.peers.get(member_id) else {
                continue;
            };
            let msg = ServerMessage::Signal {
                from: sender_id.to_string(),
                payload: payload.clone(),
            };
            if peer.try_deliver(msg) {
                delivered += 1;
            } else {
                debug!(peer_id = %member_id, "Dropped signal, peer queue full or closed");
            }
        }
        delivered
    }

    /// Remove a peer and its session membership. Empty sessions vanish.
    pub async fn unregister(&self, peer_id: &str) {
        let mut state = self.state.write().await;
        state.peers.remove(peer_id);
        if let Some(session_id) = state.membership.remove(peer_id) {
            remove_member(&mut state.sessions, &session_id, peer_id);
        }
        info!(peer_id = %peer_id, "Peer disconnected");
    }

    /// Number of connected peers.
    pub async fn peer_count(&self) -> usize {
        self.state.read().await.peers.len()
    }

    /// Current member count of a session, 0 when it does not exist.
    pub async fn session_len(&self, session_id: &str) -> usize {
        self.state
            .read()
            .await
            .sessions
            .get(session_id)
            .map_or(0, HashSet::len)
    }
}

fn remove_member(sessions: &mut HashMap<String, HashSet<String>>, session_id: &str, peer_id: &str) {
    if let Some(members) = sessions.get_mut(session_id) {
        members.remove(peer_id);
        if members.is_empty() {
            sessions.remove(session_id);
        }
    }
}
