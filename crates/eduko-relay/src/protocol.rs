//! JSON wire protocol for the signalling relay.
//!
//! Text frames carry one tagged JSON object each. The `payload` of a signal
//! is opaque to the relay; it is forwarded verbatim and never parsed beyond
//! the JSON envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Longest accepted session id, in bytes.
pub const MAX_SESSION_ID_BYTES: usize = 128;

/// Messages a peer sends to the relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Associate this peer with a session.
    #[serde(rename = "join-session", rename_all = "camelCase")]
    JoinSession { session_id: String },

    /// Forward an opaque payload to the other peers of a session.
    #[serde(rename = "signal", rename_all = "camelCase")]
    Signal { session_id: String, payload: Value },
}

/// Messages the relay sends to a peer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// A signal relayed from another peer in the same session.
    #[serde(rename = "signal")]
    Signal {
        /// Connection id of the sending peer.
        from: String,
        payload: Value,
    },

    /// The previous client message was refused.
    #[serde(rename = "error")]
    Error { message: String },
}

/// Check a client-supplied session id.
///
/// Exact string match defines session grouping, so no trimming or case
/// folding happens here; only emptiness and length are refused.
pub fn validate_session_id(session_id: &str) -> Result<(), &'static str> {
    if session_id.is_empty() {
        return Err("sessionId must be a non-empty string");
    }
    if session_id.len() > MAX_SESSION_ID_BYTES {
        return Err("sessionId is too long");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn join_session_round_trips() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"join-session","sessionId":"room1"}"#).unwrap();
        match msg {
            ClientMessage::JoinSession { session_id } => assert_eq!(session_id, "room1"),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn signal_keeps_payload_opaque() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"signal","sessionId":"room1","payload":{"type":"offer","sdp":"v=0"}}"#,
        )
        .unwrap();
        match msg {
            ClientMessage::Signal {
                session_id,
                payload,
            } => {
                assert_eq!(session_id, "room1");
                assert_eq!(payload["sdp"], "v=0");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn server_signal_serializes_with_from() {
        let msg = ServerMessage::Signal {
            from: "abc".to_string(),
            payload: json!({"candidate": "..."}),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "signal");
        assert_eq!(json["from"], "abc");
        assert_eq!(json["payload"]["candidate"], "...");
    }

    #[test]
    fn unknown_message_type_is_rejected() {
        let result = serde_json::from_str::<ClientMessage>(r#"{"type":"leave-session"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn session_id_validation() {
        assert!(validate_session_id("room1").is_ok());
        assert!(validate_session_id("").is_err());
        assert!(validate_session_id(&"x".repeat(MAX_SESSION_ID_BYTES + 1)).is_err());
        // Whitespace and case are significant, not invalid.
        assert!(validate_session_id(" room1 ").is_ok());
    }
}
