//! Eduko Signalling Relay Library
//!
//! Lets N peers that share a session id discover each other and exchange
//! opaque WebRTC signalling payloads (SDP offers/answers, ICE candidates)
//! without the relay inspecting or persisting the payload contents:
//! - JSON wire protocol over WebSocket
//! - In-memory peer/session registry
//! - Fan-out of signal messages to session peers

pub mod protocol;
pub mod registry;
pub mod server;
pub mod ws;
