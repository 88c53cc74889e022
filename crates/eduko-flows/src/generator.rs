//! The narrow seam between flows and the hosted generation model.
//!
//! Flows never talk HTTP themselves; they hand a [`GenerateRequest`] to a
//! [`Generator`] and get back either a JSON value matching the declared
//! response schema or an error. Tests substitute a canned implementation.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::FlowError;

/// Role of a single conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Model,
}

impl TurnRole {
    /// Wire name used by the generation API.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

/// One prior conversation turn, flattened to plain text.
#[derive(Debug, Clone)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
}

/// A single generation call.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    /// The user-facing prompt text.
    pub prompt: String,
    /// Optional system instruction (persona, output rules).
    pub system: Option<String>,
    /// Prior conversation turns, oldest first.
    pub history: Vec<Turn>,
    /// Declared response schema in the generation API's schema dialect.
    /// When set, the model is constrained to JSON output; when `None`, the
    /// reply is returned as a JSON string value.
    pub response_schema: Option<Value>,
}

impl GenerateRequest {
    /// A plain prompt with no system instruction, history, or schema.
    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            prompt: text.into(),
            ..Self::default()
        }
    }
}

/// External generation collaborator.
///
/// `generate` covers the text and structured-JSON flows; `generate_speech`
/// covers text-to-speech and returns raw 16-bit 24 kHz mono PCM.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, req: GenerateRequest) -> Result<Value, FlowError>;

    async fn generate_speech(&self, text: &str, voice: &str) -> Result<Vec<u8>, FlowError>;
}

/// Fixed-response generator for tests and credential-less local runs.
#[derive(Debug, Clone, Default)]
pub struct CannedGenerator {
    /// Value returned by every `generate` call.
    pub reply: Value,
    /// PCM bytes returned by every `generate_speech` call.
    pub audio: Vec<u8>,
    /// When set, both methods fail with this upstream status instead.
    pub fail_with_status: Option<u16>,
}

impl CannedGenerator {
    pub fn replying(reply: Value) -> Self {
        Self {
            reply,
            ..Self::default()
        }
    }
}

#[async_trait]
impl Generator for CannedGenerator {
    async fn generate(&self, _req: GenerateRequest) -> Result<Value, FlowError> {
        match self.fail_with_status {
            Some(status) => Err(FlowError::Api {
                status,
                body: String::new(),
            }),
            None => Ok(self.reply.clone()),
        }
    }

    async fn generate_speech(&self, _text: &str, _voice: &str) -> Result<Vec<u8>, FlowError> {
        match self.fail_with_status {
            Some(status) => Err(FlowError::Api {
                status,
                body: String::new(),
            }),
            None => Ok(self.audio.clone()),
        }
    }
}
