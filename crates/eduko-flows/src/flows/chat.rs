//! Persona-driven conversational chat.
//!
//! Unlike the structured flows this one is free-text: the persona goes into
//! the system instruction and the reply comes back as plain text.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FlowError;
use crate::generator::{GenerateRequest, Generator, Turn, TurnRole};

use super::check_nonempty;

/// Role of a history message on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentPart {
    pub text: String,
}

/// One prior message: a role plus one or more text parts.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryMessage {
    pub role: Role,
    pub content: Vec<ContentPart>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatInput {
    /// Persona the model should adopt for the conversation.
    pub persona: String,
    /// Conversation history, oldest first.
    #[serde(default)]
    pub history: Vec<HistoryMessage>,
    /// The latest user message.
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatOutput {
    pub reply: String,
}

const SYSTEM_TEMPLATE: &str = "You are an AI assistant. You must adopt the following persona: {persona}. Your responses should be concise, witty, and directly answer the user's question. Do not be overly verbose.";

impl ChatInput {
    fn validate(&self) -> Result<(), FlowError> {
        let mut details = Vec::new();
        check_nonempty(&mut details, "persona", &self.persona);
        check_nonempty(&mut details, "message", &self.message);
        FlowError::validation(details)
    }

    /// Flatten history messages into generator turns, joining multi-part
    /// content into one text block.
    fn turns(&self) -> Vec<Turn> {
        self.history
            .iter()
            .map(|msg| Turn {
                role: match msg.role {
                    Role::User => TurnRole::User,
                    Role::Model => TurnRole::Model,
                },
                text: msg
                    .content
                    .iter()
                    .map(|part| part.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n"),
            })
            .collect()
    }
}

/// Run the conversational chat flow.
pub async fn run(generator: &dyn Generator, input: ChatInput) -> Result<ChatOutput, FlowError> {
    input.validate()?;
    let req = GenerateRequest {
        prompt: input.message.clone(),
        system: Some(SYSTEM_TEMPLATE.replace("{persona}", &input.persona)),
        history: input.turns(),
        response_schema: None,
    };

    let value = generator.generate(req).await?;
    match value {
        Value::String(reply) => Ok(ChatOutput { reply }),
        other => Err(FlowError::InvalidResponse(format!(
            "expected a text reply, got: {other}"
        ))),
    }
}
