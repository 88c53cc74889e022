//! Errors produced by the prompt-orchestration layer.

use serde::Serialize;
use thiserror::Error;

/// A single failed input-field check.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    /// The camelCase wire name of the offending field.
    pub field: String,
    /// Human-readable description of the problem.
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors that can occur while running a flow.
#[derive(Debug, Error)]
pub enum FlowError {
    /// The request body failed one or more field checks.
    #[error("Invalid request body")]
    Validation {
        /// Per-field failures, in declaration order.
        details: Vec<FieldError>,
    },

    /// The generation API key is not configured.
    #[error(
        "Missing GOOGLE_GENAI_API_KEY. Add it in your environment to enable Ko AI."
    )]
    MissingCredentials,

    /// The HTTP request to the generation API failed.
    #[error("Generation request failed: {0}")]
    Request(String),

    /// The generation API returned a non-success status code.
    #[error("Generation API error (status {status})")]
    Api {
        /// HTTP status code returned by the API.
        status: u16,
        /// Response body, kept for logging only and never surfaced to callers.
        body: String,
    },

    /// The model's response did not match the declared output schema.
    #[error("Model response did not match the declared schema: {0}")]
    InvalidResponse(String),
}

impl FlowError {
    /// Build a validation error from accumulated field checks.
    ///
    /// Returns `Ok(())` when `details` is empty so flows can write
    /// `FlowError::validation(checks)?`.
    pub fn validation(details: Vec<FieldError>) -> Result<(), Self> {
        if details.is_empty() {
            Ok(())
        } else {
            Err(Self::Validation { details })
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_details_is_ok() {
        assert!(FlowError::validation(Vec::new()).is_ok());
    }

    #[test]
    fn details_become_validation_error() {
        let err = FlowError::validation(vec![FieldError::new("topic", "must not be empty")])
            .unwrap_err();
        match err {
            FlowError::Validation { details } => {
                assert_eq!(details.len(), 1);
                assert_eq!(details[0].field, "topic");
            }
            other => panic!("expected Validation, got: {other}"),
        }
    }
}
