//! Eduko prompt-orchestration layer.
//!
//! Each flow is a stateless round trip: validate the input shape, render a
//! prompt template, call the hosted generation model through the [`Generator`]
//! seam, and decode the response against the flow's declared output schema.
//! Flows are mutually independent; none calls another.

pub mod error;
pub mod flows;
pub mod genai;
pub mod generator;

pub use error::{FieldError, FlowError};
pub use genai::GenAiClient;
pub use generator::{CannedGenerator, GenerateRequest, Generator, Turn, TurnRole};
