//! HTTP surface for the Eduko flows.
//!
//! One POST endpoint per flow, plus a health probe. Request bodies are
//! parsed leniently into JSON first so that shape errors and field-check
//! failures share the same response format.

pub mod error;
pub mod routes;

pub use routes::{AppState, build_router};
