//! Eduko Core Library
//!
//! Shared functionality for the Eduko backend services:
//! - Configuration resolution and hierarchy
//! - Common error types
//! - Tracing/logging initialization

pub mod config;
pub mod error;
pub mod tracing_init;

pub use config::Config;
pub use error::{Error, Result};
