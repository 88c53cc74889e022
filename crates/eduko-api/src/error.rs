//! Mapping from flow errors to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value, json};
use tracing::error;

use eduko_flows::FlowError;

/// Error type returned by every flow endpoint.
#[derive(Debug)]
pub enum ApiError {
    /// The body was not valid JSON for the endpoint's input shape.
    Body(String),
    /// The flow itself failed.
    Flow(FlowError),
}

impl From<FlowError> for ApiError {
    fn from(err: FlowError) -> Self {
        Self::Flow(err)
    }
}

fn bad_request(details: Value) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"error": "Invalid request body", "details": details})),
    )
        .into_response()
}

fn internal(message: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": message})),
    )
        .into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Body(message) => bad_request(Value::String(message)),
            Self::Flow(FlowError::Validation { details }) => {
                let fields: Map<String, Value> = details
                    .into_iter()
                    .map(|d| (d.field, Value::String(d.message)))
                    .collect();
                bad_request(Value::Object(fields))
            }
            Self::Flow(FlowError::Api { status, body }) => {
                // The upstream body may carry prompt text; log it, never return it.
                error!(status, body, "generation API returned an error");
                internal(format!("Generation API error (status {status})"))
            }
            Self::Flow(err) => {
                error!(%err, "flow failed");
                internal(err.to_string())
            }
        }
    }
}
