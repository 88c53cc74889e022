//! Router and handlers for the flow endpoints.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, State};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower_http::cors::CorsLayer;

use eduko_flows::Generator;
use eduko_flows::flows::{
    chat, college, form_guide, project_ideas, smart_notes, speech, timetable, tutor,
};

use crate::error::ApiError;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The generation backend every flow runs against.
    pub generator: Arc<dyn Generator>,
}

/// Build the flow-endpoint router.
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/api/generate-timetable", post(generate_timetable))
        .route(
            "/api/evaluate-college-programs",
            post(evaluate_college_programs),
        )
        .route("/api/generate-smart-notes", post(generate_smart_notes))
        .route("/api/generate-project-ideas", post(generate_project_ideas))
        .route(
            "/api/generate-form-filling-guide",
            post(generate_form_filling_guide),
        )
        .route("/api/conversational-chat", post(conversational_chat))
        .route("/api/generate-speech", post(generate_speech))
        .route("/api/tutor-chat", post(tutor_chat))
        .route("/healthz", get(|| async { "ok" }))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Parse a lenient JSON body into a flow's input shape.
fn parse<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|e| ApiError::Body(e.to_string()))
}

async fn generate_timetable(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<timetable::TimetableOutput>, ApiError> {
    let input = parse(body)?;
    let output = timetable::run(state.generator.as_ref(), input).await?;
    Ok(Json(output))
}

async fn evaluate_college_programs(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Vec<college::ProgramEvaluation>>, ApiError> {
    let input = parse(body)?;
    let output = college::run(state.generator.as_ref(), input).await?;
    Ok(Json(output))
}

async fn generate_smart_notes(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<smart_notes::SmartNotesOutput>, ApiError> {
    let input = parse(body)?;
    let output = smart_notes::run(state.generator.as_ref(), input).await?;
    Ok(Json(output))
}

async fn generate_project_ideas(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<project_ideas::ProjectIdeasOutput>, ApiError> {
    let input = parse(body)?;
    let output = project_ideas::run(state.generator.as_ref(), input).await?;
    Ok(Json(output))
}

async fn generate_form_filling_guide(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<form_guide::FormGuideOutput>, ApiError> {
    let input = parse(body)?;
    let output = form_guide::run(state.generator.as_ref(), input).await?;
    Ok(Json(output))
}

async fn conversational_chat(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<chat::ChatOutput>, ApiError> {
    let input = parse(body)?;
    let output = chat::run(state.generator.as_ref(), input).await?;
    Ok(Json(output))
}

async fn generate_speech(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<speech::SpeechOutput>, ApiError> {
    let input = parse(body)?;
    let output = speech::run(state.generator.as_ref(), input).await?;
    Ok(Json(output))
}

async fn tutor_chat(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<tutor::TutorChatOutput>, ApiError> {
    let input = parse(body)?;
    let output = tutor::run(state.generator.as_ref(), input).await?;
    Ok(Json(output))
}
