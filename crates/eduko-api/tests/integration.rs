#![allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use eduko_api::routes::{AppState, build_router};
use eduko_flows::CannedGenerator;

fn app(generator: CannedGenerator) -> axum::Router {
    build_router(
        AppState {
            generator: Arc::new(generator),
        },
        1024 * 1024,
    )
}

/// POST a JSON body to the app and return (status, parsed body).
async fn send_post(app: axum::Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let parsed = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, parsed)
}

fn timetable_body() -> Value {
    json!({
        "subjects": "Math, Physics",
        "weakAreas": "Integration",
        "strongAreas": "Mechanics",
        "studyHours": 4.0,
        "examDates": "2026-03-10",
        "lifestyleSchedule": "School 8-2, football on weekends"
    })
}

#[tokio::test]
async fn healthz_returns_ok() {
    let resp = app(CannedGenerator::default())
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn timetable_happy_path() {
    let generator = CannedGenerator::replying(json!({
        "weeklyTimetable": "Mon: integration drills",
        "warnings": "None"
    }));
    let (status, body) = send_post(
        app(generator),
        "/api/generate-timetable",
        &timetable_body(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["weeklyTimetable"], "Mon: integration drills");
    assert_eq!(body["warnings"], "None");
}

#[tokio::test]
async fn timetable_blank_fields_return_field_details() {
    let mut input = timetable_body();
    input["subjects"] = json!("   ");
    input["studyHours"] = json!(0.0);
    let (status, body) = send_post(app(CannedGenerator::default()), "/api/generate-timetable", &input).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request body");
    assert!(body["details"]["subjects"].is_string());
    assert!(body["details"]["studyHours"].is_string());
}

#[tokio::test]
async fn missing_fields_return_400() {
    let (status, body) = send_post(
        app(CannedGenerator::default()),
        "/api/generate-timetable",
        &json!({"subjects": "Math"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request body");
}

#[tokio::test]
async fn upstream_failure_returns_500() {
    let generator = CannedGenerator {
        fail_with_status: Some(503),
        ..CannedGenerator::default()
    };
    let (status, body) = send_post(
        app(generator),
        "/api/generate-timetable",
        &timetable_body(),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn chat_returns_the_model_reply() {
    let generator = CannedGenerator::replying(json!("Short answer: yes."));
    let (status, body) = send_post(
        app(generator),
        "/api/conversational-chat",
        &json!({
            "persona": "a witty assistant",
            "history": [
                {"role": "user", "content": [{"text": "hello"}]},
                {"role": "model", "content": [{"text": "hi"}]}
            ],
            "message": "Is Rust fast?"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "Short answer: yes.");
}

#[tokio::test]
async fn college_evaluation_returns_an_array() {
    let generator = CannedGenerator::replying(json!([{
        "programName": "B.Tech CSE",
        "matchReason": "Strong PCM scores",
        "admissionProbability": "High",
        "cutoffAnalysis": "Above last year's cutoff",
        "pros": "Good placements",
        "cons": "High fees"
    }]));
    let (status, body) = send_post(
        app(generator),
        "/api/evaluate-college-programs",
        &json!({
            "stream": "PCM",
            "examScores": "JEE 98 percentile",
            "budget": 200_000.0,
            "locationPreference": "Pune",
            "futureGoal": "Software engineering"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["programName"], "B.Tech CSE");
}

#[tokio::test]
async fn speech_returns_a_wav_data_uri() {
    let generator = CannedGenerator {
        // 100 ms of silence, 16-bit mono at 24 kHz
        audio: vec![0u8; 4800],
        ..CannedGenerator::default()
    };
    let (status, body) = send_post(
        app(generator),
        "/api/generate-speech",
        &json!({"text": "Hello, student", "voice": "Sirius"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let uri = body["audioDataUri"].as_str().unwrap();
    assert!(uri.starts_with("data:audio/wav;base64,"), "uri: {uri}");
}

#[tokio::test]
async fn tutor_chat_degrades_to_fallback_on_upstream_failure() {
    let generator = CannedGenerator {
        fail_with_status: Some(500),
        ..CannedGenerator::default()
    };
    let (status, body) = send_post(
        app(generator),
        "/api/tutor-chat",
        &json!({
            "tutor": "mr_vasu",
            "topic": "Integration Basics",
            "studentId": "student-7",
            "question": "Why does substitution work?",
            "mode": "medium"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "tutor must never surface 500s");
    assert!(
        body["explanation"]
            .as_str()
            .unwrap()
            .contains("computational difficulty")
    );
    assert_eq!(body["difficulty"], "medium");
    assert_eq!(body["actions"][0]["name"], "think_pose");
}

#[tokio::test]
async fn tutor_chat_still_validates_input() {
    let (status, body) = send_post(
        app(CannedGenerator::default()),
        "/api/tutor-chat",
        &json!({
            "tutor": "mr_ohm",
            "topic": "",
            "studentId": "student-7",
            "question": "",
            "mode": "easy"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request body");
}
