//! College program evaluation from student data.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{FieldError, FlowError};
use crate::generator::{GenerateRequest, Generator};

use super::check_nonempty;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollegeEvalInput {
    /// Academic stream, e.g. Science, Commerce, Arts.
    pub stream: String,
    pub exam_scores: String,
    /// Budget for college in USD.
    pub budget: f64,
    pub location_preference: String,
    pub future_goal: String,
}

/// One suggested program. The flow output is a list of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramEvaluation {
    pub program_name: String,
    pub match_reason: String,
    pub admission_probability: String,
    pub cutoff_analysis: String,
    pub pros: String,
    pub cons: String,
}

const PROMPT: &str = "You are an AI admissions counselor that gives student personalized suggestions for college programs.

Evaluate college programs based on the following student information:

Stream: {stream}
Exam Scores: {examScores}
Budget: {budget}
Location Preference: {locationPreference}
Future Goal: {futureGoal}

Based on this information, suggest 3-5 best-fit college programs. For each program, include the program name, why it's a good match, the probability of admission, a cutoff analysis, and pros/cons.
Make sure that the college options are within the student's provided budget.
Follow the JSON schema for outputting the programs, match reasons, admission probability, cutoff analysis, and pros/cons.";

impl CollegeEvalInput {
    fn validate(&self) -> Result<(), FlowError> {
        let mut details = Vec::new();
        check_nonempty(&mut details, "stream", &self.stream);
        check_nonempty(&mut details, "examScores", &self.exam_scores);
        if self.budget <= 0.0 {
            details.push(FieldError::new("budget", "must be a positive amount"));
        }
        check_nonempty(&mut details, "locationPreference", &self.location_preference);
        check_nonempty(&mut details, "futureGoal", &self.future_goal);
        FlowError::validation(details)
    }

    fn render_prompt(&self) -> String {
        PROMPT
            .replace("{stream}", &self.stream)
            .replace("{examScores}", &self.exam_scores)
            .replace("{budget}", &self.budget.to_string())
            .replace("{locationPreference}", &self.location_preference)
            .replace("{futureGoal}", &self.future_goal)
    }
}

fn output_schema() -> serde_json::Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "programName": {"type": "STRING"},
                "matchReason": {"type": "STRING"},
                "admissionProbability": {"type": "STRING"},
                "cutoffAnalysis": {"type": "STRING"},
                "pros": {"type": "STRING"},
                "cons": {"type": "STRING"},
            },
            "required": [
                "programName",
                "matchReason",
                "admissionProbability",
                "cutoffAnalysis",
                "pros",
                "cons",
            ],
        },
    })
}

/// Run the college program evaluation flow.
pub async fn run(
    generator: &dyn Generator,
    input: CollegeEvalInput,
) -> Result<Vec<ProgramEvaluation>, FlowError> {
    input.validate()?;
    let req = GenerateRequest {
        prompt: input.render_prompt(),
        response_schema: Some(output_schema()),
        ..GenerateRequest::default()
    };
    let value = generator.generate(req).await?;
    serde_json::from_value(value).map_err(|e| FlowError::InvalidResponse(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::generator::CannedGenerator;
    use serde_json::json;

    fn valid_input() -> CollegeEvalInput {
        CollegeEvalInput {
            stream: "Science".to_string(),
            exam_scores: "92% PCM".to_string(),
            budget: 20_000.0,
            location_preference: "Pune".to_string(),
            future_goal: "Robotics engineer".to_string(),
        }
    }

    #[tokio::test]
    async fn returns_program_list() {
        let generator = CannedGenerator::replying(json!([{
            "programName": "B.Tech Mechatronics",
            "matchReason": "Matches robotics goal",
            "admissionProbability": "High",
            "cutoffAnalysis": "Cutoff last year was 88%",
            "pros": "Strong labs",
            "cons": "Far from home",
        }]));

        let out = run(&generator, valid_input()).await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].program_name, "B.Tech Mechatronics");
    }

    #[tokio::test]
    async fn rejects_non_positive_budget() {
        let mut input = valid_input();
        input.budget = -5.0;

        let err = run(&CannedGenerator::default(), input).await.unwrap_err();
        match err {
            FlowError::Validation { details } => {
                assert_eq!(details[0].field, "budget");
            }
            other => panic!("expected Validation, got: {other}"),
        }
    }

    #[tokio::test]
    async fn non_array_response_is_invalid() {
        let generator = CannedGenerator::replying(json!({"programName": "x"}));
        let err = run(&generator, valid_input()).await.unwrap_err();
        assert!(matches!(err, FlowError::InvalidResponse(_)));
    }
}
