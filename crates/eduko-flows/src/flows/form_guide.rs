//! Step-by-step guide for filling academic forms.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::FlowError;
use crate::generator::{GenerateRequest, Generator};

use super::check_nonempty;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormGuideInput {
    /// Form type, e.g. college application, scholarship form.
    pub form_type: String,
    /// Grade level used to tailor the guide.
    pub student_grade_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormGuideOutput {
    /// Step-by-step guide covering eligibility, age limits, fees, warnings.
    pub guide: String,
}

const PROMPT: &str = "You are an AI assistant designed to help students fill out forms accurately and efficiently.

Based on the form type and student's grade level, generate a step-by-step guide that includes:

- Instructions: Clear, concise steps to complete each section of the form.
- Eligibility: Requirements the student must meet to be eligible.
- Age Limits: Any age restrictions.
- Fees: Applicable fees and payment methods.
- Warnings: Common mistakes to avoid.

Form Type: {formType}
Student Grade Level: {studentGradeLevel}";

impl FormGuideInput {
    fn validate(&self) -> Result<(), FlowError> {
        let mut details = Vec::new();
        check_nonempty(&mut details, "formType", &self.form_type);
        check_nonempty(&mut details, "studentGradeLevel", &self.student_grade_level);
        FlowError::validation(details)
    }

    fn render_prompt(&self) -> String {
        PROMPT
            .replace("{formType}", &self.form_type)
            .replace("{studentGradeLevel}", &self.student_grade_level)
    }
}

fn output_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "guide": {"type": "STRING"},
        },
        "required": ["guide"],
    })
}

/// Run the form-filling guide flow.
pub async fn run(
    generator: &dyn Generator,
    input: FormGuideInput,
) -> Result<FormGuideOutput, FlowError> {
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

    #[tokio::test]
    async fn returns_guide() {
        let generator = CannedGenerator::replying(json!({"guide": "Step 1: ..."}));
        let out = run(
            &generator,
            FormGuideInput {
                form_type: "scholarship form".to_string(),
                student_grade_level: "10".to_string(),
            },
        )
        .await
        .unwrap();
        assert!(out.guide.starts_with("Step 1"));
    }

    #[tokio::test]
    async fn rejects_empty_fields() {
        let err = run(
            &CannedGenerator::default(),
            FormGuideInput {
                form_type: String::new(),
                student_grade_level: String::new(),
            },
        )
        .await
        .unwrap_err();

        match err {
            FlowError::Validation { details } => {
                let fields: Vec<_> = details.iter().map(|d| d.field.as_str()).collect();
                assert_eq!(fields, vec!["formType", "studentGradeLevel"]);
            }
            other => panic!("expected Validation, got: {other}"),
        }
    }
}
