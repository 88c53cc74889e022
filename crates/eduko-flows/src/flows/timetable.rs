//! Personalized weekly study timetable generation.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{FieldError, FlowError};
use crate::generator::{GenerateRequest, Generator};

use super::check_nonempty;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableInput {
    /// Comma-separated list of subjects the student is studying.
    pub subjects: String,
    /// Comma-separated subjects/topics the student finds challenging.
    pub weak_areas: String,
    /// Comma-separated subjects/topics the student excels in.
    pub strong_areas: String,
    /// Daily study hours the student can commit to.
    pub study_hours: f64,
    /// Comma-separated important exam dates.
    pub exam_dates: String,
    /// Free-text description of the student's routine outside studying.
    pub lifestyle_schedule: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableOutput {
    /// Day-wise study blocks and subject allocation.
    pub weekly_timetable: String,
    /// Warnings about overloading or imbalance.
    pub warnings: String,
}

const PROMPT: &str = "You are an AI timetable generator. Generate a personalized weekly timetable for a student, considering the following information:

Subjects: {subjects}
Weak Areas: {weakAreas}
Strong Areas: {strongAreas}
Study Hours: {studyHours}
Exam Dates: {examDates}
Lifestyle Schedule: {lifestyleSchedule}

Create a detailed weekly timetable with day-wise study blocks and subject allocation. Provide any warnings or suggestions regarding potential overloading or imbalances in the timetable.

Ensure that the timetable is balanced, considering the student's strengths and weaknesses. Allocate more time to weak areas and ensure sufficient time for exam preparation. Also, ensure to consider the lifestyle schedule of the student, so that there is a balance between study time and rest time.

Ensure that the timetable is formatted in a readable and well-organized manner.

Make sure to respond in such a way that the weeklyTimetable and warnings fields are populated.";

impl TimetableInput {
    fn validate(&self) -> Result<(), FlowError> {
        let mut details = Vec::new();
        check_nonempty(&mut details, "subjects", &self.subjects);
        check_nonempty(&mut details, "weakAreas", &self.weak_areas);
        check_nonempty(&mut details, "strongAreas", &self.strong_areas);
        if !(self.study_hours > 0.0 && self.study_hours <= 24.0) {
            details.push(FieldError::new(
                "studyHours",
                "must be between 0 and 24 hours",
            ));
        }
        check_nonempty(&mut details, "examDates", &self.exam_dates);
        check_nonempty(&mut details, "lifestyleSchedule", &self.lifestyle_schedule);
        FlowError::validation(details)
    }

    fn render_prompt(&self) -> String {
        PROMPT
            .replace("{subjects}", &self.subjects)
            .replace("{weakAreas}", &self.weak_areas)
            .replace("{strongAreas}", &self.strong_areas)
            .replace("{studyHours}", &self.study_hours.to_string())
            .replace("{examDates}", &self.exam_dates)
            .replace("{lifestyleSchedule}", &self.lifestyle_schedule)
    }
}

fn output_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "weeklyTimetable": {"type": "STRING"},
            "warnings": {"type": "STRING"},
        },
        "required": ["weeklyTimetable", "warnings"],
    })
}

/// Run the timetable flow against the given generator.
pub async fn run(
    generator: &dyn Generator,
    input: TimetableInput,
) -> Result<TimetableOutput, FlowError> {
    input.validate()?;
    let req = GenerateRequest {
        prompt: input.render_prompt(),
        response_schema: Some(output_schema()),
        ..GenerateRequest::default()
    };
    let value = generator.generate(req).await?;
    serde_json::from_value(value).map_err(|e| FlowError::InvalidResponse(e.to_string()))
}
