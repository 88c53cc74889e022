//! Full project roadmap generation from a student's background and idea.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{FieldError, FlowError};
use crate::generator::{GenerateRequest, Generator};

use super::check_nonempty;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectIdeasInput {
    /// Education type, e.g. Engineering, Diploma.
    pub education_type: String,
    /// Field of study if applicable.
    #[serde(default)]
    pub branch: Option<String>,
    /// Student interests, e.g. IoT, Web Development.
    pub interests: Vec<String>,
    /// The user-provided project idea or name.
    pub project_idea: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectIdeasOutput {
    /// 3-4 line project description.
    pub summary: String,
    pub required_skills: Vec<String>,
    /// Empty when no hardware is needed.
    pub hardware_requirements: Vec<String>,
    pub software_requirements: Vec<String>,
    /// 6-10 actionable build steps.
    pub build_plan: Vec<String>,
    /// Text-based block diagram, e.g. `[Sensor] -> [MCU] -> [Cloud] -> [App]`.
    pub architecture_diagram: String,
}

const PROMPT: &str = "You are an AI project architect that creates detailed project roadmaps for students. Generate a complete blueprint based on the user's background and their project idea.

**User Background:**
- Education: {educationType}
- Branch: {branch}
- Interests: {interests}

**Project Idea:**
\"{projectIdea}\"

**Your Task:**
Generate a comprehensive project roadmap with the following sections. Be specific and tailor the output to the user's background and the project idea.

1.  **Project Summary:** Write a concise 3-4 line description explaining what the project is and its purpose.
2.  **Required Skills:** List the key technical skills needed (e.g., IoT fundamentals, App Development, Embedded C).
3.  **Hardware Requirements:** List all necessary hardware components. If no hardware is needed, provide an empty array.
4.  **Software Requirements:** List all necessary software, programming languages, frameworks, and libraries.
5.  **Step-by-Step Build Plan:** Create a clear, actionable build plan with 6-10 steps from setup to final testing.
6.  **Architecture Diagram:** Provide a simple, text-based block diagram showing the flow of the system. For example: [Sensors] -> [ESP32] -> [Cloud: Firebase/MQTT] -> [Mobile App].

**Example Project: Smart Energy Meter Monitoring System**
- **Summary:** A smart IoT-based energy meter that tracks electricity usage in real time and shows consumption data on a mobile app. Helps reduce wastage and gives predictive billing.
- **Required Skills:** IoT fundamentals, MQTT/HTTP, App Development, Firebase/ThingsBoard, Embedded C/Python.
- **Hardware:** ESP32, Current Sensor SCT-013, Voltage Sensor, Power Supply.
- **Software:** Arduino IDE, Firebase Realtime DB, Flutter/React Native.
- **Build Plan:** 1. Set up ESP32... 2. Write code to read sensors... etc.
- **Architecture:** [Sensors] -> [ESP32] -> [Cloud] -> [Mobile App]

Provide the output in the specified JSON format.";

impl ProjectIdeasInput {
    fn validate(&self) -> Result<(), FlowError> {
        let mut details = Vec::new();
        check_nonempty(&mut details, "educationType", &self.education_type);
        if self.interests.iter().all(|i| i.trim().is_empty()) {
            details.push(FieldError::new(
                "interests",
                "must contain at least one interest",
            ));
        }
        check_nonempty(&mut details, "projectIdea", &self.project_idea);
        FlowError::validation(details)
    }

    fn render_prompt(&self) -> String {
        PROMPT
            .replace("{educationType}", &self.education_type)
            .replace("{branch}", self.branch.as_deref().unwrap_or("Not specified"))
            .replace("{interests}", &self.interests.join(", "))
            .replace("{projectIdea}", &self.project_idea)
    }
}

fn output_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": {"type": "STRING"},
            "requiredSkills": {"type": "ARRAY", "items": {"type": "STRING"}},
            "hardwareRequirements": {"type": "ARRAY", "items": {"type": "STRING"}},
            "softwareRequirements": {"type": "ARRAY", "items": {"type": "STRING"}},
            "buildPlan": {"type": "ARRAY", "items": {"type": "STRING"}},
            "architectureDiagram": {"type": "STRING"},
        },
        "required": [
            "summary",
            "requiredSkills",
            "hardwareRequirements",
            "softwareRequirements",
            "buildPlan",
            "architectureDiagram",
        ],
    })
}

/// Run the project roadmap flow.
pub async fn run(
    generator: &dyn Generator,
    input: ProjectIdeasInput,
) -> Result<ProjectIdeasOutput, FlowError> {
    input.validate()?;
    let req = GenerateRequest {
        prompt: input.render_prompt(),
        response_schema: Some(output_schema()),
        ..GenerateRequest::default()
    };
    let value = generator.generate(req).await?;
    serde_json::from_value(value).map_err(|e| FlowError::InvalidResponse(e.to_string()))
}
