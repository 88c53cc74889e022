//! Scripted tutoring dialogue for the 3D tutors in Live Mode.
//!
//! The retrieval step is a fixed stub: it returns canned context in the shape
//! a real vector-DB/profile lookup would, so the prompt assembly and response
//! contract can be exercised without any retrieval infrastructure. On a
//! generation failure the flow degrades to a scripted fallback response
//! instead of surfacing an error, so the tutor avatar never goes silent.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::error::FlowError;
use crate::generator::{GenerateRequest, Generator};

use super::check_nonempty;

/// The five tutor avatars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tutor {
    MrVasu,
    MrBondz,
    MrOhm,
    MrAryan,
    Sanjivani,
}

impl Tutor {
    /// Subject context injected ahead of the question.
    const fn subject_context(self) -> &'static str {
        match self {
            Self::MrVasu => {
                "CONTEXT: You are Mr. Vasu. You teach math (calculus, algebra, graphs). Prefer geometric intuition and step-by-step equations."
            }
            Self::MrBondz => {
                "CONTEXT: You are Mr. Bondz. You teach chemistry (reactions, stoichiometry). Use reaction formats: A + B -> C."
            }
            Self::MrOhm => {
                "CONTEXT: You are Mr. Ohm. You teach physics (mechanics, EM). Relate concepts to real-world analogies."
            }
            Self::MrAryan => {
                "CONTEXT: You are Mr. Aryan. You teach coding (Python, JS, DSA). Show clean code blocks and pseudocode."
            }
            Self::Sanjivani => {
                "CONTEXT: You are Sanjivani AI. You teach medical concepts (anatomy, physiology). Use clear visuals and ethical, safe explanations."
            }
        }
    }
}

/// Difficulty mode, both requested and suggested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorChatInput {
    pub tutor: Tutor,
    /// Current session topic, e.g. Integration Basics.
    pub topic: String,
    pub student_id: String,
    /// The student's question or voice input.
    pub question: String,
    /// Difficulty mode requested by the frontend.
    pub mode: Difficulty,
}

/// Frontend action: show a diagram or play an avatar animation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorAction {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Diagram,
    Animate,
}

/// Micro-quiz testing student understanding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorQuiz {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    pub explain_answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorChatOutput {
    pub explanation: String,
    pub steps: Vec<String>,
    pub quiz: TutorQuiz,
    pub actions: Vec<TutorAction>,
    /// Suggested difficulty for the next interaction.
    pub difficulty: Difficulty,
}

/// Canned retrieval result, in the shape a real RAG backend would return.
struct StudentContext {
    rag_context: &'static str,
    last_interactions: &'static [(&'static str, &'static str)],
    weak_areas: &'static [&'static str],
}

/// Stubbed retrieval: a real implementation would query a vector DB filtered
/// by tutor/subject plus a student profile store keyed by `student_id`.
fn fetch_student_context(_student_id: &str, _topic: &str, _tutor: Tutor) -> StudentContext {
    StudentContext {
        rag_context: "Integration is the reverse of differentiation. The integral of x^n is (x^(n+1))/(n+1) + C. For x^2, the integral is x^3/3 + C. The '+ C' is the constant of integration and is very important. This concept is related to finding the area under a curve.",
        last_interactions: &[
            (
                "What is differentiation?",
                "It's the rate of change of a function.",
            ),
            (
                "Thanks, that makes sense.",
                "You're welcome. Shall we try an example?",
            ),
        ],
        weak_areas: &["limits", "trigonometric identities", "constant of integration"],
    }
}

const SYSTEM_PROMPT: &str = "You are a 3D AI Teaching Tutor inside Eduko's Live Mode.
Your role is to teach concepts with clarity, accuracy, and adaptive difficulty.

The student context below was retrieved for you. DO NOT invent student data.

You always follow this response schema:
{
  \"explanation\": \"A clear and concise explanation of the concept.\",
  \"steps\": [\"step 1\", \"step 2\", ...],
  \"quiz\": {
    \"question\": \"A small practice question\",
    \"options\": [\"A\", \"B\", \"C\", \"D\"],
    \"answer\": \"B\",
    \"explain_answer\": \"Why this is correct\"
  },
  \"actions\": [
    { \"type\": \"diagram\", \"name\": \"graph_sine_wave\" },
    { \"type\": \"animate\", \"name\": \"explain_pose\" }
  ],
  \"difficulty\": \"easy | medium | hard\"
}

RULES:
1. Explanations must be student-friendly, using simple language first.
2. Use diagrams only when helpful. Use the 'diagram' action. Use animations such as 'explain_pose', 'write_board', 'point_left', 'think_pose'.
3. Adjust difficulty based on student performance history and the current 'mode'.
4. If a student is confused, simplify. If a student is confident, increase difficulty.
5. NEVER produce content outside the schema.";

impl TutorChatInput {
    fn validate(&self) -> Result<(), FlowError> {
        let mut details = Vec::new();
        check_nonempty(&mut details, "topic", &self.topic);
        check_nonempty(&mut details, "studentId", &self.student_id);
        check_nonempty(&mut details, "question", &self.question);
        FlowError::validation(details)
    }

    fn render_prompt(&self, context: &StudentContext) -> String {
        let interactions = context
            .last_interactions
            .iter()
            .map(|(q, a)| format!("Q: {q}\nA: {a}"))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "{subject}\n\nA student has asked a question.\n\n\
             - Session Topic: {topic}\n\
             - Student's Question: \"{question}\"\n\
             - Current Difficulty Mode Requested: {mode}\n\n\
             Retrieved context:\n{rag}\n\n\
             Recent interactions:\n{interactions}\n\n\
             Known weak areas: {weak_areas}\n\n\
             Please generate the JSON response.",
            subject = self.tutor.subject_context(),
            topic = self.topic,
            question = self.question,
            mode = self.mode.as_str(),
            rag = context.rag_context,
            weak_areas = context.weak_areas.join(", "),
        )
    }

    /// The scripted response used when generation fails.
    fn fallback(&self) -> TutorChatOutput {
        TutorChatOutput {
            explanation: "I had a moment of computational difficulty. Let's try to simplify that. What part is most confusing?".to_string(),
            steps: Vec::new(),
            quiz: TutorQuiz {
                question: String::new(),
                options: Vec::new(),
                answer: String::new(),
                explain_answer: String::new(),
            },
            actions: vec![TutorAction {
                kind: ActionKind::Animate,
                name: "think_pose".to_string(),
            }],
            difficulty: self.mode,
        }
    }
}

fn output_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "explanation": {"type": "STRING"},
            "steps": {"type": "ARRAY", "items": {"type": "STRING"}},
            "quiz": {
                "type": "OBJECT",
                "properties": {
                    "question": {"type": "STRING"},
                    "options": {"type": "ARRAY", "items": {"type": "STRING"}},
                    "answer": {"type": "STRING"},
                    "explain_answer": {"type": "STRING"},
                },
                "required": ["question", "options", "answer", "explain_answer"],
            },
            "actions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "type": {"type": "STRING", "enum": ["diagram", "animate"]},
                        "name": {"type": "STRING"},
                    },
                    "required": ["type", "name"],
                },
            },
            "difficulty": {"type": "STRING", "enum": ["easy", "medium", "hard"]},
        },
        "required": ["explanation", "steps", "quiz", "actions", "difficulty"],
    })
}

/// Run the tutor chat flow.
///
/// Validation failures are surfaced as errors; generation or schema failures
/// degrade to the scripted fallback response.
pub async fn run(
    generator: &dyn Generator,
    input: TutorChatInput,
) -> Result<TutorChatOutput, FlowError> {
    input.validate()?;

    let context = fetch_student_context(&input.student_id, &input.topic, input.tutor);
    let req = GenerateRequest {
        prompt: input.render_prompt(&context),
        system: Some(SYSTEM_PROMPT.to_string()),
        response_schema: Some(output_schema()),
        ..GenerateRequest::default()
    };

    let decoded = match generator.generate(req).await {
        Ok(value) => serde_json::from_value::<TutorChatOutput>(value)
            .map_err(|e| FlowError::InvalidResponse(e.to_string())),
        Err(e) => Err(e),
    };

    match decoded {
        Ok(output) => Ok(output),
        Err(e) => {
            warn!(error = %e, "Tutor generation failed, returning scripted fallback");
            Ok(input.fallback())
        }
    }
}
