//! Smart notes generation: summary, mind map, flashcards, MCQs, long notes,
//! fill-in-the-blanks, and a What/Why/How concept breakdown from raw text.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::FlowError;
use crate::generator::{GenerateRequest, Generator};

use super::check_nonempty;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartNotesInput {
    /// Raw text to generate study materials from.
    pub raw_text: String,
    pub topic: String,
    pub grade_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartNotesOutput {
    pub summary: String,
    pub mind_map: String,
    pub flashcards: String,
    pub mcqs: String,
    pub full_notes: String,
    pub fill_in_the_blanks: String,
    pub concept_breakdown: ConceptBreakdown,
}

/// What/Why/How breakdown of the core concept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptBreakdown {
    pub what: String,
    pub why: String,
    pub how: String,
}

const PROMPT: &str = "You are an AI assistant designed to help students study more effectively. You will generate a complete set of study materials from raw text input, tailored to the student's grade level and the topic.

Raw Text: {rawText}
Topic: {topic}
Grade Level: {gradeLevel}

Generate the following structured output based on the provided text. Ensure each section is filled out accurately and concisely.

- summary: A 1-2 line summary.
- mindMap: A simple text-based mind map with the main topic and indented subtopics. Do not use any special characters or art.
- flashcards: 5-10 flashcards in \"Front: Question / Back: Answer\" format.
- mcqs: 5-10 multiple choice questions in \"Q: Question / A) ... B) ... C) ... D) ... / Correct Answer: X\" format.
- fullNotes: Comprehensive notes in Markdown, including headings, sub-headings, bullet points, definitions, key facts, and examples.
- fillInTheBlanks: 5-8 fill-in-the-blank questions in \"1. ___ is the...\" format.
- conceptBreakdown: A simple breakdown of the core concept into \"What\" it is, \"Why\" it is important, and \"How\" it works.";

impl SmartNotesInput {
    fn validate(&self) -> Result<(), FlowError> {
        let mut details = Vec::new();
        check_nonempty(&mut details, "rawText", &self.raw_text);
        check_nonempty(&mut details, "topic", &self.topic);
        check_nonempty(&mut details, "gradeLevel", &self.grade_level);
        FlowError::validation(details)
    }

    fn render_prompt(&self) -> String {
        PROMPT
            .replace("{rawText}", &self.raw_text)
            .replace("{topic}", &self.topic)
            .replace("{gradeLevel}", &self.grade_level)
    }
}

fn output_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": {"type": "STRING"},
            "mindMap": {"type": "STRING"},
            "flashcards": {"type": "STRING"},
            "mcqs": {"type": "STRING"},
            "fullNotes": {"type": "STRING"},
            "fillInTheBlanks": {"type": "STRING"},
            "conceptBreakdown": {
                "type": "OBJECT",
                "properties": {
                    "what": {"type": "STRING"},
                    "why": {"type": "STRING"},
                    "how": {"type": "STRING"},
                },
                "required": ["what", "why", "how"],
            },
        },
        "required": [
            "summary",
            "mindMap",
            "flashcards",
            "mcqs",
            "fullNotes",
            "fillInTheBlanks",
            "conceptBreakdown",
        ],
    })
}

/// Run the smart notes flow.
pub async fn run(
    generator: &dyn Generator,
    input: SmartNotesInput,
) -> Result<SmartNotesOutput, FlowError> {
    input.validate()?;
    let req = GenerateRequest {
        prompt: input.render_prompt(),
        response_schema: Some(output_schema()),
        ..GenerateRequest::default()
    };
    let value = generator.generate(req).await?;
    serde_json::from_value(value).map_err(|e| FlowError::InvalidResponse(e.to_string()))
}
