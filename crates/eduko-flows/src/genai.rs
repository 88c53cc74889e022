//! Gemini `generateContent` HTTP client.
//!
//! Constructs and sends generation requests to the Google Generative
//! Language API. This is the production [`Generator`] implementation; flows
//! themselves never see HTTP.

use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use eduko_core::config::GenAiConfig;

use crate::error::FlowError;
use crate::generator::{GenerateRequest, Generator};

/// Base URL of the Generative Language API.
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variable holding the API key, matching the web app's name.
const API_KEY_ENV: &str = "GOOGLE_GENAI_API_KEY";

/// Client for the Gemini `generateContent` endpoint.
///
/// Holds the HTTP client, the API key, and the resolved model names.
#[derive(Debug)]
pub struct GenAiClient {
    /// The reqwest HTTP client.
    http: reqwest::Client,

    /// API key sent via the `x-goog-api-key` header.
    api_key: String,

    /// Model configuration (text model, TTS model, timeout).
    config: GenAiConfig,

    /// API base URL; overridable so tests can point at a local server.
    base_url: String,
}

/// One content block in a generation request or response.
#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

/// A single content part: either text or inline binary data.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }
}

/// Inline base64 payload returned by audio generations.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: String,
    data: String,
}

/// The request body for `models/{model}:generateContent`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<SpeechConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    voice_config: VoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenAiClient {
    /// Create a client reading the API key from `GOOGLE_GENAI_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::MissingCredentials`] when the variable is unset
    /// or empty.
    pub fn from_env(config: GenAiConfig) -> Result<Self, FlowError> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or(FlowError::MissingCredentials)?;

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| FlowError::Request(e.to_string()))?;

        debug!(model = %config.model, "GenAI client initialized");
        Ok(Self::from_parts(api_key, config, http))
    }

    /// Create a client from a pre-resolved key and a pre-built HTTP client.
    pub fn from_parts(api_key: String, config: GenAiConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            api_key,
            config,
            base_url: API_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different API base URL (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    async fn post(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, FlowError> {
        let response = self
            .http
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| FlowError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            warn!(status = status.as_u16(), body = %body, "Generation API returned error");
            return Err(FlowError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| FlowError::InvalidResponse(e.to_string()))
    }

    /// Assemble the request body for a text or structured-JSON generation.
    fn build_body(req: &GenerateRequest) -> GenerateContentRequest {
        let mut contents: Vec<Content> = req
            .history
            .iter()
            .map(|turn| Content {
                role: Some(turn.role.as_str().to_string()),
                parts: vec![Part::text(&turn.text)],
            })
            .collect();
        contents.push(Content {
            role: Some("user".to_string()),
            parts: vec![Part::text(&req.prompt)],
        });

        let generation_config = req.response_schema.as_ref().map(|schema| GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(schema.clone()),
            response_modalities: None,
            speech_config: None,
        });

        GenerateContentRequest {
            contents,
            system_instruction: req.system.as_ref().map(|text| Content {
                role: None,
                parts: vec![Part::text(text)],
            }),
            generation_config,
        }
    }

    /// Pull the first text part out of a response.
    fn first_text(response: GenerateContentResponse) -> Result<String, FlowError> {
        response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|content| content.parts.into_iter().find_map(|p| p.text))
            .ok_or_else(|| {
                FlowError::InvalidResponse("no text content in model response".to_string())
            })
    }
}

#[async_trait]
impl Generator for GenAiClient {
    async fn generate(&self, req: GenerateRequest) -> Result<Value, FlowError> {
        let constrained = req.response_schema.is_some();
        let body = Self::build_body(&req);
        let response = self.post(&self.config.model, &body).await?;
        let text = Self::first_text(response)?;

        if constrained {
            serde_json::from_str(&text).map_err(|e| FlowError::InvalidResponse(e.to_string()))
        } else {
            Ok(Value::String(text))
        }
    }

    async fn generate_speech(&self, text: &str, voice: &str) -> Result<Vec<u8>, FlowError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part::text(text)],
            }],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_mime_type: None,
                response_schema: None,
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: voice.to_string(),
                        },
                    },
                }),
            }),
        };

        let response = self.post(&self.config.tts_model, &body).await?;
        let inline = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|content| content.parts.into_iter().find_map(|p| p.inline_data))
            .ok_or_else(|| {
                FlowError::InvalidResponse("no audio media in model response".to_string())
            })?;

        base64::engine::general_purpose::STANDARD
            .decode(inline.data.as_bytes())
            .map_err(|e| FlowError::InvalidResponse(format!("bad inline audio encoding: {e}")))
    }
}
