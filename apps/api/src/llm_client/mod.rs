/// LLM Client — the single point of entry for all text-generation calls.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// Handlers depend on the `TextGenerator` trait; `GeminiClient` is the production backend.
///
/// No retries: one failed upstream call is one failed request.
use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const RATE_LIMIT_MARKERS: &[&str] = &["RESOURCE_EXHAUSTED"];
const AUTH_MARKERS: &[&str] = &["PERMISSION_DENIED", "API key not valid"];

/// Classified cause of a failed generation call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationFailure {
    #[error("generation service rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("generation service rejected the credentials: {0}")]
    AuthInvalid(String),

    #[error("generation service returned no text content")]
    EmptyResponse,

    #[error("generation call failed: {0}")]
    Transport(String),
}

/// Outcome of one generation call: the model's text, or why there is none.
pub type RawModelResponse = Result<String, GenerationFailure>;

/// Classifies a transport or service error by the markers the upstream API puts in its text.
pub fn classify_failure(error_text: &str) -> GenerationFailure {
    if RATE_LIMIT_MARKERS.iter().any(|m| error_text.contains(m)) {
        GenerationFailure::RateLimited(error_text.to_string())
    } else if AUTH_MARKERS.iter().any(|m| error_text.contains(m)) {
        GenerationFailure::AuthInvalid(error_text.to_string())
    } else {
        GenerationFailure::Transport(error_text.to_string())
    }
}

/// Sampling and output-shape settings for a single generation call.
///
/// The candidate count is always 1 and is not configurable.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParameters {
    pub max_output_tokens: NonZeroU32,
    pub temperature: f32,
    pub top_p: f32,
    /// Structured-output schema hint, forwarded to the service unchanged.
    pub response_schema: Option<Value>,
}

impl GenerationParameters {
    pub const CANDIDATE_COUNT: u32 = 1;

    pub fn new(max_output_tokens: NonZeroU32) -> Self {
        Self {
            max_output_tokens,
            temperature: 0.7,
            top_p: 0.9,
            response_schema: None,
        }
    }

    /// Overrides sampling; both values are clamped into [0, 1].
    pub fn with_sampling(mut self, temperature: f32, top_p: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 1.0);
        self.top_p = top_p.clamp(0.0, 1.0);
        self
    }

    pub fn with_response_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }
}

/// The text-generation collaborator. Carried in `AppState` as `Arc<dyn TextGenerator>`
/// so tests can substitute an in-memory implementation.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, params: &GenerationParameters) -> RawModelResponse;
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    candidate_count: u32,
    max_output_tokens: u32,
    temperature: f32,
    top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<&'a Value>,
}

impl<'a> From<&'a GenerationParameters> for GenerationConfig<'a> {
    fn from(params: &'a GenerationParameters) -> Self {
        Self {
            candidate_count: GenerationParameters::CANDIDATE_COUNT,
            max_output_tokens: params.max_output_tokens.get(),
            temperature: params.temperature,
            top_p: params.top_p,
            response_mime_type: params
                .response_schema
                .as_ref()
                .map(|_| "application/json"),
            response_schema: params.response_schema.as_ref(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}

impl GenerateContentResponse {
    /// Text of the first part carrying text, in the first candidate that has any.
    fn first_text(&self) -> Option<&str> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
            .find_map(|p| p.text.as_deref())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// GeminiClient
// ────────────────────────────────────────────────────────────────────────────

/// Production `TextGenerator` backed by the Gemini `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_base: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(
        api_key: String,
        model: String,
        api_base: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_base: api_base.trim_end_matches('/').to_string(),
            model,
            api_key,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str, params: &GenerationParameters) -> RawModelResponse {
        let request_body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig::from(params),
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| classify_failure(&e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| classify_failure(&e.to_string()))?;

        if !status.is_success() {
            warn!("Gemini API returned {}: {}", status, body);
            return Err(classify_failure(&body));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            GenerationFailure::Transport(format!("unreadable response body: {e}"))
        })?;

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                "Gemini call succeeded: prompt_tokens={:?}, output_tokens={:?}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        match parsed.first_text().map(str::trim) {
            Some(text) if !text.is_empty() => Ok(text.to_string()),
            _ => {
                warn!("Gemini API returned an empty or unexpected response");
                Err(GenerationFailure::EmptyResponse)
            }
        }
    }
}

/// Removes a surrounding markdown code fence (optionally tagged `json`) from model output.
/// An unclosed fence, as left by a truncated reply, is stripped from the front only.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
