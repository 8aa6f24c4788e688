//! Axum route handlers for the text generation endpoints.

use std::num::NonZeroU32;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::generation::generator::{expect_text, run_generation};
use crate::generation::interpreter::InterpretedResult;
use crate::generation::request::GenerationRequest;
use crate::state::AppState;

const NO_AI_RESPONSE: &str = "No AI response received.";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateProfileRequest {
    /// Attribute → value; key order is preserved into the prompt.
    pub user_data: Map<String, Value>,
    pub prompt_instructions: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateProfileResponse {
    pub profile_bio: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateNewsFeedRequest {
    pub user_profile_summary: String,
    pub recent_activity: Vec<Value>,
    #[serde(default = "default_num_items")]
    pub num_items: u32,
}

fn default_num_items() -> u32 {
    3
}

#[derive(Debug, Serialize)]
pub struct GenerateNewsFeedResponse {
    pub news_feed_items: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct DailyPromptQuery {
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DailyPromptResponse {
    pub daily_prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct MatchUsersRequest {
    pub name: String,
    pub prompt_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MatchUsersResponse {
    pub greeting: String,
    pub ai_response: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /generate-profile/
///
/// Writes a dating profile bio from the caller's attributes.
pub async fn handle_generate_profile(
    State(state): State<AppState>,
    body: Result<Json<GenerateProfileRequest>, JsonRejection>,
) -> Result<Json<GenerateProfileResponse>, AppError> {
    let Json(request) = body?;
    let user_data = request
        .user_data
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(s) => Ok((key, s)),
            _ => Err(AppError::Validation(format!(
                "user_data.{key} must be a string"
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let generation = GenerationRequest::Bio {
        user_data,
        instructions: request.prompt_instructions,
    };
    let result = run_generation(state.generator()?, &generation).await?;
    let profile_bio = expect_text(result, "profile bio")?;

    Ok(Json(GenerateProfileResponse { profile_bio }))
}

/// POST /generate-news-feed/
///
/// Generates short feed items. Malformed list output is recovered from quoted
/// substrings; if nothing can be recovered the raw reply is returned for diagnosis.
pub async fn handle_generate_news_feed(
    State(state): State<AppState>,
    body: Result<Json<GenerateNewsFeedRequest>, JsonRejection>,
) -> Result<Json<GenerateNewsFeedResponse>, AppError> {
    let Json(request) = body?;
    let item_count = NonZeroU32::new(request.num_items)
        .ok_or_else(|| AppError::Validation("num_items must be at least 1".to_string()))?;

    let generation = GenerationRequest::Feed {
        profile_summary: request.user_profile_summary,
        recent_activity: request.recent_activity,
        item_count,
    };

    match run_generation(state.generator()?, &generation).await? {
        InterpretedResult::StringList(news_feed_items) => {
            if news_feed_items.len() != item_count.get() as usize {
                warn!(
                    "Requested {} feed items, model produced {}",
                    item_count,
                    news_feed_items.len()
                );
            }
            Ok(Json(GenerateNewsFeedResponse { news_feed_items }))
        }
        InterpretedResult::ParseFailure { raw } => Err(AppError::ResponseParse {
            message:
                "Failed to generate valid news feed items (JSON parse error or malformed)"
                    .to_string(),
            raw,
        }),
        other => Err(AppError::Internal(anyhow::anyhow!(
            "unexpected {} for news feed",
            other.kind()
        ))),
    }
}

/// GET /generate-daily-prompt/?context=
pub async fn handle_generate_daily_prompt(
    State(state): State<AppState>,
    query: Result<Query<DailyPromptQuery>, QueryRejection>,
) -> Result<Json<DailyPromptResponse>, AppError> {
    let Query(query) = query?;
    let generation = GenerationRequest::DailyPrompt {
        context: query.context,
    };
    let result = run_generation(state.generator()?, &generation).await?;
    let daily_prompt = expect_text(result, "daily prompt")?;

    Ok(Json(DailyPromptResponse { daily_prompt }))
}

/// POST /match-users
///
/// Greets the caller and answers their prompt (or a default one about their name).
pub async fn handle_match_users(
    State(state): State<AppState>,
    body: Result<Json<MatchUsersRequest>, JsonRejection>,
) -> Result<Json<MatchUsersResponse>, AppError> {
    let Json(request) = body?;
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }

    let prompt = request
        .prompt_text
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| format!("Tell me something interesting about the name {name}."));

    let generation = GenerationRequest::Freeform { prompt };
    let ai_response = match run_generation(state.generator()?, &generation).await {
        Ok(result) => expect_text(result, "AI response")?,
        Err(AppError::UpstreamEmptyResponse) => {
            info!("Generation returned no text for greeting; using placeholder");
            NO_AI_RESPONSE.to_string()
        }
        Err(e) => return Err(e),
    };

    Ok(Json(MatchUsersResponse {
        greeting: format!("Hello {name}!"),
        ai_response,
    }))
}
