//! Typed generation requests and the call settings each kind implies.

use std::num::NonZeroU32;

use serde_json::Value;

use crate::generation::interpreter::Expectation;
use crate::llm_client::GenerationParameters;
use crate::profiles::models::profile_response_schema;

/// Rough output-token allowance per generated feed item.
const TOKENS_PER_FEED_ITEM: u32 = 50;
/// Rough output-token allowance per generated profile object.
const TOKENS_PER_PROFILE: u32 = 700;
const MAX_BULK_OUTPUT_TOKENS: u32 = 8192;

/// One inbound generation task. Built per call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationRequest {
    Bio {
        /// Attribute pairs in the order the caller sent them.
        user_data: Vec<(String, String)>,
        instructions: Option<String>,
    },
    Feed {
        profile_summary: String,
        recent_activity: Vec<Value>,
        item_count: NonZeroU32,
    },
    DailyPrompt {
        context: Option<String>,
    },
    BulkProfiles {
        count: NonZeroU32,
    },
    /// Free-form prompt from the greeting endpoint.
    Freeform {
        prompt: String,
    },
}

impl GenerationRequest {
    /// Generation settings for this kind of request.
    pub fn parameters(&self) -> GenerationParameters {
        match self {
            GenerationRequest::Bio { .. } => GenerationParameters::new(tokens(200)),
            GenerationRequest::Feed { item_count, .. } => GenerationParameters::new(tokens(
                item_count.get().saturating_mul(TOKENS_PER_FEED_ITEM),
            )),
            GenerationRequest::DailyPrompt { .. } => GenerationParameters::new(tokens(50)),
            GenerationRequest::BulkProfiles { count } => GenerationParameters::new(tokens(
                count
                    .get()
                    .saturating_mul(TOKENS_PER_PROFILE)
                    .min(MAX_BULK_OUTPUT_TOKENS),
            ))
            .with_sampling(0.9, 0.95)
            .with_response_schema(profile_response_schema()),
            GenerationRequest::Freeform { .. } => GenerationParameters::new(tokens(150)),
        }
    }

    /// True when the per-item estimate had to be cut to the output-token ceiling,
    /// so the reply is likely to be truncated.
    pub fn exceeds_output_budget(&self) -> bool {
        match self {
            GenerationRequest::BulkProfiles { count } => {
                count.get().saturating_mul(TOKENS_PER_PROFILE) > MAX_BULK_OUTPUT_TOKENS
            }
            _ => false,
        }
    }

    /// The shape the model's reply is expected to have.
    pub fn expectation(&self) -> Expectation {
        match self {
            GenerationRequest::Feed { .. } => Expectation::StringList,
            GenerationRequest::BulkProfiles { .. } => Expectation::StructuredList,
            GenerationRequest::Bio { .. }
            | GenerationRequest::DailyPrompt { .. }
            | GenerationRequest::Freeform { .. } => Expectation::PlainText,
        }
    }
}

fn tokens(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).unwrap_or(NonZeroU32::MIN)
}
