//! Dummy profile seeding — generate N profiles, normalize each, insert as one batch.
//!
//! Flow: BulkProfiles request → single LLM call → strict structured parse →
//!       normalize × N (model order kept) → ProfileStore::insert_batch.

use std::num::NonZeroU32;

use tracing::{info, warn};

use crate::errors::AppError;
use crate::generation::generator::run_generation;
use crate::generation::interpreter::InterpretedResult;
use crate::generation::request::GenerationRequest;
use crate::llm_client::TextGenerator;
use crate::profiles::models::{ProfileRecord, PROFILE_POLICY};
use crate::profiles::normalizer::normalize;
use crate::profiles::store::ProfileStore;

/// Runs the seeding pipeline and returns how many rows the datastore reports inserted.
///
/// The store is only contacted once generation and parsing have succeeded.
pub async fn seed_profiles(
    generator: &dyn TextGenerator,
    store: &dyn ProfileStore,
    collection: &str,
    count: NonZeroU32,
) -> Result<usize, AppError> {
    let request = GenerationRequest::BulkProfiles { count };
    if request.exceeds_output_budget() {
        warn!(
            "{} profiles may not fit in {} output tokens; the reply is likely to be truncated",
            count,
            request.parameters().max_output_tokens
        );
    }

    let generated = match run_generation(generator, &request).await? {
        InterpretedResult::StructuredList(items) if !items.is_empty() => items,
        InterpretedResult::StructuredList(_) => {
            return Err(AppError::ResponseParse {
                message: "Generation service returned no profiles".to_string(),
                raw: None,
            })
        }
        InterpretedResult::ParseFailure { raw } => {
            return Err(AppError::ResponseParse {
                message: "Failed to parse generated profiles as a JSON list of objects"
                    .to_string(),
                raw,
            })
        }
        other => {
            return Err(AppError::Internal(anyhow::anyhow!(
                "unexpected {} for bulk profiles",
                other.kind()
            )))
        }
    };

    if generated.len() != count.get() as usize {
        warn!(
            "Requested {} profiles, model produced {}",
            count,
            generated.len()
        );
    }

    let records: Vec<ProfileRecord> = generated
        .into_iter()
        .map(|raw| normalize(raw, &PROFILE_POLICY))
        .collect();

    let inserted = store.insert_batch(collection, &records).await?;

    info!(
        "Inserted {} generated profiles into '{}'",
        inserted.len(),
        collection
    );
    Ok(inserted.len())
}
