//! Generation pipeline — one pass of Built → Sent → Interpreted.
//!
//! Every stage short-circuits on failure and nothing is retried: a failed upstream
//! call becomes exactly one error response.

use tracing::{debug, info};

use crate::errors::AppError;
use crate::generation::interpreter::{interpret, InterpretedResult};
use crate::generation::prompts::build_prompt;
use crate::generation::request::GenerationRequest;
use crate::llm_client::TextGenerator;

/// Builds the prompt, makes a single generation call, and interprets the reply.
///
/// Upstream failures are returned as their `AppError` counterpart. A reply that does
/// not fit the request's expectation comes back as `InterpretedResult::ParseFailure`
/// so each caller can phrase its own error.
pub async fn run_generation(
    generator: &dyn TextGenerator,
    request: &GenerationRequest,
) -> Result<InterpretedResult, AppError> {
    let prompt = build_prompt(request);
    let params = request.parameters();
    debug!(
        "Sending prompt ({} chars, max_output_tokens={})",
        prompt.len(),
        params.max_output_tokens
    );

    let raw = generator.generate(&prompt, &params).await;
    if let Err(failure) = &raw {
        return Err(failure.clone().into());
    }

    let expectation = request.expectation();
    let result = interpret(&raw, expectation);
    info!("Interpreted reply as {:?}: {}", expectation, result.kind());
    Ok(result)
}

/// Unwraps a plain-text result, reporting anything else with `what` as the subject.
pub fn expect_text(result: InterpretedResult, what: &str) -> Result<String, AppError> {
    match result {
        InterpretedResult::PlainText(text) => Ok(text),
        InterpretedResult::ParseFailure { raw } => Err(AppError::ResponseParse {
            message: format!("Failed to generate {what}"),
            raw,
        }),
        other => Err(AppError::Internal(anyhow::anyhow!(
            "expected plain text for {what}, got {}",
            other.kind()
        ))),
    }
}
