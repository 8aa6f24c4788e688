use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::GenerationFailure;
use crate::profiles::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} is not configured")]
    ConfigurationMissing(&'static str),

    #[error("Generation service rate limit exceeded, try again later")]
    UpstreamRateLimited(String),

    #[error("Generation service rejected the configured credentials")]
    UpstreamAuthInvalid(String),

    #[error("Generation service request failed")]
    UpstreamTransport(String),

    #[error("Generation service returned an empty response")]
    UpstreamEmptyResponse,

    #[error("{message}")]
    ResponseParse {
        message: String,
        raw: Option<String>,
    },

    #[error("Failed to store generated records")]
    Persistence(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<GenerationFailure> for AppError {
    fn from(failure: GenerationFailure) -> Self {
        match failure {
            GenerationFailure::RateLimited(detail) => AppError::UpstreamRateLimited(detail),
            GenerationFailure::AuthInvalid(detail) => AppError::UpstreamAuthInvalid(detail),
            GenerationFailure::EmptyResponse => AppError::UpstreamEmptyResponse,
            GenerationFailure::Transport(detail) => AppError::UpstreamTransport(detail),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::ConfigurationMissing(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::UpstreamRateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::UpstreamAuthInvalid(_)
            | AppError::UpstreamTransport(_)
            | AppError::UpstreamEmptyResponse
            | AppError::ResponseParse { .. } => StatusCode::BAD_GATEWAY,
            AppError::Persistence(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::UpstreamRateLimited(detail)
            | AppError::UpstreamAuthInvalid(detail)
            | AppError::UpstreamTransport(detail) => {
                tracing::error!("Generation error: {self}: {detail}");
            }
            AppError::UpstreamEmptyResponse => tracing::error!("Generation error: {self}"),
            AppError::ResponseParse { message, raw } => {
                tracing::error!("Response parse error: {message}. Raw response: {raw:?}");
            }
            AppError::Persistence(e) => tracing::error!("Persistence error: {e}"),
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
            AppError::ConfigurationMissing(what) => {
                tracing::warn!("Request needs {what}, which is not configured");
            }
            AppError::Validation(_) => {}
        }

        let status = self.status_code();
        let body = match self {
            AppError::ResponseParse {
                message,
                raw: Some(raw),
            } => json!({ "error": message, "raw_response": raw }),
            AppError::Internal(_) => json!({ "error": "An internal server error occurred" }),
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    async fn body_of(error: AppError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_generation_failures_map_to_taxonomy() {
        assert!(matches!(
            AppError::from(GenerationFailure::RateLimited("x".into())),
            AppError::UpstreamRateLimited(_)
        ));
        assert!(matches!(
            AppError::from(GenerationFailure::AuthInvalid("x".into())),
            AppError::UpstreamAuthInvalid(_)
        ));
        assert!(matches!(
            AppError::from(GenerationFailure::EmptyResponse),
            AppError::UpstreamEmptyResponse
        ));
        assert!(matches!(
            AppError::from(GenerationFailure::Transport("x".into())),
            AppError::UpstreamTransport(_)
        ));
    }

    #[tokio::test]
    async fn test_parse_error_body_carries_raw_response() {
        let (status, body) = body_of(AppError::ResponseParse {
            message: "Failed to generate valid news feed items".to_string(),
            raw: Some("nope".to_string()),
        })
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Failed to generate valid news feed items");
        assert_eq!(body["raw_response"], "nope");
    }

    #[tokio::test]
    async fn test_error_body_is_flat_message() {
        let (status, body) = body_of(AppError::ConfigurationMissing("Text generation")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, json!({"error": "Text generation is not configured"}));
    }

    #[tokio::test]
    async fn test_upstream_detail_is_not_leaked() {
        let (status, body) =
            body_of(AppError::UpstreamAuthInvalid("API key not valid: AIza...".into())).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(!body["error"].as_str().unwrap().contains("AIza"));
    }
}
