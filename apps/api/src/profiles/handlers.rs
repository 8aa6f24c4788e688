use std::num::NonZeroU32;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::profiles::seeder::seed_profiles;
use crate::state::AppState;

const MAX_DUMMY_PROFILES: u32 = 50;

#[derive(Debug, Deserialize)]
pub struct GenerateDummyProfilesRequest {
    #[serde(default = "default_count")]
    pub count: u32,
}

impl Default for GenerateDummyProfilesRequest {
    fn default() -> Self {
        Self {
            count: default_count(),
        }
    }
}

fn default_count() -> u32 {
    5
}

#[derive(Debug, Serialize)]
pub struct GenerateDummyProfilesResponse {
    pub message: String,
}

/// POST /generate-dummy-profiles/
///
/// Body is optional; `count` defaults to 5 and must be within 1..=50.
pub async fn handle_generate_dummy_profiles(
    State(state): State<AppState>,
    body: Result<Json<GenerateDummyProfilesRequest>, JsonRejection>,
) -> Result<Json<GenerateDummyProfilesResponse>, AppError> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(JsonRejection::MissingJsonContentType(_)) => GenerateDummyProfilesRequest::default(),
        Err(rejection) => return Err(rejection.into()),
    };

    let count = NonZeroU32::new(request.count)
        .filter(|c| c.get() <= MAX_DUMMY_PROFILES)
        .ok_or_else(|| {
            AppError::Validation(format!(
                "count must be between 1 and {MAX_DUMMY_PROFILES}"
            ))
        })?;

    let generator = state.generator()?;
    let store = state.store()?;

    let inserted = seed_profiles(generator, store, &state.profiles_table, count).await?;

    Ok(Json(GenerateDummyProfilesResponse {
        message: format!("Successfully inserted {inserted} dummy profiles"),
    }))
}
