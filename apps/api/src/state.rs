use std::sync::Arc;

use crate::errors::AppError;
use crate::llm_client::TextGenerator;
use crate::profiles::store::ProfileStore;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Built once at startup and read-only afterwards. A collaborator is `None` when its
/// credentials were missing; handlers that need it fail with `ConfigurationMissing`.
#[derive(Clone)]
pub struct AppState {
    pub generator: Option<Arc<dyn TextGenerator>>,
    pub store: Option<Arc<dyn ProfileStore>>,
    /// Datastore collection that receives generated profiles.
    pub profiles_table: String,
}

impl AppState {
    pub fn generator(&self) -> Result<&dyn TextGenerator, AppError> {
        self.generator
            .as_deref()
            .ok_or(AppError::ConfigurationMissing("Text generation"))
    }

    pub fn store(&self) -> Result<&dyn ProfileStore, AppError> {
        self.store
            .as_deref()
            .ok_or(AppError::ConfigurationMissing("Profile storage"))
    }
}
