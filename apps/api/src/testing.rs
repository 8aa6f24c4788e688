//! In-memory collaborators for handler and pipeline tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::llm_client::{GenerationFailure, GenerationParameters, RawModelResponse, TextGenerator};
use crate::profiles::models::ProfileRecord;
use crate::profiles::store::{ProfileStore, StoreError};
use crate::state::AppState;

/// Replies to every call with the same canned response and records what it was sent.
pub struct MockGenerator {
    reply: RawModelResponse,
    calls: Mutex<Vec<(String, GenerationParameters)>>,
}

impl MockGenerator {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(failure: GenerationFailure) -> Self {
        Self {
            reply: Err(failure),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, GenerationParameters)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str, params: &GenerationParameters) -> RawModelResponse {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), params.clone()));
        self.reply.clone()
    }
}

/// Records every batch it receives; optionally rejects all of them.
#[derive(Default)]
pub struct MockStore {
    reject: bool,
    batches: Mutex<Vec<(String, Vec<ProfileRecord>)>>,
}

impl MockStore {
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    pub fn batches(&self) -> Vec<(String, Vec<ProfileRecord>)> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProfileStore for MockStore {
    async fn insert_batch(
        &self,
        collection: &str,
        records: &[ProfileRecord],
    ) -> Result<Vec<Value>, StoreError> {
        self.batches
            .lock()
            .unwrap()
            .push((collection.to_string(), records.to_vec()));
        if self.reject {
            return Err(StoreError::Rejected {
                status: 500,
                message: "insert failed".to_string(),
            });
        }
        Ok(records
            .iter()
            .map(|r| serde_json::to_value(r).unwrap())
            .collect())
    }
}

pub fn state_with(
    generator: Option<Arc<MockGenerator>>,
    store: Option<Arc<MockStore>>,
) -> AppState {
    AppState {
        generator: generator.map(|g| g as Arc<dyn TextGenerator>),
        store: store.map(|s| s as Arc<dyn ProfileStore>),
        profiles_table: "profiles".to_string(),
    }
}
