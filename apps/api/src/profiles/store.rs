//! Persistence collaborator — batch inserts into the external datastore.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::profiles::models::ProfileRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("datastore rejected the insert (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("unreadable datastore response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Datastore seam. Carried in `AppState` as `Arc<dyn ProfileStore>`.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Inserts all records as one batch, returning the rows the datastore reports back.
    async fn insert_batch(
        &self,
        collection: &str,
        records: &[ProfileRecord],
    ) -> Result<Vec<Value>, StoreError>;
}

#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: String,
}

/// `ProfileStore` over the Supabase PostgREST API.
#[derive(Clone)]
pub struct SupabaseStore {
    client: Client,
    base_url: String,
    service_key: String,
}

impl SupabaseStore {
    pub fn new(base_url: &str, service_key: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
        })
    }
}

#[async_trait]
impl ProfileStore for SupabaseStore {
    async fn insert_batch(
        &self,
        collection: &str,
        records: &[ProfileRecord],
    ) -> Result<Vec<Value>, StoreError> {
        let url = format!("{}/rest/v1/{}", self.base_url, collection);

        let response = self
            .client
            .post(&url)
            .query(&[("columns", batch_columns(records))])
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .header("Prefer", "return=representation")
            .json(records)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("Supabase insert into '{}' returned {}: {}", collection, status, body);
            let message = serde_json::from_str::<PostgrestError>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let inserted: Vec<Value> = serde_json::from_str(&body)?;
        debug!("Supabase inserted {} rows into '{}'", inserted.len(), collection);
        Ok(inserted)
    }
}

/// Union of keys across the batch, in order of first appearance.
///
/// PostgREST requires every object in a bulk insert to share the same keys unless
/// `columns` names them; absent keys are then inserted as null.
fn batch_columns(records: &[ProfileRecord]) -> String {
    let mut columns: Vec<&str> = vec!["id", "email", "created_at", "updated_at"];
    for record in records {
        for key in record.fields.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }
    columns.join(",")
}
