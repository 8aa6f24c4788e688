mod config;
mod errors;
mod generation;
mod llm_client;
mod profiles;
mod routes;
mod state;
#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{GeminiClient, TextGenerator};
use crate::profiles::store::{ProfileStore, SupabaseStore};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails only on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Dating App AI Backend v{}", env!("CARGO_PKG_VERSION"));

    let timeout = Duration::from_secs(config.llm_timeout_secs);

    // Initialize the text generation client
    let generator: Option<Arc<dyn TextGenerator>> = match &config.gemini_api_key {
        Some(api_key) => {
            let client = GeminiClient::new(
                api_key.clone(),
                config.gemini_model.clone(),
                config.gemini_api_base.clone(),
                timeout,
            )?;
            info!(
                "Gemini client initialized (model: {}, timeout: {}s)",
                client.model(),
                config.llm_timeout_secs
            );
            Some(Arc::new(client) as Arc<dyn TextGenerator>)
        }
        None => {
            warn!("GEMINI_API_KEY not set; generation endpoints will return 503");
            None
        }
    };

    // Initialize the profile datastore
    let store: Option<Arc<dyn ProfileStore>> = match config.supabase_credentials() {
        Some((url, service_key)) => {
            let store = SupabaseStore::new(url, service_key, timeout)?;
            info!("Supabase store initialized ({url}, table: {})", config.profiles_table);
            Some(Arc::new(store) as Arc<dyn ProfileStore>)
        }
        None => {
            warn!("SUPABASE_URL or SUPABASE_SERVICE_KEY not set; profile seeding is disabled");
            None
        }
    };

    let state = AppState {
        generator,
        store,
        profiles_table: config.profiles_table.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
