pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers;
use crate::profiles::handlers::handle_generate_dummy_profiles;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/generate-profile/", post(handlers::handle_generate_profile))
        .route(
            "/generate-news-feed/",
            post(handlers::handle_generate_news_feed),
        )
        .route(
            "/generate-daily-prompt/",
            get(handlers::handle_generate_daily_prompt),
        )
        .route(
            "/generate-dummy-profiles/",
            post(handle_generate_dummy_profiles),
        )
        .route("/match-users", post(handlers::handle_match_users))
        .with_state(state)
}
