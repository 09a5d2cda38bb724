//! Route definitions

use axum::{
    Router,
    routing::{get, post},
};

use crate::{handlers, state::AppState};

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health and status endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        // Telephony webhook
        .route("/webhook/call", post(handlers::calls::receive_call))
        // Direct question API
        .route("/query", post(handlers::queries::ask_question))
        .route("/queries", get(handlers::queries::list_queries))
        // Synthesized answers fetched by the voice call
        .route("/static/tts/{file}", get(handlers::media::serve_audio))
        .with_state(state)
}
