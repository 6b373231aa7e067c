//! Router assembly.

pub mod cards;
pub mod register;
pub mod registrations;

#[cfg(test)]
pub(crate) mod test_support;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Largest accepted request body; profile photos arrive as raw bytes.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/register", get(register::lookup).post(register::submit))
        .route("/api/registrations", get(registrations::list))
        .route("/api/registrations/export", get(registrations::export))
        .route("/api/social-card", post(cards::social_card))
        .route("/api/cards/preview", post(cards::preview))
        .route("/api/photos", post(cards::upload_photo))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
