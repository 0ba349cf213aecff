//! API route definitions
//!
//! - /api/v1/profiles - Active soil table
//! - /api/v1/match - Soil type and penetration rate for one reading
//! - /api/v1/rank - All profiles in selection order

use axum::{routing::get, Router};

use super::handlers::{self, ApiState};

/// Create all v1 API routes
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/profiles", get(handlers::get_profiles))
        .route("/match", get(handlers::get_match).post(handlers::post_match))
        .route("/rank", get(handlers::get_rank))
        .with_state(state)
}

/// Health endpoint at root level
pub fn health_routes(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state)
}
