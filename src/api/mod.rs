//! REST API module using Axum
//!
//! JSON endpoints for soil matching:
//! - `/health` liveness and table size
//! - `/api/v1/*` profiles, match and rank, wrapped in a consistent envelope

pub mod envelope;
pub mod handlers;
mod routes;

pub use handlers::ApiState;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::config::defaults;

/// Build a CORS layer that is restrictive by default (same-origin only).
///
/// Set `TBM_CORS_ORIGINS` to a comma-separated list of allowed origins for a
/// separately hosted operator front end.
fn build_cors_layer() -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);
    match std::env::var(defaults::CORS_ORIGINS_ENV_VAR) {
        Ok(origins) => {
            let allowed: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            tracing::info!(origins = %origins, "CORS: allowing configured origins");
            base.allow_origin(allowed)
        }
        Err(_) => base,
    }
}

/// Create the complete application router.
pub fn create_app(state: ApiState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes(state.clone()))
        .merge(routes::health_routes(state))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(RequestBodyLimitLayer::new(defaults::MAX_REQUEST_BODY_BYTES))
        .layer(build_cors_layer())
}
