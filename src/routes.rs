//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health`     - Health check: rate store (public)
//! - everything else    - Campus frontend served from the static directory
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Gate** - Rate limiting, CSRF, session/role gating, security headers
//! - **Path normalization** - Trailing slash handling

use crate::api::handlers::health_handler;
use crate::api::middleware::{gate, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::services::ServeDir;

/// Puts `downstream` and the health endpoint behind the gate.
///
/// The gate also covers `downstream`'s fallback, so unmatched paths are
/// protected like any other.
pub fn gated(downstream: Router<AppState>, state: AppState) -> Router {
    downstream
        .route("/health", get(health_handler))
        .layer(middleware::from_fn_with_state(state.clone(), gate::layer))
        .with_state(state)
        .layer(tracing::layer())
}

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `static_dir` - build output of the campus frontend
pub fn app_router(state: AppState, static_dir: &str) -> NormalizePath<Router> {
    let frontend = Router::new().fallback_service(ServeDir::new(static_dir));

    NormalizePathLayer::trim_trailing_slash().layer(gated(frontend, state))
}
