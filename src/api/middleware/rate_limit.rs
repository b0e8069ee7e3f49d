//! Fixed-window rate limiting middleware.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tokio::time::Instant;

use crate::application::services::RateLimiter;
use crate::domain::request::GuardRequest;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::{IdentitySource, resolve_identity};

/// Counts `req` against `limiter`.
///
/// The client identity comes from `source`; clients without one share the
/// `"unknown"` counter.
///
/// # Errors
///
/// Returns [`AppError::RateExceeded`] when the client is over its quota.
pub async fn enforce(
    limiter: &RateLimiter,
    req: &GuardRequest,
    source: IdentitySource,
) -> Result<(), AppError> {
    let identity = resolve_identity(source, req.headers.forwarded_client.as_deref(), req.peer);
    limiter.check(&identity, Instant::now()).await
}

/// Applies the API policy to every request passing through.
///
/// Requests exceeding the limit receive `429 Too Many Requests` with a
/// `Retry-After` header and a JSON body:
///
/// ```json
/// {"error": "Too many requests, please try again later.", "retryAfter": 42}
/// ```
///
/// # Example
///
/// ```rust,ignore
/// let api = Router::new()
///     .route("/subjects", get(list_subjects))
///     .layer(middleware::from_fn_with_state(state.clone(), rate_limit::api_layer));
/// ```
pub async fn api_layer(State(st): State<AppState>, req: Request, next: Next) -> Response {
    limited(&st.api_limiter, &st, req, next).await
}

/// Applies the strict login policy to every request passing through.
pub async fn login_layer(State(st): State<AppState>, req: Request, next: Next) -> Response {
    limited(&st.login_limiter, &st, req, next).await
}

async fn limited(limiter: &RateLimiter, st: &AppState, req: Request, next: Next) -> Response {
    let guard = match GuardRequest::from_request(&req, &st.session_cookie) {
        Ok(guard) => guard,
        Err(err) => return super::reject(err),
    };

    match enforce(limiter, &guard, st.identity_source).await {
        Ok(()) => next.run(req).await,
        Err(err) => super::reject(err),
    }
}
