//! Double-submit cookie CSRF middleware.

use axum::{
    extract::{Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};

use crate::application::services::IssuedToken;
use crate::domain::request::GuardRequest;
use crate::state::AppState;

/// Validates mutating requests and issues tokens on safe ones.
///
/// # Flow
///
/// 1. `GET`/`HEAD` without a `csrf_token` cookie: run the handler, then
///    attach a fresh token cookie to its response
/// 2. Any other method: require the `csrf_token` cookie and the
///    `X-CSRF-Token` header to be present and equal
///
/// # Errors
///
/// Responds `403 Forbidden` with `{"error":"Invalid CSRF token"}` when the
/// pair is missing or mismatched. The handler is not called.
///
/// # Example
///
/// ```rust,ignore
/// let api = Router::new()
///     .route("/subjects", post(create_subject))
///     .layer(middleware::from_fn_with_state(state.clone(), csrf::layer));
/// ```
pub async fn layer(State(st): State<AppState>, req: Request, next: Next) -> Response {
    let guard = match GuardRequest::from_request(&req, &st.session_cookie) {
        Ok(guard) => guard,
        Err(err) => return super::reject(err),
    };

    match st.csrf.protect(&guard) {
        Ok(issued) => {
            let mut response = next.run(req).await;
            if let Some(issued) = issued {
                attach_token(&mut response, &issued);
            }
            response
        }
        Err(err) => super::reject(err),
    }
}

/// Appends the token cookie to `response`, keeping any cookies the handler set.
pub fn attach_token(response: &mut Response, issued: &IssuedToken) {
    match HeaderValue::from_str(&issued.set_cookie) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(e) => tracing::error!("Invalid CSRF cookie header: {}", e),
    }
}
