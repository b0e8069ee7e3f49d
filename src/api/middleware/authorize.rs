//! Session and role gating for portal pages.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::domain::request::GuardRequest;
use crate::state::AppState;

/// Gates pages by session and role.
///
/// # Access Rules
///
/// - `/campus/auth/*`: always allowed (sign-in and registration)
/// - `/campus/*`: any valid session
/// - `/admin/*`: a session with role `admin`
/// - everything else: allowed
///
/// On success the resolved [`crate::domain::entities::Session`] is added
/// to the request extensions for downstream handlers.
///
/// # Differences from API errors
///
/// Denied requests are redirected to the sign-in page rather than answered
/// with `401`/`403`, since these are browser page loads:
///
/// ```text
/// 307 Location: /campus/auth/login?callbackUrl=%2Fadmin%2Fusers
/// ```
///
/// # Example
///
/// ```rust,ignore
/// let pages = Router::new()
///     .route("/admin/users", get(users_page))
///     .layer(middleware::from_fn_with_state(state.clone(), authorize::layer));
/// ```
pub async fn layer(State(st): State<AppState>, mut req: Request, next: Next) -> Response {
    let guard = match GuardRequest::from_request(&req, &st.session_cookie) {
        Ok(guard) => guard,
        Err(err) => return super::reject(err),
    };
    let access = st.routes.access(&guard.path);

    match st.authorizer.authorize(access, &guard).await {
        Ok(session) => {
            if let Some(session) = session {
                req.extensions_mut().insert(session);
            }
            next.run(req).await
        }
        Err(err) => super::reject(err),
    }
}
