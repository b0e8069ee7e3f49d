//! Composed entry point installed in front of every route.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::{csrf, rate_limit, security_headers};
use crate::application::services::IssuedToken;
use crate::domain::request::GuardRequest;
use crate::error::AppError;
use crate::state::AppState;

/// Runs every protection for one request, in order, stopping at the first
/// rejection.
///
/// # Pipeline
///
/// 1. Decode and canonicalize the path (`400` if it has `..` or is not
///    UTF-8), then classify it; `/`, `/_next/*` and `/public/*` skip steps 2-4
/// 2. Mutating request to the login endpoint: login limiter
/// 3. Path under `/api`: API limiter
/// 4. Mutating request under `/api` or on an `auth` route: CSRF validation.
///    Safe requests without a token get one on the response
/// 5. Session and role gating (see [`super::authorize::layer`])
/// 6. Security headers on whatever response was produced
///
/// Every decision is made on the decoded path, the same one a file server
/// resolves, so `/%61dmin/...` is gated like `/admin/...`.
///
/// A rejected request never reaches the handler. Its 400, 429, 403 or
/// redirect still carries the security headers.
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/health", get(health_handler))
///     .layer(middleware::from_fn_with_state(state.clone(), gate::layer));
/// ```
pub async fn layer(State(st): State<AppState>, mut req: Request, next: Next) -> Response {
    let checked = match GuardRequest::from_request(&req, &st.session_cookie) {
        Ok(guard) => check(&st, &guard).await,
        Err(err) => Err(err),
    };

    let mut response = match checked {
        Ok(outcome) => {
            if let Some(session) = outcome.session {
                req.extensions_mut().insert(session);
            }

            let mut response = next.run(req).await;
            if let Some(issued) = outcome.issued {
                csrf::attach_token(&mut response, &issued);
            }
            response
        }
        Err(err) => super::reject(err),
    };

    security_headers::apply(response.headers_mut());
    response
}

#[derive(Debug, Default)]
struct Admitted {
    session: Option<crate::domain::entities::Session>,
    issued: Option<IssuedToken>,
}

async fn check(st: &AppState, guard: &GuardRequest) -> Result<Admitted, AppError> {
    let class = st.routes.classify(&guard.method, &guard.path);

    if class.login_attempt {
        rate_limit::enforce(&st.login_limiter, guard, st.identity_source).await?;
    }

    if class.api {
        rate_limit::enforce(&st.api_limiter, guard, st.identity_source).await?;
    }

    let issued = if class.csrf_validate {
        st.csrf.verify(guard)?;
        None
    } else if class.csrf_issue {
        st.csrf.issue(guard)
    } else {
        None
    };

    let session = st.authorizer.authorize(class.access, guard).await?;

    Ok(Admitted { session, issued })
}
