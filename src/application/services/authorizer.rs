//! Session and role gating for portal routes.

use std::sync::Arc;

use crate::domain::entities::Session;
use crate::domain::repositories::SessionProvider;
use crate::domain::request::GuardRequest;
use crate::domain::route_map::Access;
use crate::error::AppError;

/// Decides whether the request's session satisfies a route's [`Access`].
pub struct Authorizer {
    sessions: Arc<dyn SessionProvider>,
    sign_in_path: String,
}

impl Authorizer {
    /// Creates a new authorizer.
    ///
    /// # Arguments
    ///
    /// - `sessions` - resolves the session cookie
    /// - `sign_in_path` - page that denied requests are redirected to
    pub fn new(sessions: Arc<dyn SessionProvider>, sign_in_path: impl Into<String>) -> Self {
        Self {
            sessions,
            sign_in_path: sign_in_path.into(),
        }
    }

    /// Checks `access` for `req`.
    ///
    /// Public routes pass without touching the session provider. Otherwise
    /// the resolved session is returned so it can be handed downstream.
    ///
    /// # Errors
    ///
    /// - [`AppError::Unauthenticated`] if no valid session is present
    /// - [`AppError::Forbidden`] if the session lacks the required role
    /// - [`AppError::Internal`] if the session provider fails
    ///
    /// Both denials redirect to the sign-in page with a `callbackUrl`
    /// pointing back at the requested path.
    pub async fn authorize(
        &self,
        access: Access,
        req: &GuardRequest,
    ) -> Result<Option<Session>, AppError> {
        if access == Access::Public {
            return Ok(None);
        }

        let session = match &req.cookies.session {
            Some(token) => self.sessions.resolve(token).await?,
            None => None,
        };

        let Some(session) = session else {
            tracing::debug!(path = %req.path, "No valid session, redirecting to sign-in");
            return Err(AppError::unauthenticated(self.sign_in_url(&req.path)));
        };

        if let Access::Role(required) = access
            && session.role != required
        {
            tracing::warn!(
                path = %req.path,
                user_id = %session.user_id,
                role = %session.role,
                required = %required,
                "Role does not grant access"
            );
            return Err(AppError::forbidden(self.sign_in_url(&req.path)));
        }

        Ok(Some(session))
    }

    /// Sign-in page URL carrying the originally requested path.
    fn sign_in_url(&self, callback: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(callback.as_bytes()).collect();
        format!("{}?callbackUrl={}", self.sign_in_path, encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Role;
    use crate::domain::repositories::MockSessionProvider;
    use crate::domain::request::{ConsumedCookies, ConsumedHeaders};
    use axum::http::Method;
    use chrono::{Duration, Utc};

    fn request(path: &str, session: Option<&str>) -> GuardRequest {
        GuardRequest {
            method: Method::GET,
            path: path.to_string(),
            headers: ConsumedHeaders::default(),
            cookies: ConsumedCookies {
                csrf_token: None,
                session: session.map(str::to_string),
            },
            peer: None,
        }
    }

    fn session(role: Role) -> Session {
        Session::new("user-1", role, Utc::now() + Duration::hours(1))
    }

    fn authorizer(provider: MockSessionProvider) -> Authorizer {
        Authorizer::new(Arc::new(provider), "/campus/auth/login")
    }

    #[tokio::test]
    async fn test_public_route_skips_provider() {
        let mut provider = MockSessionProvider::new();
        provider.expect_resolve().never();

        let result = authorizer(provider)
            .authorize(Access::Public, &request("/campus/auth/login", Some("tok")))
            .await;

        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn test_missing_cookie_redirects_with_callback() {
        let mut provider = MockSessionProvider::new();
        provider.expect_resolve().never();

        let err = authorizer(provider)
            .authorize(Access::Session, &request("/campus/grades", None))
            .await
            .unwrap_err();

        match err {
            AppError::Unauthenticated { sign_in } => {
                assert_eq!(sign_in, "/campus/auth/login?callbackUrl=%2Fcampus%2Fgrades");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_session_is_unauthenticated() {
        let mut provider = MockSessionProvider::new();
        provider
            .expect_resolve()
            .withf(|token| token == "forged")
            .times(1)
            .returning(|_| Ok(None));

        let err = authorizer(provider)
            .authorize(Access::Session, &request("/campus", Some("forged")))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Unauthenticated { .. }));
    }

    #[tokio::test]
    async fn test_valid_session_passes() {
        let mut provider = MockSessionProvider::new();
        provider
            .expect_resolve()
            .times(1)
            .returning(|_| Ok(Some(session(Role::Student))));

        let result = authorizer(provider)
            .authorize(Access::Session, &request("/campus", Some("tok")))
            .await
            .unwrap();

        assert_eq!(result.map(|s| s.role), Some(Role::Student));
    }

    #[tokio::test]
    async fn test_wrong_role_is_forbidden() {
        let mut provider = MockSessionProvider::new();
        provider
            .expect_resolve()
            .times(1)
            .returning(|_| Ok(Some(session(Role::Teacher))));

        let err = authorizer(provider)
            .authorize(Access::Role(Role::Admin), &request("/admin/users", Some("tok")))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_admin_role_passes() {
        let mut provider = MockSessionProvider::new();
        provider
            .expect_resolve()
            .times(1)
            .returning(|_| Ok(Some(session(Role::Admin))));

        let result = authorizer(provider)
            .authorize(Access::Role(Role::Admin), &request("/admin", Some("tok")))
            .await;

        assert!(matches!(result, Ok(Some(_))));
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let mut provider = MockSessionProvider::new();
        provider
            .expect_resolve()
            .times(1)
            .returning(|_| Err(AppError::internal("store down")));

        let err = authorizer(provider)
            .authorize(Access::Session, &request("/campus", Some("tok")))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Internal(_)));
    }
}
