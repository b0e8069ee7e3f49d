//! Repository trait for session lookup.

use async_trait::async_trait;

use crate::domain::entities::Session;
use crate::error::AppError;

/// Resolves the session cookie into an authenticated [`Session`].
///
/// The gate only reads sessions; issuing them belongs to the portal's sign-in
/// flow.
///
/// # Implementations
///
/// - [`crate::infrastructure::session::SignedCookieSessions`] - HMAC-signed cookie payloads
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Resolves a raw session cookie value.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(session))` for a valid, unexpired session
    /// - `Ok(None)` if the token is malformed, forged or expired
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the backing session store fails.
    async fn resolve(&self, token: &str) -> Result<Option<Session>, AppError>;
}
