//! Double-submit cookie CSRF protection.
//!
//! A single random token lives in a script-readable cookie for the life of
//! the browser session. Same-origin script echoes it in the `x-csrf-token`
//! header; a cross-site form cannot read the cookie and so cannot forge the
//! header. There is no rotation and no binding to the session identity.

use constant_time_eq::constant_time_eq;

use crate::domain::request::{CSRF_COOKIE, GuardRequest};
use crate::error::AppError;
use crate::utils::cookies::format_script_cookie;

/// A freshly generated token and the `Set-Cookie` value that carries it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub set_cookie: String,
}

/// Issues and validates anti-forgery tokens.
#[derive(Debug, Clone)]
pub struct CsrfGuard {
    secure_cookie: bool,
}

impl CsrfGuard {
    /// Creates a guard; `secure_cookie` adds the `Secure` attribute and
    /// should be set in production.
    pub fn new(secure_cookie: bool) -> Self {
        Self { secure_cookie }
    }

    /// Generates a 64-character lowercase hex token from 32 random bytes.
    pub fn generate_token() -> String {
        let bytes: [u8; 32] = rand::random();
        hex::encode(bytes)
    }

    /// Applies the guard according to the request method.
    ///
    /// Safe requests always pass and may receive a new token; mutating
    /// requests must carry a matching cookie/header pair.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::CsrfMismatch`] for a mutating request without a
    /// valid token pair.
    pub fn protect(&self, req: &GuardRequest) -> Result<Option<IssuedToken>, AppError> {
        if req.is_safe_method() {
            Ok(self.issue(req))
        } else {
            self.verify(req).map(|()| None)
        }
    }

    /// Returns a new token if the request carries no token cookie.
    ///
    /// An existing cookie is never replaced.
    pub fn issue(&self, req: &GuardRequest) -> Option<IssuedToken> {
        if req.cookies.csrf_token.is_some() {
            return None;
        }

        let token = Self::generate_token();
        let set_cookie = format_script_cookie(CSRF_COOKIE, &token, self.secure_cookie);
        Some(IssuedToken { token, set_cookie })
    }

    /// Checks that cookie and header tokens are both present and equal.
    ///
    /// The comparison runs in constant time.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::CsrfMismatch`] if either token is missing or the
    /// two differ.
    pub fn verify(&self, req: &GuardRequest) -> Result<(), AppError> {
        match (&req.cookies.csrf_token, &req.headers.csrf_token) {
            (Some(cookie), Some(header))
                if constant_time_eq(cookie.as_bytes(), header.as_bytes()) =>
            {
                Ok(())
            }
            _ => {
                tracing::warn!(method = %req.method, path = %req.path, "CSRF token rejected");
                Err(AppError::CsrfMismatch)
            }
        }
    }
}
