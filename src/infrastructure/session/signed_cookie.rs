//! HMAC-signed session cookies.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{debug, error};

use crate::domain::entities::{Role, Session};
use crate::domain::repositories::SessionProvider;
use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Claims carried in the session cookie payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User identifier.
    pub sub: String,
    pub role: Role,
    /// Expiry as a Unix timestamp in seconds.
    pub exp: i64,
}

/// Stateless sessions stored entirely in the cookie.
///
/// Cookie format:
///
/// ```text
/// <base64url(json claims)>.<hex(hmac_sha256(secret, base64url part))>
/// ```
///
/// A client can read its claims but cannot alter them without the
/// server-side secret.
pub struct SignedCookieSessions {
    secret: String,
}

impl SignedCookieSessions {
    /// Creates a provider; `secret` must match the one used by the issuer.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn mac(&self) -> Result<HmacSha256, AppError> {
        HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| AppError::internal(format!("Invalid session key: {}", e)))
    }

    /// Encodes and signs a session as a cookie value.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the claims cannot be serialized or
    /// the key is rejected by HMAC.
    pub fn issue(&self, session: &Session) -> Result<String, AppError> {
        let claims = SessionClaims {
            sub: session.user_id.clone(),
            role: session.role,
            exp: session.expires_at.timestamp(),
        };
        let json = serde_json::to_vec(&claims)
            .map_err(|e| AppError::internal(format!("Failed to encode session: {}", e)))?;
        let payload = URL_SAFE_NO_PAD.encode(json);

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        Ok(format!("{payload}.{signature}"))
    }

    /// Decodes the claims without checking the signature or expiry.
    ///
    /// For diagnostics only; never use the result for access decisions.
    pub fn decode_unverified(token: &str) -> Option<SessionClaims> {
        let (payload, _) = token.split_once('.')?;
        let json = URL_SAFE_NO_PAD.decode(payload).ok()?;
        serde_json::from_slice(&json).ok()
    }

    /// Verifies a cookie value and returns its session.
    ///
    /// Returns `None` if the value is malformed, the signature does not
    /// match (checked in constant time), or the session has expired.
    pub fn verify(&self, token: &str) -> Option<Session> {
        let (payload, signature) = token.split_once('.')?;
        let signature = hex::decode(signature).ok()?;

        let mut mac = match self.mac() {
            Ok(mac) => mac,
            Err(e) => {
                error!("Cannot verify session: {}", e);
                return None;
            }
        };
        mac.update(payload.as_bytes());
        if mac.verify_slice(&signature).is_err() {
            debug!("Session signature mismatch");
            return None;
        }

        let claims = Self::decode_unverified(token)?;
        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0)?;
        let session = Session::new(claims.sub, claims.role, expires_at);

        if session.is_expired() {
            debug!(user_id = %session.user_id, "Session expired");
            return None;
        }

        Some(session)
    }
}

#[async_trait]
impl SessionProvider for SignedCookieSessions {
    async fn resolve(&self, token: &str) -> Result<Option<Session>, AppError> {
        Ok(self.verify(token))
    }
}
