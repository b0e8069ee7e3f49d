//! Session cookie verification.

mod signed_cookie;

pub use signed_cookie::{SessionClaims, SignedCookieSessions};
