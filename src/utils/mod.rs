//! Helper functions for request inspection.
//!
//! - [`client_ip`] - Client identity extraction for rate limiting
//! - [`cookies`] - Cookie header parsing and `Set-Cookie` formatting
//! - [`path`] - Request path canonicalization

pub mod client_ip;
pub mod cookies;
pub mod path;
