//! Infrastructure layer for state backends.
//!
//! This layer implements interfaces defined by the domain layer.
//!
//! # Modules
//!
//! - [`rate_store`] - Rate-limit counter storage (in-memory and Redis) and its sweeper
//! - [`session`] - HMAC-signed session cookies

pub mod rate_store;
pub mod session;
