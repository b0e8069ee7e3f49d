//! Application layer services implementing the gate's decisions.
//!
//! Services consume repository traits and the structured
//! [`crate::domain::request::GuardRequest`], and return either a pass or an
//! [`crate::error::AppError`] for the middleware to render.
//!
//! # Available Services
//!
//! - [`services::rate_limiter::RateLimiter`] - Fixed-window per-client rate limiting
//! - [`services::csrf_guard::CsrfGuard`] - Anti-forgery token issuance and validation
//! - [`services::authorizer::Authorizer`] - Session and role gating

pub mod services;
