//! Request-gating services for the application layer.

pub mod authorizer;
pub mod csrf_guard;
pub mod rate_limiter;

pub use authorizer::Authorizer;
pub use csrf_guard::{CsrfGuard, IssuedToken};
pub use rate_limiter::{RateLimitPolicy, RateLimiter};
