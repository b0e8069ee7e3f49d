//! # Campus Gate
//!
//! Request-level security gate for the campus portal, built with Axum.
//!
//! Every inbound request passes one composed middleware that rate limits
//! login and API traffic, enforces double-submit CSRF tokens, gates campus
//! and admin pages by session role, and hardens every response with
//! security headers.
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture principles with clear layer separation:
//!
//! - **Domain Layer** ([`domain`]) - Request view, route classification, entities and store traits
//! - **Application Layer** ([`application`]) - Rate limiter, CSRF guard and authorizer
//! - **Infrastructure Layer** ([`infrastructure`]) - Memory/Redis rate stores, sweeper, signed sessions
//! - **API Layer** ([`api`]) - Middleware, health handler and DTOs
//!
//! ## Quick Start
//!
//! ```bash
//! # Set required environment variables
//! export SESSION_SECRET="$(cargo run --bin admin -- secret generate --raw)"
//! export REDIS_URL="redis://localhost:6379"  # Optional
//!
//! # Start the service
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{
        Authorizer, CsrfGuard, RateLimitPolicy, RateLimiter,
    };
    pub use crate::domain::entities::{Role, Session};
    pub use crate::domain::repositories::{RateStore, SessionProvider};
    pub use crate::error::AppError;
    pub use crate::infrastructure::rate_store::MemoryRateStore;
    pub use crate::infrastructure::session::SignedCookieSessions;
    pub use crate::state::AppState;
}
