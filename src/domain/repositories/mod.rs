//! Repository trait definitions for the domain layer.
//!
//! These traits abstract the two pieces of state the gate depends on, so
//! the backing implementation can be swapped without touching call sites.
//!
//! # Architecture
//!
//! - Traits define the contract for state access
//! - Implementations live in `crate::infrastructure`
//! - Mock implementations are auto-generated via `mockall` for testing
//!
//! # Available Repositories
//!
//! - [`RateStore`] - Per-client rate-limit counters
//! - [`SessionProvider`] - Session lookup from the session cookie

pub mod rate_store;
pub mod session_provider;

pub use rate_store::{RateStore, StoreError, StoreResult};
pub use session_provider::SessionProvider;

#[cfg(test)]
pub use rate_store::MockRateStore;
#[cfg(test)]
pub use session_provider::MockSessionProvider;
