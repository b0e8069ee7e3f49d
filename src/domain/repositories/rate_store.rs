//! Repository trait for rate-limit counters.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

use crate::domain::entities::RateRecord;

/// Errors that can occur in a rate store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Rate store connection error: {0}")]
    Connection(String),
    #[error("Rate store operation error: {0}")]
    Operation(String),
}

/// Result type for rate store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Storage for per-client [`RateRecord`]s.
///
/// Holds at most one record per key. Callers namespace keys per limiter so
/// several policies can share one store.
///
/// # Implementations
///
/// - [`crate::infrastructure::rate_store::MemoryRateStore`] - Process-local map
/// - [`crate::infrastructure::rate_store::RedisRateStore`] - Shared across instances
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateStore: Send + Sync {
    /// Counts one request for `key` and returns the updated record.
    ///
    /// If no record exists, or the stored one expired at or before `now`, a
    /// fresh record with `reset_at = now + window` replaces it before the
    /// increment. The lookup, replacement and increment happen as one atomic
    /// step per key, so concurrent requests never lose a count.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend is unreachable. The in-memory
    /// store never fails.
    async fn increment(&self, key: &str, window: Duration, now: Instant)
    -> StoreResult<RateRecord>;

    /// Deletes every record whose window ended at or before `now`.
    ///
    /// Returns the number of records removed. Backends that expire keys on
    /// their own return `Ok(0)`.
    async fn sweep(&self, now: Instant) -> StoreResult<usize>;

    /// Checks if the backend is reachable.
    ///
    /// Used by the health endpoint.
    async fn health_check(&self) -> bool;
}
