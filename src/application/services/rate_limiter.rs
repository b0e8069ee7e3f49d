//! Fixed-window rate limiting over a [`RateStore`].

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::domain::repositories::RateStore;
use crate::error::{AppError, DEFAULT_RATE_LIMIT_MESSAGE};

/// Threshold and window for one class of routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_requests: u32,
    pub window: Duration,
    /// Error message for rejected requests; a generic one is used if unset.
    pub message: Option<String>,
}

impl RateLimitPolicy {
    /// Creates a policy allowing `max_requests` per `window_secs`.
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
            message: None,
        }
    }

    /// Sets the rejection message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Strict policy for the login endpoint: 5 requests per minute.
    pub fn login() -> Self {
        Self::new(5, 60).with_message("Too many login attempts, please try again later.")
    }

    /// Policy for general API traffic: 50 requests per minute.
    pub fn api() -> Self {
        Self::new(50, 60)
    }

    fn rejection_message(&self) -> &str {
        self.message.as_deref().unwrap_or(DEFAULT_RATE_LIMIT_MESSAGE)
    }
}

/// Per-client request counter for one policy.
///
/// Several limiters may share one store; each prefixes its keys with its
/// `scope` so their counters never collide.
pub struct RateLimiter {
    scope: &'static str,
    policy: RateLimitPolicy,
    store: Arc<dyn RateStore>,
}

impl RateLimiter {
    /// Creates a new rate limiter.
    ///
    /// # Arguments
    ///
    /// - `scope` - key namespace, e.g. `"login"` or `"api"`
    /// - `policy` - threshold and window
    /// - `store` - backing counter storage
    pub fn new(scope: &'static str, policy: RateLimitPolicy, store: Arc<dyn RateStore>) -> Self {
        Self {
            scope,
            policy,
            store,
        }
    }

    pub fn scope(&self) -> &'static str {
        self.scope
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    /// Counts one request from `identity` at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::RateExceeded`] once the post-increment count
    /// exceeds `max_requests`, carrying the whole seconds left in the window.
    ///
    /// A failing store does not reject: the request is allowed and the
    /// failure logged.
    pub async fn check(&self, identity: &str, now: Instant) -> Result<(), AppError> {
        let key = format!("{}:{}", self.scope, identity);

        let record = match self.store.increment(&key, self.policy.window, now).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(scope = self.scope, error = %e, "Rate store unavailable, allowing request");
                return Ok(());
            }
        };

        if record.count > self.policy.max_requests {
            let retry_after = record.retry_after_secs(now);
            tracing::warn!(
                scope = self.scope,
                identity = %identity,
                count = record.count,
                retry_after,
                "Rate limit exceeded"
            );
            return Err(AppError::rate_exceeded(
                self.policy.rejection_message(),
                retry_after,
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockRateStore, StoreError};
    use crate::infrastructure::rate_store::MemoryRateStore;

    fn limiter(max: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(
            "test",
            RateLimitPolicy::new(max, window_secs),
            Arc::new(MemoryRateStore::new()),
        )
    }

    #[test]
    fn test_builtin_policies() {
        let login = RateLimitPolicy::login();
        assert_eq!(login.max_requests, 5);
        assert_eq!(login.window, Duration::from_secs(60));
        assert!(login.message.is_some());

        let api = RateLimitPolicy::api();
        assert_eq!(api.max_requests, 50);
        assert_eq!(api.window, Duration::from_secs(60));
        assert_eq!(api.rejection_message(), DEFAULT_RATE_LIMIT_MESSAGE);
    }

    #[tokio::test]
    async fn test_allows_up_to_max_then_rejects() {
        let limiter = limiter(3, 60);
        let now = Instant::now();

        for _ in 0..3 {
            assert!(limiter.check("203.0.113.7", now).await.is_ok());
        }

        let err = limiter.check("203.0.113.7", now).await.unwrap_err();
        match err {
            AppError::RateExceeded {
                message,
                retry_after,
            } => {
                assert_eq!(message, DEFAULT_RATE_LIMIT_MESSAGE);
                assert_eq!(retry_after, 60);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_retry_after_counts_down() {
        let limiter = limiter(1, 60);
        let start = Instant::now();

        limiter.check("a", start).await.unwrap();
        let err = limiter
            .check("a", start + Duration::from_secs(45))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::RateExceeded { retry_after: 15, .. }));
    }

    #[tokio::test]
    async fn test_window_expiry_resets_count() {
        let limiter = limiter(2, 60);
        let start = Instant::now();

        limiter.check("a", start).await.unwrap();
        limiter.check("a", start).await.unwrap();
        assert!(limiter.check("a", start).await.is_err());

        let later = start + Duration::from_secs(60);
        assert!(limiter.check("a", later).await.is_ok());
        assert!(limiter.check("a", later).await.is_ok());
        assert!(limiter.check("a", later).await.is_err());
    }

    #[tokio::test]
    async fn test_identities_do_not_share_counters() {
        let limiter = limiter(1, 60);
        let now = Instant::now();

        limiter.check("203.0.113.7", now).await.unwrap();
        assert!(limiter.check("203.0.113.7", now).await.is_err());

        assert!(limiter.check("198.51.100.1", now).await.is_ok());
    }

    #[tokio::test]
    async fn test_scopes_do_not_share_counters() {
        let store: Arc<dyn RateStore> = Arc::new(MemoryRateStore::new());
        let login = RateLimiter::new("login", RateLimitPolicy::new(1, 60), store.clone());
        let api = RateLimiter::new("api", RateLimitPolicy::new(1, 60), store);
        let now = Instant::now();

        login.check("a", now).await.unwrap();
        assert!(api.check("a", now).await.is_ok());
    }

    #[tokio::test]
    async fn test_custom_message() {
        let limiter = RateLimiter::new(
            "login",
            RateLimitPolicy::login(),
            Arc::new(MemoryRateStore::new()),
        );
        let now = Instant::now();

        for _ in 0..5 {
            limiter.check("a", now).await.unwrap();
        }

        let err = limiter.check("a", now).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Too many login attempts, please try again later."
        );
    }

    #[tokio::test]
    async fn test_store_failure_fails_open() {
        let mut store = MockRateStore::new();
        store
            .expect_increment()
            .withf(|key, _, _| key == "api:a")
            .times(1)
            .returning(|_, _, _| Err(StoreError::Connection("refused".to_string())));

        let limiter = RateLimiter::new("api", RateLimitPolicy::new(1, 60), Arc::new(store));

        assert!(limiter.check("a", Instant::now()).await.is_ok());
    }
}
