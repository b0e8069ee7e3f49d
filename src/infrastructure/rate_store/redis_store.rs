//! Redis-backed rate store shared across instances.

use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;
use tokio::time::Instant;
use tracing::info;

use crate::domain::entities::RateRecord;
use crate::domain::entities::rate_record::window_end;
use crate::domain::repositories::{RateStore, StoreError, StoreResult};

/// Redis rate store.
///
/// Each key holds the window's count and carries the window as its TTL, so
/// Redis expires records itself and [`RateStore::sweep`] has nothing to do.
/// Uses `ConnectionManager` for automatic reconnection.
pub struct RedisRateStore {
    client: ConnectionManager,
    key_prefix: String,
}

impl RedisRateStore {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connection`] if the URL is invalid, the
    /// connection cannot be established, or the PING fails.
    pub async fn connect(redis_url: &str) -> StoreResult<Self> {
        info!("Connecting to Redis at {}", redis_url);

        let client = Client::open(redis_url).map_err(|e| {
            StoreError::Connection(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            StoreError::Connection(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| StoreError::Connection(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis rate store");

        Ok(Self {
            client: manager,
            key_prefix: "ratelimit:".to_string(),
        })
    }

    fn build_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl RateStore for RedisRateStore {
    async fn increment(
        &self,
        key: &str,
        window: Duration,
        now: Instant,
    ) -> StoreResult<RateRecord> {
        let key = self.build_key(key);
        let window_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
        let mut conn = self.client.clone();

        // SET NX starts a window only when none is running; INCR keeps the TTL.
        let (count, ttl_ms): (i64, i64) = redis::pipe()
            .atomic()
            .cmd("SET")
            .arg(&key)
            .arg(0)
            .arg("PX")
            .arg(window_ms)
            .arg("NX")
            .ignore()
            .incr(&key, 1)
            .pttl(&key)
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::Operation(format!("Redis INCR failed for {}: {}", key, e)))?;

        let remaining = match u64::try_from(ttl_ms) {
            Ok(ms) if ms > 0 => Duration::from_millis(ms),
            _ => window,
        };

        Ok(RateRecord {
            count: u32::try_from(count).unwrap_or(u32::MAX),
            reset_at: window_end(now, remaining),
        })
    }

    async fn sweep(&self, _now: Instant) -> StoreResult<usize> {
        Ok(0)
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
