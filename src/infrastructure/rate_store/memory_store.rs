//! Process-local rate store.

use async_trait::async_trait;
use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::domain::entities::RateRecord;
use crate::domain::repositories::{RateStore, StoreResult};

/// In-memory rate store backed by a sharded concurrent map.
///
/// Counters live only in this process: several instances behind a load
/// balancer each keep their own, so the effective limit scales with the
/// instance count. Use [`super::RedisRateStore`] when that matters.
///
/// Never returns an error.
pub struct MemoryRateStore {
    records: DashMap<String, RateRecord>,
}

impl MemoryRateStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        debug!("Using in-memory rate store");
        Self {
            records: DashMap::new(),
        }
    }

    /// Number of tracked keys, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether a record exists for `key`, expired or not.
    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }
}

impl Default for MemoryRateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateStore for MemoryRateStore {
    async fn increment(
        &self,
        key: &str,
        window: Duration,
        now: Instant,
    ) -> StoreResult<RateRecord> {
        // The entry guard holds the shard lock for the whole read-modify-write.
        let mut record = self
            .records
            .entry(key.to_string())
            .or_insert_with(|| RateRecord::fresh(now, window));

        if record.is_expired(now) {
            *record = RateRecord::fresh(now, window);
        }
        record.count = record.count.saturating_add(1);

        Ok(*record)
    }

    async fn sweep(&self, now: Instant) -> StoreResult<usize> {
        let mut removed = 0;
        self.records.retain(|_, record| {
            let keep = !record.is_expired(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const WINDOW: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_first_increment_creates_record() {
        let store = MemoryRateStore::new();
        let now = Instant::now();

        let record = store.increment("a", WINDOW, now).await.unwrap();

        assert_eq!(record.count, 1);
        assert_eq!(record.reset_at, now + WINDOW);
        assert_eq!(store.len(), 1);
        assert!(store.contains("a"));
        assert!(!store.contains("b"));
    }

    #[tokio::test]
    async fn test_increment_keeps_window_start() {
        let store = MemoryRateStore::new();
        let start = Instant::now();

        store.increment("a", WINDOW, start).await.unwrap();
        let record = store
            .increment("a", WINDOW, start + Duration::from_secs(30))
            .await
            .unwrap();

        assert_eq!(record.count, 2);
        assert_eq!(record.reset_at, start + WINDOW);
    }

    #[tokio::test]
    async fn test_expired_record_is_replaced() {
        let store = MemoryRateStore::new();
        let start = Instant::now();

        for _ in 0..10 {
            store.increment("a", WINDOW, start).await.unwrap();
        }

        let later = start + WINDOW;
        let record = store.increment("a", WINDOW, later).await.unwrap();

        assert_eq!(record.count, 1);
        assert_eq!(record.reset_at, later + WINDOW);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired() {
        let store = MemoryRateStore::new();
        let start = Instant::now();

        store.increment("old", WINDOW, start).await.unwrap();
        store
            .increment("new", WINDOW, start + Duration::from_secs(30))
            .await
            .unwrap();

        let removed = store.sweep(start + WINDOW).await.unwrap();

        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);

        let record = store
            .increment("new", WINDOW, start + WINDOW)
            .await
            .unwrap();
        assert_eq!(record.count, 2);
    }

    #[tokio::test]
    async fn test_sweep_empty_store() {
        let store = MemoryRateStore::new();

        assert_eq!(store.sweep(Instant::now()).await.unwrap(), 0);
        assert!(store.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments_are_not_lost() {
        let store = Arc::new(MemoryRateStore::new());
        let now = Instant::now();

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    for _ in 0..250 {
                        store.increment("shared", WINDOW, now).await.unwrap();
                    }
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap();
        }

        let record = store.increment("shared", WINDOW, now).await.unwrap();
        assert_eq!(record.count, 2001);
    }
}
