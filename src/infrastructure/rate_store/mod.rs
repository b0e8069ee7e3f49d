//! Rate-limit counter storage.
//!
//! Provides two [`crate::domain::repositories::RateStore`] implementations:
//! - [`MemoryRateStore`] - Process-local map, the default
//! - [`RedisRateStore`] - Shared store for multi-instance deployments
//!
//! and the [`sweeper`] task that evicts expired records.

mod memory_store;
mod redis_store;
pub mod sweeper;

pub use memory_store::MemoryRateStore;
pub use redis_store::RedisRateStore;
pub use sweeper::{SweeperHandle, spawn_sweeper};
