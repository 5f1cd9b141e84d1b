//! Cache backend contract.

use async_trait::async_trait;
use std::time::Duration;

/// Error type for cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Redis connection error: {0}")]
    Connection(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Backend protocol consumed by the cache layer.
///
/// Values are opaque strings; serialization is handled by the
/// [`Cache`](crate::Cache) facade. Pattern deletion is mandatory: whole key
/// namespaces are invalidated after writes, so implementations must be able
/// to delete by glob (at minimum a trailing-`*` prefix match).
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Deletes all keys matching a glob pattern, returning how many were
    /// removed.
    async fn delete_pattern(&self, pattern: &str) -> Result<u64, CacheError>;
}
