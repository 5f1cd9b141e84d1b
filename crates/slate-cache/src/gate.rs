//! Typed cache facade and the read-through gate.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::store::{CacheError, CacheStore};

/// Typed cache handle shared across the application.
///
/// Wraps a [`CacheStore`] with JSON serialization and hit/miss logging.
/// Cloning is cheap; the underlying store is shared.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn CacheStore>,
    default_ttl: Duration,
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}

impl Cache {
    pub fn new(store: Arc<dyn CacheStore>, default_ttl: Duration) -> Self {
        Self { store, default_ttl }
    }

    /// Gets a cached value by key.
    ///
    /// Returns `None` on miss, on backend error, or if the cached payload no
    /// longer deserializes into `T`.
    pub async fn get<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        match self.store.get(key).await {
            Ok(Some(value)) => {
                debug!(cache.key = %key, "Cache hit");
                match serde_json::from_str(&value) {
                    Ok(parsed) => Some(parsed),
                    Err(e) => {
                        error!(cache.key = %key, error = %e, "Failed to deserialize cached value");
                        None
                    }
                }
            }
            Ok(None) => {
                debug!(cache.key = %key, "Cache miss");
                None
            }
            Err(e) => {
                error!(cache.key = %key, error = %e, "Cache GET error");
                None
            }
        }
    }

    /// Sets a cached value with the default TTL.
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        self.set_with_ttl(key, value, self.default_ttl).await
    }

    /// Sets a cached value with a custom TTL.
    pub async fn set_with_ttl<T>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let json = serde_json::to_string(value)?;
        self.store.set(key, json, ttl).await?;

        debug!(cache.key = %key, cache.ttl_secs = %ttl.as_secs(), "Cache set");

        Ok(())
    }

    /// Invalidates (deletes) a cached key.
    pub async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        self.store.delete(key).await?;

        debug!(cache.key = %key, "Cache invalidated");

        Ok(())
    }

    /// Invalidates all keys matching a pattern.
    pub async fn invalidate_pattern(&self, pattern: &str) -> Result<u64, CacheError> {
        let deleted = self.store.delete_pattern(pattern).await?;

        debug!(cache.pattern = %pattern, cache.deleted = %deleted, "Pattern invalidation complete");

        Ok(deleted)
    }
}

/// Read-through cache gate.
///
/// Looks up `key`; on a hit the loader never runs. On a miss the loader
/// runs, its result is stored with `ttl`, and the value is returned. A
/// loader failure is returned as-is and never cached. A failed cache write
/// is logged and otherwise ignored: the caller still gets the loaded value,
/// at the cost of a stale-read window bounded by the TTL.
pub async fn read_through<T, E, F, Fut>(
    cache: Option<&Cache>,
    key: &str,
    ttl: Duration,
    load: F,
) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    if let Some(cache) = cache {
        if let Some(hit) = cache.get::<T>(key).await {
            return Ok(hit);
        }
    }

    let value = load().await?;

    if let Some(cache) = cache {
        if let Err(e) = cache.set_with_ttl(key, &value, ttl).await {
            warn!(cache.key = %key, error = %e, "Failed to populate cache");
        }
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn test_cache() -> Cache {
        Cache::new(Arc::new(MemoryStore::new()), Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_miss_loads_and_populates() {
        let cache = test_cache();
        let calls = AtomicUsize::new(0);

        let value: Result<i32, ()> =
            read_through(Some(&cache), "k", Duration::from_secs(60), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(41)
            })
            .await;

        assert_eq!(value, Ok(41));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.get::<i32>("k").await, Some(41));
    }

    #[tokio::test]
    async fn test_hit_skips_loader() {
        let cache = test_cache();
        cache.set("k", &7).await.unwrap();
        let calls = AtomicUsize::new(0);

        let value: Result<i32, ()> =
            read_through(Some(&cache), "k", Duration::from_secs(60), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(99)
            })
            .await;

        assert_eq!(value, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_loader_error_is_not_cached() {
        let cache = test_cache();

        let value: Result<i32, &str> =
            read_through(Some(&cache), "k", Duration::from_secs(60), || async {
                Err("boom")
            })
            .await;

        assert_eq!(value, Err("boom"));
        assert_eq!(cache.get::<i32>("k").await, None);
    }

    #[tokio::test]
    async fn test_no_cache_still_loads() {
        let value: Result<i32, ()> =
            read_through(None, "k", Duration::from_secs(60), || async { Ok(3) }).await;

        assert_eq!(value, Ok(3));
    }
}
