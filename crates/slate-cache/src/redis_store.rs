//! Redis cache store for distributed caching.

use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};

use crate::store::{CacheError, CacheStore};

/// Redis-backed [`CacheStore`] with automatic reconnection.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

impl RedisStore {
    /// Connects to Redis.
    ///
    /// # Arguments
    ///
    /// * `redis_url` - Redis connection URL (e.g., "redis://localhost:6379")
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Connection` if the connection fails.
    pub async fn connect(redis_url: &str) -> Result<Self, CacheError> {
        let client = Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;

        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        Ok(conn.get::<_, Option<String>>(key).await?)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl.as_secs()).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }

    /// Deletes all keys matching a pattern.
    ///
    /// Uses cursor-based SCAN rather than KEYS so the sweep does not block
    /// the Redis server on large keyspaces.
    async fn delete_pattern(&self, pattern: &str) -> Result<u64, CacheError> {
        let mut conn = self.conn.clone();
        let mut cursor: u64 = 0;
        let mut deleted: u64 = 0;

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                let count: u64 = conn.del(&keys).await?;
                deleted += count;
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Integration tests require a running Redis instance.

    #[tokio::test]
    #[ignore = "requires Redis"]
    async fn test_set_get_delete() {
        let store = RedisStore::connect("redis://localhost:6379").await.unwrap();

        store
            .set("slate:test:key", "value".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(
            store.get("slate:test:key").await.unwrap(),
            Some("value".to_string())
        );

        store.delete("slate:test:key").await.unwrap();
        assert_eq!(store.get("slate:test:key").await.unwrap(), None);
    }

    #[tokio::test]
    #[ignore = "requires Redis"]
    async fn test_delete_pattern() {
        let store = RedisStore::connect("redis://localhost:6379").await.unwrap();
        let ttl = Duration::from_secs(60);

        store.set("slate:test:list:1", "a".into(), ttl).await.unwrap();
        store.set("slate:test:list:2", "b".into(), ttl).await.unwrap();

        let deleted = store.delete_pattern("slate:test:list:*").await.unwrap();
        assert!(deleted >= 2);
    }
}
