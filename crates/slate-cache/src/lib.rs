//! # Slate Cache
//!
//! Caching layer for the Slate API.
//!
//! This crate provides:
//! - A [`CacheStore`] backend contract (get, set, delete, delete by pattern)
//! - A Redis store and an in-memory store implementing it
//! - A typed [`Cache`] facade with JSON serialization
//! - A read-through [`gate::read_through`] wrapper for cached reads
//! - Cache key builders and invalidation helpers in [`keys`]
//!
//! Pattern deletion is part of the backend contract: write operations
//! invalidate whole key namespaces (`slate:<resource>:list:*`) in one call,
//! so a backend without cheap prefix scanning cannot serve this crate.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use slate_cache::{Cache, CacheConfig, RedisStore};
//!
//! let config = CacheConfig::from_env();
//! let store = RedisStore::connect(&config.redis_url).await?;
//! let cache = Cache::new(Arc::new(store), Duration::from_secs(config.default_ttl_seconds));
//!
//! cache.set("slate:students:detail:1", &student).await?;
//! let hit: Option<Student> = cache.get("slate:students:detail:1").await;
//! ```

pub mod config;
pub mod gate;
pub mod keys;
pub mod memory;
pub mod redis_store;
pub mod store;

pub use config::CacheConfig;
pub use gate::{Cache, read_through};
pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use store::{CacheError, CacheStore};
