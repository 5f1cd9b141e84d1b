//! Cache key generation and invalidation helpers.
//!
//! Keys are namespaced per resource under a global prefix:
//!
//! - `slate:<resource>:detail:<id>`
//! - `slate:<resource>:list:<query>:<page>:<size>:<sort>:<filter-hash>`
//! - `slate:<resource>:stats:<hash>`
//!
//! Writes invalidate the specific detail key plus the whole `list:*` and
//! `stats:*` namespaces for the resource, regardless of which pages or
//! groupings were cached.

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::warn;
use uuid::Uuid;

use crate::gate::Cache;

/// Prefix for all cache keys to avoid collisions with other Redis users.
const CACHE_PREFIX: &str = "slate";

/// Key for a single record by ID.
pub fn detail(resource: &str, id: &str) -> String {
    format!("{CACHE_PREFIX}:{resource}:detail:{id}")
}

/// Key for one list page.
pub fn list(
    resource: &str,
    query: Option<&str>,
    page: i64,
    size: i64,
    sort: Option<&str>,
    filter_hash: &str,
) -> String {
    format!(
        "{CACHE_PREFIX}:{resource}:list:{}:{page}:{size}:{}:{filter_hash}",
        query.unwrap_or("-"),
        sort.unwrap_or("-"),
    )
}

/// Pattern matching every cached list page of a resource.
pub fn list_pattern(resource: &str) -> String {
    format!("{CACHE_PREFIX}:{resource}:list:*")
}

/// Key for one stats aggregation.
pub fn stats(resource: &str, params_hash: &str) -> String {
    format!("{CACHE_PREFIX}:{resource}:stats:{params_hash}")
}

/// Pattern matching every cached stats aggregation of a resource.
pub fn stats_pattern(resource: &str) -> String {
    format!("{CACHE_PREFIX}:{resource}:stats:*")
}

/// Key for a user's resolved permission set.
pub fn user_permissions(user_id: Uuid) -> String {
    format!("{CACHE_PREFIX}:user:{user_id}:permissions")
}

/// Hashes serializable parameters into a short, consistent key component.
///
/// Serialization failures degrade to a constant hash rather than erroring;
/// the only consequence is coarser cache keying.
pub fn hash<T: Serialize>(value: &T) -> String {
    let bytes = serde_json::to_vec(value).unwrap_or_default();
    let digest = Sha256::digest(&bytes);
    hex::encode(&digest[..8])
}

/// Cache invalidation for write operations.
pub mod invalidate {
    use super::*;

    /// Invalidates a record's detail key (when an id is known) plus the
    /// resource's entire list and stats namespaces.
    ///
    /// Call after any successful create, update, delete, or import.
    /// Invalidation failures are logged, not propagated: the write already
    /// committed, and stale entries age out at TTL.
    pub async fn record(cache: Option<&Cache>, resource: &str, id: Option<&str>) {
        let Some(cache) = cache else { return };

        if let Some(id) = id {
            if let Err(e) = cache.invalidate(&detail(resource, id)).await {
                warn!(error = %e, resource, id, "Failed to invalidate detail cache");
            }
        }

        if let Err(e) = cache.invalidate_pattern(&list_pattern(resource)).await {
            warn!(error = %e, resource, "Failed to invalidate list caches");
        }

        if let Err(e) = cache.invalidate_pattern(&stats_pattern(resource)).await {
            warn!(error = %e, resource, "Failed to invalidate stats caches");
        }
    }
}
