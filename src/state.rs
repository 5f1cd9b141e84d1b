use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use tracing::warn;

use slate_cache::{Cache, CacheConfig, RedisStore};
use slate_config::{ApiConfig, CorsConfig, JwtConfig, RateLimitConfig};
use slate_db::init_db_pool;

use crate::middleware::permission::PermissionResolver;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    /// `None` when Redis is unreachable at startup; the API then serves
    /// every read from the database.
    pub cache: Option<Cache>,
    pub permissions: PermissionResolver,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub rate_limit_config: RateLimitConfig,
    pub api_config: ApiConfig,
}

pub async fn init_app_state() -> AppState {
    let db = init_db_pool().await;
    let cache = init_cache().await;
    let api_config = ApiConfig::from_env();

    let permissions = PermissionResolver::new(
        db.clone(),
        cache.clone(),
        Duration::from_secs(api_config.permission_ttl_seconds),
    );

    AppState {
        db,
        cache,
        permissions,
        jwt_config: JwtConfig::from_env(),
        cors_config: CorsConfig::from_env(),
        rate_limit_config: RateLimitConfig::from_env(),
        api_config,
    }
}

async fn init_cache() -> Option<Cache> {
    let config = CacheConfig::from_env();

    match RedisStore::connect(&config.redis_url).await {
        Ok(store) => Some(Cache::new(
            Arc::new(store),
            Duration::from_secs(config.default_ttl_seconds),
        )),
        Err(e) => {
            warn!(error = %e, "Redis unavailable, caching disabled");
            None
        }
    }
}
