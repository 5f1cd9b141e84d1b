use std::env;

/// Tunables for the API layer: cache TTLs per read shape, the permission
/// cache window, and export storage.
///
/// # Environment Variables
///
/// - `CACHE_TTL_LIST_SECONDS`: TTL for cached list pages (default 300)
/// - `CACHE_TTL_DETAIL_SECONDS`: TTL for cached detail reads (default 300)
/// - `CACHE_TTL_STATS_SECONDS`: TTL for cached stats (default 300)
/// - `PERMISSION_CACHE_TTL_SECONDS`: TTL for per-caller permission sets
///   (default 60)
/// - `EXPORT_DIR`: directory export files are written to (default `exports`)
/// - `EXPORT_URL_BASE`: URL path exports are served under (default `/exports`)
/// - `EXPORT_ROW_LIMIT`: maximum rows per export file (default 10000)
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub list_ttl_seconds: u64,
    pub detail_ttl_seconds: u64,
    pub stats_ttl_seconds: u64,
    pub permission_ttl_seconds: u64,
    pub export_dir: String,
    pub export_url_base: String,
    pub export_row_limit: i64,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self {
            list_ttl_seconds: read_u64("CACHE_TTL_LIST_SECONDS", 300),
            detail_ttl_seconds: read_u64("CACHE_TTL_DETAIL_SECONDS", 300),
            stats_ttl_seconds: read_u64("CACHE_TTL_STATS_SECONDS", 300),
            permission_ttl_seconds: read_u64("PERMISSION_CACHE_TTL_SECONDS", 60),
            export_dir: env::var("EXPORT_DIR").unwrap_or_else(|_| "exports".to_string()),
            export_url_base: env::var("EXPORT_URL_BASE")
                .unwrap_or_else(|_| "/exports".to_string()),
            export_row_limit: env::var("EXPORT_ROW_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            list_ttl_seconds: 300,
            detail_ttl_seconds: 300,
            stats_ttl_seconds: 300,
            permission_ttl_seconds: 60,
            export_dir: "exports".to_string(),
            export_url_base: "/exports".to_string(),
            export_row_limit: 10_000,
        }
    }
}

fn read_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.list_ttl_seconds, 300);
        assert_eq!(config.permission_ttl_seconds, 60);
        assert_eq!(config.export_row_limit, 10_000);
        assert_eq!(config.export_url_base, "/exports");
    }
}
