//! Permission gate: capability checks backed by a cached resolver.
//!
//! Tokens identify the caller; capabilities come from the role/permission
//! tables. The resolver caches each caller's effective set for a bounded
//! TTL so hot paths avoid a database round-trip per request.

use std::collections::HashSet;
use std::time::Duration;

use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use slate_cache::{Cache, keys};
use slate_core::AppError;
use slate_core::permissions::{SUPER_ADMIN, WILDCARD, code};

use crate::middleware::auth::AuthUser;

/// All-of vs any-of semantics for multi-capability checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Require {
    All,
    Any,
}

const PERMISSIONS_SQL: &str = r#"
SELECT p.code
FROM permissions p
JOIN role_permissions rp ON rp.permission_id = p.id
JOIN user_roles ur ON ur.role_id = rp.role_id
WHERE ur.user_id = $1
"#;

/// Resolves callers' effective permission sets and enforces capability
/// checks.
///
/// Fail-closed: an operation is allowed only once the caller's set is in
/// hand and satisfies the check. Every resolution failure is a deny.
#[derive(Clone, Debug)]
pub struct PermissionResolver {
    db: PgPool,
    cache: Option<Cache>,
    ttl: Duration,
}

impl PermissionResolver {
    pub fn new(db: PgPool, cache: Option<Cache>, ttl: Duration) -> Self {
        Self { db, cache, ttl }
    }

    /// The caller's effective permission codes: cache first, then the
    /// role/permission join.
    pub async fn effective_permissions(
        &self,
        user_id: Uuid,
    ) -> Result<HashSet<String>, AppError> {
        let key = keys::user_permissions(user_id);

        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get::<Vec<String>>(&key).await {
                return Ok(hit.into_iter().collect());
            }
        }

        let codes: Vec<String> = sqlx::query_scalar(PERMISSIONS_SQL)
            .bind(user_id)
            .fetch_all(&self.db)
            .await
            .map_err(AppError::database)?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set_with_ttl(&key, &codes, self.ttl).await {
                warn!(error = %e, user_id = %user_id, "Failed to cache permission set");
            }
        }

        Ok(codes.into_iter().collect())
    }

    /// Checks the caller against the required capability codes.
    pub async fn authorize(
        &self,
        user: &AuthUser,
        required: &[String],
        require: Require,
    ) -> Result<(), AppError> {
        let user_id = user.user_id()?;

        let granted = match self.effective_permissions(user_id).await {
            Ok(granted) => granted,
            Err(e) => {
                warn!(error = %e.error, user_id = %user_id, "Permission resolution failed, denying");
                return Err(AppError::forbidden("Permission check failed"));
            }
        };

        if is_satisfied(&granted, required, require) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "Missing required permission: {}",
                required.join(", ")
            )))
        }
    }

    /// Checks a single `<resource>:<action>` capability.
    pub async fn authorize_action(
        &self,
        user: &AuthUser,
        resource: &str,
        action: &str,
    ) -> Result<(), AppError> {
        self.authorize(user, &[code(resource, action)], Require::All)
            .await
    }
}

fn is_satisfied(granted: &HashSet<String>, required: &[String], require: Require) -> bool {
    if granted.contains(SUPER_ADMIN) || granted.contains(WILDCARD) {
        return true;
    }

    match require {
        Require::All => required.iter().all(|p| granted.contains(p)),
        Require::Any => required.iter().any(|p| granted.contains(p)),
    }
}
