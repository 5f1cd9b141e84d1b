//! CLI commands.
//!
//! Administrators are created from the command line only; the HTTP surface
//! has no endpoint that grants the `super_admin` role.

use sqlx::PgPool;
use uuid::Uuid;

use slate_core::AppError;
use slate_core::permissions::SUPER_ADMIN;

use crate::utils::password::hash_password;

/// Creates a user and assigns it the `super_admin` role.
pub async fn create_admin(
    pool: &PgPool,
    email: &str,
    password: &str,
    display_name: &str,
) -> Result<(), AppError> {
    let hashed = hash_password(password)?;

    let mut tx = pool.begin().await.map_err(AppError::database)?;

    let user_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO users (email, password, display_name)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(email)
    .bind(&hashed)
    .bind(display_name)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return AppError::bad_request(anyhow::anyhow!(
                    "User with email {} already exists",
                    email
                ));
            }
        }
        AppError::database(e)
    })?;

    let role_id: Uuid = sqlx::query_scalar("SELECT id FROM roles WHERE code = $1")
        .bind(SUPER_ADMIN)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::database)?;

    sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)")
        .bind(user_id)
        .bind(role_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::database)?;

    tx.commit().await.map_err(AppError::database)?;

    Ok(())
}
