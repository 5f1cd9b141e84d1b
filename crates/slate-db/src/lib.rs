//! # Slate DB
//!
//! Database pool and transaction utilities for the Slate API.
//!
//! This crate provides database connection pool initialization and
//! management using SQLx with PostgreSQL.
//!
//! # Session and transaction semantics
//!
//! Services receive a [`PgPool`] reference per operation and check
//! connections out of the pool as needed. Multi-statement operations run
//! inside an explicit transaction obtained with `pool.begin()`:
//!
//! - `commit()` is called only on the success path;
//! - dropping an uncommitted [`sqlx::Transaction`] rolls it back, so an
//!   early `?` return cannot leave partial writes behind;
//! - calling `begin()` on a transaction opens a savepoint, which nests the
//!   same commit/rollback contract inside a larger batch.
//!
//! # Example
//!
//! ```ignore
//! use slate_db::init_db_pool;
//!
//! #[tokio::main]
//! async fn main() {
//!     let pool = init_db_pool().await;
//!     // Use pool for database operations
//! }
//! ```

use std::env;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

/// Initializes a PostgreSQL connection pool.
///
/// Reads the database URL from the `DATABASE_URL` environment variable and
/// creates a connection pool shared by the whole application. The returned
/// [`PgPool`] is cheap to clone and safe to share across async tasks.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default 10)
///
/// # Panics
///
/// Panics if `DATABASE_URL` is not set or the database cannot be reached.
pub async fn init_db_pool() -> PgPool {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    info!(max_connections, "Database pool initialized");

    pool
}
