//! Database-backed integration tests for the student resource.
//!
//! These drive the real application router against PostgreSQL
//! (`DATABASE_URL`) and are ignored by default.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use common::send_json;
use slate::middleware::permission::PermissionResolver;
use slate::router::init_router;
use slate::state::AppState;
use slate_config::{ApiConfig, CorsConfig, JwtConfig, RateLimitConfig};

fn test_jwt() -> JwtConfig {
    JwtConfig {
        secret: "db-test-secret".to_string(),
        access_token_expiry: 3600,
    }
}

async fn setup() -> (axum::Router, PgPool) {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();

    let permissions = PermissionResolver::new(pool.clone(), None, Duration::from_secs(60));
    let state = AppState {
        db: pool.clone(),
        cache: None,
        permissions,
        jwt_config: test_jwt(),
        cors_config: CorsConfig {
            allowed_origins: vec![],
        },
        rate_limit_config: RateLimitConfig::default(),
        api_config: ApiConfig::default(),
    };

    (init_router(state), pool)
}

/// Creates an administrator and returns a bearer token for it.
async fn admin_token(pool: &PgPool) -> String {
    let email = format!("admin-{}@school.test", Uuid::new_v4().simple());
    slate::cli::create_admin(pool, &email, "testpass123", "Test Admin")
        .await
        .unwrap();

    let user_id: Uuid = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_one(pool)
        .await
        .unwrap();

    slate_auth::create_access_token(user_id, &email, &test_jwt()).unwrap()
}

fn unique_student_number() -> String {
    format!("S{}", Uuid::new_v4().simple())
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_student_crud_against_database() {
    let (app, pool) = setup().await;
    let token = admin_token(&pool).await;
    let number = unique_student_number();

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/students/",
        &token,
        Some(json!({
            "name": "Alice",
            "student_id": number,
            "email": "alice@school.test",
            "grade_level": "10"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["code"], 0);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let uri = format!("/api/students/{id}");
    let (status, body) = send_json(&app, "GET", &uri, &token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Alice");
    assert_eq!(body["data"]["status"], "active");

    let (status, body) = send_json(
        &app,
        "PUT",
        &uri,
        &token,
        Some(json!({ "name": "Alice Smith" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Alice Smith");

    let (status, _) = send_json(&app, "DELETE", &uri, &token, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_json(&app, "GET", &uri, &token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_duplicate_student_number_is_rejected() {
    let (app, pool) = setup().await;
    let token = admin_token(&pool).await;
    let number = unique_student_number();
    let payload = json!({ "name": "First", "student_id": number });

    let (status, _) = send_json(&app, "POST", "/api/students/", &token, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send_json(&app, "POST", "/api/students/", &token, Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("already exists")
    );
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_batch_create_is_atomic_on_database_failure() {
    let (app, pool) = setup().await;
    let token = admin_token(&pool).await;
    let number = unique_student_number();

    // Duplicate numbers inside one batch: the second insert violates the
    // unique constraint, and nothing from the batch may persist.
    let (status, _) = send_json(
        &app,
        "POST",
        "/api/students/batch",
        &token,
        Some(json!([
            { "name": "One", "student_id": number },
            { "name": "Two", "student_id": number }
        ])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students WHERE student_id = $1")
        .bind(&number)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_login_issues_usable_token() {
    let (app, pool) = setup().await;
    let email = format!("login-{}@school.test", Uuid::new_v4().simple());
    slate::cli::create_admin(&pool, &email, "testpass123", "Login Admin")
        .await
        .unwrap();

    // The login route ignores the authorization header.
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/auth/login",
        "unused",
        Some(json!({ "email": email, "password": "testpass123" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 0);
    assert!(body["data"]["access_token"].as_str().is_some());
    assert_eq!(body["data"]["token_type"], "Bearer");
}
