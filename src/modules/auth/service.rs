use sqlx::PgPool;
use tracing::instrument;

use slate_auth::create_access_token;
use slate_config::JwtConfig;
use slate_core::AppError;
use slate_models::auth::LoginResponse;
use slate_models::users::User;

use crate::utils::password::verify_password;

pub struct AuthService;

impl AuthService {
    #[instrument(skip(db, jwt_config, password))]
    pub async fn login(
        db: &PgPool,
        jwt_config: &JwtConfig,
        email: &str,
        password: &str,
    ) -> Result<LoginResponse, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password, display_name, is_active, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::unauthorized("Invalid email or password"))?;

        if !user.is_active {
            return Err(AppError::unauthorized("Account is disabled"));
        }

        if !verify_password(password, &user.password)? {
            return Err(AppError::unauthorized("Invalid email or password"));
        }

        let access_token = create_access_token(user.id, &user.email, jwt_config)
            .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to issue token: {}", e)))?;

        Ok(LoginResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: jwt_config.access_token_expiry,
        })
    }
}
