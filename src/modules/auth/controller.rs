use axum::extract::State;
use tracing::instrument;

use slate_core::{AppError, Envelope};
use slate_models::auth::{LoginRequest, LoginResponse};

use crate::modules::auth::service::AuthService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<Envelope<LoginResponse>, AppError> {
    let response = AuthService::login(
        &state.db,
        &state.jwt_config,
        &payload.email,
        &payload.password,
    )
    .await?;

    Ok(Envelope::ok(response))
}
