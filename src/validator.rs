//! JSON extractors that keep rejections inside the response envelope.
//!
//! Axum's stock `Json` extractor answers malformed payloads with a plain
//! text body; these wrappers translate every rejection into an
//! [`AppError`] so clients always receive `{code, message, data}`. A
//! payload that parses but fails schema validation is a 422, distinct from
//! the 400 a business-rule violation produces.

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use validator::Validate;

use slate_core::AppError;

/// `Json` with enveloped rejections. Missing fields and type mismatches
/// keep their 422 status; syntax errors stay 400.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(AppError::new(
                rejection.status(),
                anyhow::anyhow!("{}", rejection.body_text()),
            )),
        }
    }
}

/// [`AppJson`] plus schema validation of the parsed value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let AppJson(value) = AppJson::<T>::from_request(req, state).await?;

        value.validate().map_err(AppError::unprocessable)?;

        Ok(ValidatedJson(value))
    }
}
