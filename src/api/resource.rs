//! Generic resource router.
//!
//! Mounts the full REST surface for any [`ResourceService`]: list, detail,
//! create, update, delete, batch variants, CSV import/export, and stats.
//! Pagination, permission checks, caching, invalidation, and error
//! translation are applied here once, uniformly; adding a resource costs a
//! service implementation and one `nest` call.
//!
//! Per operation the flow is: permission gate, cache gate (reads only),
//! service call, cache populate or invalidate, response envelope.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Router};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use slate_cache::keys::{self, invalidate};
use slate_cache::read_through;
use slate_core::permissions::actions;
use slate_core::{AppError, Envelope, ListQuery, PageResponse};
use slate_models::reports::{ExportDescriptor, ImportReport, StatsQuery, StatsReport};

use crate::api::service::{BatchItem, ResourceService};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::{AppJson, ValidatedJson};

/// One resource's descriptor: the bound service instance plus the schema
/// types its [`ResourceService`] implementation fixes. Built once at
/// startup and immutable afterwards.
pub struct ResourceRouter<S: ResourceService> {
    service: Arc<S>,
}

impl<S: ResourceService> ResourceRouter<S> {
    pub fn new(service: S) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// Builds the route set.
    ///
    /// `/batch`, `/import`, `/export`, and `/stats` are registered next to
    /// the `/{id}` capture; the route matcher prefers static segments, so
    /// they never shadow each other.
    pub fn into_router(self) -> Router<AppState> {
        Router::new()
            .route("/", get(list_items::<S>).post(create_item::<S>))
            .route(
                "/batch",
                post(batch_create::<S>)
                    .put(batch_update::<S>)
                    .delete(batch_delete::<S>),
            )
            .route("/import", post(import_data::<S>))
            .route("/export", get(export_data::<S>))
            .route("/stats", get(get_stats::<S>))
            .route(
                "/{id}",
                get(get_item::<S>)
                    .put(update_item::<S>)
                    .delete(delete_item::<S>),
            )
            .layer(Extension(self.service))
    }
}

#[instrument(skip_all, fields(resource = S::NAME))]
async fn list_items<S: ResourceService>(
    State(state): State<AppState>,
    Extension(service): Extension<Arc<S>>,
    auth: AuthUser,
    Query(params): Query<ListQuery>,
    Query(filter): Query<S::Filter>,
) -> Result<Envelope<PageResponse<S::Response>>, AppError> {
    state
        .permissions
        .authorize_action(&auth, S::NAME, actions::READ)
        .await?;
    params.validate().map_err(AppError::unprocessable)?;

    let key = keys::list(
        S::NAME,
        params.query.as_deref(),
        params.page,
        params.size,
        params.sort.as_deref(),
        &keys::hash(&filter),
    );
    let ttl = Duration::from_secs(state.api_config.list_ttl_seconds);

    let page = read_through(state.cache.as_ref(), &key, ttl, || async {
        let (total, items) = service.list(&state.db, &params, &filter).await?;
        Ok::<_, AppError>(PageResponse::new(total, items, &params))
    })
    .await?;

    Ok(Envelope::ok(page))
}

#[instrument(skip_all, fields(resource = S::NAME))]
async fn get_item<S: ResourceService>(
    State(state): State<AppState>,
    Extension(service): Extension<Arc<S>>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Envelope<S::Response>, AppError> {
    state
        .permissions
        .authorize_action(&auth, S::NAME, actions::READ)
        .await?;

    let key = keys::detail(S::NAME, &id.to_string());
    let ttl = Duration::from_secs(state.api_config.detail_ttl_seconds);

    // The existence check lives here, not in services: an absent record is
    // always a 404, never an empty success envelope.
    let item = read_through(state.cache.as_ref(), &key, ttl, || async {
        service
            .get(&state.db, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("record not found")))
    })
    .await?;

    Ok(Envelope::ok(item))
}

#[instrument(skip_all, fields(resource = S::NAME))]
async fn create_item<S: ResourceService>(
    State(state): State<AppState>,
    Extension(service): Extension<Arc<S>>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<S::Create>,
) -> Result<(StatusCode, Envelope<S::Response>), AppError> {
    state
        .permissions
        .authorize_action(&auth, S::NAME, actions::CREATE)
        .await?;

    let created = service.create(&state.db, payload).await?;
    invalidate::record(state.cache.as_ref(), S::NAME, None).await;

    Ok((StatusCode::CREATED, Envelope::ok(created)))
}

#[instrument(skip_all, fields(resource = S::NAME))]
async fn update_item<S: ResourceService>(
    State(state): State<AppState>,
    Extension(service): Extension<Arc<S>>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<S::Update>,
) -> Result<Envelope<S::Response>, AppError> {
    state
        .permissions
        .authorize_action(&auth, S::NAME, actions::UPDATE)
        .await?;

    let updated = service
        .update(&state.db, id, payload)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("record not found")))?;

    invalidate::record(state.cache.as_ref(), S::NAME, Some(&id.to_string())).await;

    Ok(Envelope::ok(updated))
}

#[instrument(skip_all, fields(resource = S::NAME))]
async fn delete_item<S: ResourceService>(
    State(state): State<AppState>,
    Extension(service): Extension<Arc<S>>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Envelope<()>, AppError> {
    state
        .permissions
        .authorize_action(&auth, S::NAME, actions::DELETE)
        .await?;

    service.delete(&state.db, id).await?;
    invalidate::record(state.cache.as_ref(), S::NAME, Some(&id.to_string())).await;

    Ok(Envelope::message("record deleted"))
}

#[instrument(skip_all, fields(resource = S::NAME))]
async fn batch_create<S: ResourceService>(
    State(state): State<AppState>,
    Extension(service): Extension<Arc<S>>,
    auth: AuthUser,
    AppJson(items): AppJson<Vec<S::Create>>,
) -> Result<(StatusCode, Envelope<Vec<S::Response>>), AppError> {
    state
        .permissions
        .authorize_action(&auth, S::NAME, actions::CREATE)
        .await?;

    if items.is_empty() {
        return Err(AppError::bad_request(anyhow::anyhow!("empty batch")));
    }
    validate_batch(items.iter())?;

    let created = service.batch_create(&state.db, items).await?;
    invalidate::record(state.cache.as_ref(), S::NAME, None).await;

    Ok((StatusCode::CREATED, Envelope::ok(created)))
}

#[instrument(skip_all, fields(resource = S::NAME))]
async fn batch_update<S: ResourceService>(
    State(state): State<AppState>,
    Extension(service): Extension<Arc<S>>,
    auth: AuthUser,
    AppJson(items): AppJson<Vec<BatchItem<S::Update>>>,
) -> Result<Envelope<Vec<S::Response>>, AppError> {
    state
        .permissions
        .authorize_action(&auth, S::NAME, actions::UPDATE)
        .await?;

    if items.is_empty() {
        return Err(AppError::bad_request(anyhow::anyhow!("empty batch")));
    }
    validate_batch(items.iter().map(|item| &item.data))?;

    let ids: Vec<Uuid> = items.iter().map(|item| item.id).collect();
    let updated = service.batch_update(&state.db, items).await?;

    for id in &ids {
        invalidate::record(state.cache.as_ref(), S::NAME, Some(&id.to_string())).await;
    }

    Ok(Envelope::ok(updated))
}

#[instrument(skip_all, fields(resource = S::NAME))]
async fn batch_delete<S: ResourceService>(
    State(state): State<AppState>,
    Extension(service): Extension<Arc<S>>,
    auth: AuthUser,
    AppJson(ids): AppJson<Vec<Uuid>>,
) -> Result<Envelope<()>, AppError> {
    state
        .permissions
        .authorize_action(&auth, S::NAME, actions::DELETE)
        .await?;

    if ids.is_empty() {
        return Err(AppError::bad_request(anyhow::anyhow!("empty batch")));
    }

    let deleted = service.batch_delete(&state.db, &ids).await?;

    for id in &ids {
        invalidate::record(state.cache.as_ref(), S::NAME, Some(&id.to_string())).await;
    }

    Ok(Envelope::message(format!("deleted {deleted} records")))
}

#[instrument(skip_all, fields(resource = S::NAME))]
async fn import_data<S: ResourceService>(
    State(state): State<AppState>,
    Extension(service): Extension<Arc<S>>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Envelope<ImportReport>, AppError> {
    state
        .permissions
        .authorize_action(&auth, S::NAME, actions::CREATE)
        .await?;

    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(AppError::bad_request)?
    {
        if field.name() == Some("file") {
            file = Some(field.bytes().await.map_err(AppError::bad_request)?);
            break;
        }
    }
    let file = file.ok_or_else(|| AppError::bad_request(anyhow::anyhow!("missing file field")))?;

    let report = service.import_data(&state.db, file).await?;
    invalidate::record(state.cache.as_ref(), S::NAME, None).await;

    Ok(Envelope::ok(report))
}

#[instrument(skip_all, fields(resource = S::NAME))]
async fn export_data<S: ResourceService>(
    State(state): State<AppState>,
    Extension(service): Extension<Arc<S>>,
    auth: AuthUser,
    Query(params): Query<ListQuery>,
    Query(filter): Query<S::Filter>,
) -> Result<Envelope<ExportDescriptor>, AppError> {
    state
        .permissions
        .authorize_action(&auth, S::NAME, actions::EXPORT)
        .await?;

    let descriptor = service.export_data(&state.db, &params, &filter).await?;

    Ok(Envelope::ok(descriptor))
}

#[instrument(skip_all, fields(resource = S::NAME))]
async fn get_stats<S: ResourceService>(
    State(state): State<AppState>,
    Extension(service): Extension<Arc<S>>,
    auth: AuthUser,
    Query(params): Query<StatsQuery>,
    Query(filter): Query<S::Filter>,
) -> Result<Envelope<StatsReport>, AppError> {
    state
        .permissions
        .authorize_action(&auth, S::NAME, actions::READ)
        .await?;

    let key = keys::stats(S::NAME, &keys::hash(&(&params, &filter)));
    let ttl = Duration::from_secs(state.api_config.stats_ttl_seconds);

    let report = read_through(state.cache.as_ref(), &key, ttl, || async {
        service.stats(&state.db, &params, &filter).await
    })
    .await?;

    Ok(Envelope::ok(report))
}

/// Rejects the whole batch when any item fails schema validation, listing
/// every failing item in the error message.
fn validate_batch<'a, T, I>(items: I) -> Result<(), AppError>
where
    T: Validate + 'a,
    I: Iterator<Item = &'a T>,
{
    let problems: Vec<String> = items
        .enumerate()
        .filter_map(|(index, item)| {
            item.validate()
                .err()
                .map(|e| format!("item {index}: {e}"))
        })
        .collect();

    if problems.is_empty() {
        Ok(())
    } else {
        Err(AppError::unprocessable(anyhow::anyhow!(
            problems.join("; ")
        )))
    }
}
