//! Resource service contract consumed by the generic resource router.

use async_trait::async_trait;
use axum::body::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use slate_core::{AppError, ListQuery};
use slate_models::reports::{ExportDescriptor, ImportReport, StatsQuery, StatsReport};

/// One item of a batch update: the target id plus the partial payload.
#[derive(Debug, Deserialize)]
pub struct BatchItem<U> {
    pub id: Uuid,
    #[serde(flatten)]
    pub data: U,
}

/// Contract every resource service satisfies to be mounted behind a
/// [`ResourceRouter`](crate::api::resource::ResourceRouter).
///
/// Services own persistence, uniqueness checks, and business validation.
/// Schema validation, pagination bounds, permission checks, caching, and
/// the not-found contract live in the router.
#[async_trait]
pub trait ResourceService: Send + Sync + 'static {
    /// Resource name; doubles as the cache namespace and the `<resource>`
    /// half of required capability codes.
    const NAME: &'static str;

    type Create: DeserializeOwned + Validate + Send + Sync + 'static;
    type Update: DeserializeOwned + Validate + Send + Sync + 'static;
    type Filter: Serialize + DeserializeOwned + Default + Send + Sync + 'static;
    type Response: Serialize + DeserializeOwned + Clone + Send + Sync + 'static;

    /// Returns the total matching count plus one page of items.
    async fn list(
        &self,
        db: &PgPool,
        params: &ListQuery,
        filter: &Self::Filter,
    ) -> Result<(i64, Vec<Self::Response>), AppError>;

    /// Returns `Ok(None)` when the record does not exist; the router turns
    /// that into the not-found response.
    async fn get(&self, db: &PgPool, id: Uuid) -> Result<Option<Self::Response>, AppError>;

    async fn create(&self, db: &PgPool, data: Self::Create) -> Result<Self::Response, AppError>;

    /// Returns `Ok(None)` when the record does not exist.
    async fn update(
        &self,
        db: &PgPool,
        id: Uuid,
        data: Self::Update,
    ) -> Result<Option<Self::Response>, AppError>;

    async fn delete(&self, db: &PgPool, id: Uuid) -> Result<(), AppError>;

    /// All-or-nothing: the whole batch runs in one transaction.
    async fn batch_create(
        &self,
        db: &PgPool,
        items: Vec<Self::Create>,
    ) -> Result<Vec<Self::Response>, AppError>;

    /// All-or-nothing: the whole batch runs in one transaction.
    async fn batch_update(
        &self,
        db: &PgPool,
        items: Vec<BatchItem<Self::Update>>,
    ) -> Result<Vec<Self::Response>, AppError>;

    /// Returns the number of deleted records.
    async fn batch_delete(&self, db: &PgPool, ids: &[Uuid]) -> Result<u64, AppError>;

    /// Best-effort row-by-row import; failures are reported per row in the
    /// returned report rather than aborting the import.
    async fn import_data(&self, db: &PgPool, file: Bytes) -> Result<ImportReport, AppError>;

    async fn export_data(
        &self,
        db: &PgPool,
        params: &ListQuery,
        filter: &Self::Filter,
    ) -> Result<ExportDescriptor, AppError>;

    async fn stats(
        &self,
        db: &PgPool,
        params: &StatsQuery,
        filter: &Self::Filter,
    ) -> Result<StatsReport, AppError>;
}
