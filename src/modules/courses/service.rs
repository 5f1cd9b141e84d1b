use std::collections::HashMap;

use async_trait::async_trait;
use axum::body::Bytes;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use slate_config::ApiConfig;
use slate_core::{AppError, ListQuery};
use slate_models::courses::{
    Course, CourseFilter, CreateCourseDto, UpdateCourseDto, course_status,
};
use slate_models::reports::{ExportDescriptor, ImportReport, StatsBucket, StatsQuery, StatsReport};

use crate::api::service::{BatchItem, ResourceService};
use crate::utils::export::{timestamped_filename, write_export};

const SORTABLE: &[&str] = &["code", "title", "credits", "status", "created_at"];
const GROUPABLE: &[&str] = &["status", "credits"];

pub struct CourseService {
    config: ApiConfig,
}

impl CourseService {
    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }

    fn order_clause(sort: Option<&str>) -> String {
        match sort {
            Some(sort) => {
                let (column, direction) = match sort.strip_prefix('-') {
                    Some(column) => (column, "DESC"),
                    None => (sort, "ASC"),
                };
                if SORTABLE.contains(&column) {
                    format!("{column} {direction}")
                } else {
                    "created_at DESC".to_string()
                }
            }
            None => "created_at DESC".to_string(),
        }
    }

    fn push_filters(
        builder: &mut QueryBuilder<'_, Postgres>,
        query: Option<&str>,
        filter: &CourseFilter,
    ) {
        if let Some(query) = query {
            if !query.is_empty() {
                builder
                    .push(" AND (code ILIKE ")
                    .push_bind(format!("%{query}%"))
                    .push(" OR title ILIKE ")
                    .push_bind(format!("%{query}%"))
                    .push(" OR teacher_name ILIKE ")
                    .push_bind(format!("%{query}%"))
                    .push(")");
            }
        }
        if let Some(status) = &filter.status {
            builder.push(" AND status = ").push_bind(status.clone());
        }
        if let Some(min_credits) = filter.min_credits {
            builder.push(" AND credits >= ").push_bind(min_credits);
        }
        if let Some(max_credits) = filter.max_credits {
            builder.push(" AND credits <= ").push_bind(max_credits);
        }
    }

    fn push_date_range(builder: &mut QueryBuilder<'_, Postgres>, params: &StatsQuery) {
        if let Some(start) = params.start_date {
            builder
                .push(" AND created_at >= ")
                .push_bind(start);
        }
        if let Some(end) = params.end_date {
            builder
                .push(" AND created_at <= ")
                .push_bind(end);
        }
    }

    async fn insert<'e, E>(executor: E, data: &CreateCourseDto) -> Result<Course, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Course>(
            r#"
            INSERT INTO courses (code, title, credits, teacher_name, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, code, title, credits, teacher_name, status, created_at, updated_at
            "#,
        )
        .bind(&data.code)
        .bind(&data.title)
        .bind(data.credits)
        .bind(&data.teacher_name)
        .bind(data.status.as_deref().unwrap_or(course_status::ACTIVE))
        .fetch_one(executor)
        .await
    }

    async fn apply_update<'e, E>(
        executor: E,
        id: Uuid,
        data: &UpdateCourseDto,
    ) -> Result<Option<Course>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Course>(
            r#"
            UPDATE courses SET
                title = COALESCE($2, title),
                credits = COALESCE($3, credits),
                teacher_name = COALESCE($4, teacher_name),
                status = COALESCE($5, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, code, title, credits, teacher_name, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&data.title)
        .bind(data.credits)
        .bind(&data.teacher_name)
        .bind(&data.status)
        .fetch_optional(executor)
        .await
    }

    fn creation_error(e: sqlx::Error, code: &str) -> AppError {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return AppError::bad_request(anyhow::anyhow!(
                    "Course with code {} already exists",
                    code
                ));
            }
        }
        AppError::database(e)
    }
}

#[async_trait]
impl ResourceService for CourseService {
    const NAME: &'static str = "courses";

    type Create = CreateCourseDto;
    type Update = UpdateCourseDto;
    type Filter = CourseFilter;
    type Response = Course;

    #[instrument(skip(self, db, filter))]
    async fn list(
        &self,
        db: &PgPool,
        params: &ListQuery,
        filter: &CourseFilter,
    ) -> Result<(i64, Vec<Course>), AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM courses WHERE 1=1");
        Self::push_filters(&mut count, params.query.as_deref(), filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(db)
            .await
            .map_err(AppError::database)?;

        let mut select = QueryBuilder::<Postgres>::new(
            "SELECT id, code, title, credits, teacher_name, status, created_at, updated_at FROM courses WHERE 1=1",
        );
        Self::push_filters(&mut select, params.query.as_deref(), filter);
        select.push(" ORDER BY ");
        select.push(Self::order_clause(params.sort.as_deref()));
        select.push(" LIMIT ");
        select.push_bind(params.size);
        select.push(" OFFSET ");
        select.push_bind(params.offset());

        let items = select
            .build_query_as::<Course>()
            .fetch_all(db)
            .await
            .map_err(AppError::database)?;

        Ok((total, items))
    }

    #[instrument(skip(self, db))]
    async fn get(&self, db: &PgPool, id: Uuid) -> Result<Option<Course>, AppError> {
        sqlx::query_as::<_, Course>(
            r#"
            SELECT id, code, title, credits, teacher_name, status, created_at, updated_at
            FROM courses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)
    }

    #[instrument(skip(self, db, data))]
    async fn create(&self, db: &PgPool, data: CreateCourseDto) -> Result<Course, AppError> {
        Self::insert(db, &data)
            .await
            .map_err(|e| Self::creation_error(e, &data.code))
    }

    #[instrument(skip(self, db, data))]
    async fn update(
        &self,
        db: &PgPool,
        id: Uuid,
        data: UpdateCourseDto,
    ) -> Result<Option<Course>, AppError> {
        Self::apply_update(db, id, &data)
            .await
            .map_err(AppError::database)
    }

    #[instrument(skip(self, db))]
    async fn delete(&self, db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Course not found")));
        }

        Ok(())
    }

    #[instrument(skip(self, db, items), fields(count = items.len()))]
    async fn batch_create(
        &self,
        db: &PgPool,
        items: Vec<CreateCourseDto>,
    ) -> Result<Vec<Course>, AppError> {
        let mut tx = db.begin().await.map_err(AppError::database)?;
        let mut created = Vec::with_capacity(items.len());

        for data in &items {
            let course = Self::insert(&mut *tx, data)
                .await
                .map_err(|e| Self::creation_error(e, &data.code))?;
            created.push(course);
        }

        tx.commit().await.map_err(AppError::database)?;
        Ok(created)
    }

    #[instrument(skip(self, db, items), fields(count = items.len()))]
    async fn batch_update(
        &self,
        db: &PgPool,
        items: Vec<BatchItem<UpdateCourseDto>>,
    ) -> Result<Vec<Course>, AppError> {
        let mut tx = db.begin().await.map_err(AppError::database)?;
        let mut updated = Vec::with_capacity(items.len());

        for item in &items {
            let course = Self::apply_update(&mut *tx, item.id, &item.data)
                .await
                .map_err(AppError::database)?
                .ok_or_else(|| {
                    AppError::not_found(anyhow::anyhow!("Course {} not found", item.id))
                })?;
            updated.push(course);
        }

        tx.commit().await.map_err(AppError::database)?;
        Ok(updated)
    }

    #[instrument(skip(self, db, ids), fields(count = ids.len()))]
    async fn batch_delete(&self, db: &PgPool, ids: &[Uuid]) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .execute(db)
            .await
            .map_err(AppError::database)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self, db, file))]
    async fn import_data(&self, db: &PgPool, file: Bytes) -> Result<ImportReport, AppError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(file.as_ref());

        let mut total = 0;
        let mut succeeded = 0;
        let mut failed = 0;
        let mut errors = Vec::new();

        for (index, row) in reader.deserialize::<CreateCourseDto>().enumerate() {
            let line = index + 2;
            total += 1;

            let data = match row {
                Ok(data) => data,
                Err(e) => {
                    failed += 1;
                    errors.push(format!("row {line}: {e}"));
                    continue;
                }
            };

            if let Err(e) = data.validate() {
                failed += 1;
                errors.push(format!("row {line}: {e}"));
                continue;
            }

            match self.create(db, data).await {
                Ok(_) => succeeded += 1,
                Err(e) => {
                    failed += 1;
                    errors.push(format!("row {line}: {}", e.error));
                }
            }
        }

        Ok(ImportReport {
            total,
            succeeded,
            failed,
            errors,
        })
    }

    #[instrument(skip(self, db, filter))]
    async fn export_data(
        &self,
        db: &PgPool,
        params: &ListQuery,
        filter: &CourseFilter,
    ) -> Result<ExportDescriptor, AppError> {
        let export_params = ListQuery {
            query: params.query.clone(),
            page: 1,
            size: self.config.export_row_limit,
            sort: params.sort.clone(),
        };
        let (_, courses) = self.list(db, &export_params, filter).await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        for course in &courses {
            writer.serialize(course).map_err(|e| {
                AppError::internal(anyhow::anyhow!("Failed to encode export row: {}", e))
            })?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to flush export: {}", e)))?;

        let filename = timestamped_filename("courses");
        write_export(&self.config.export_dir, &filename, bytes).await?;

        Ok(ExportDescriptor {
            url: format!("{}/{}", self.config.export_url_base, filename),
            filename,
            size: courses.len() as i64,
        })
    }

    #[instrument(skip(self, db, filter))]
    async fn stats(
        &self,
        db: &PgPool,
        params: &StatsQuery,
        filter: &CourseFilter,
    ) -> Result<StatsReport, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM courses WHERE 1=1");
        Self::push_filters(&mut count, None, filter);
        Self::push_date_range(&mut count, params);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(db)
            .await
            .map_err(AppError::database)?;

        let mut groups = Vec::new();
        if let Some(group_by) = params.group_by.as_deref() {
            // group_by is interpolated into SQL; the whitelist is the guard.
            if !GROUPABLE.contains(&group_by) {
                return Err(AppError::bad_request(anyhow::anyhow!(
                    "cannot group by {group_by}"
                )));
            }

            let mut builder = QueryBuilder::<Postgres>::new(format!(
                "SELECT COALESCE({group_by}::text, 'unknown') AS name, COUNT(*) AS value FROM courses WHERE 1=1"
            ));
            Self::push_filters(&mut builder, None, filter);
            Self::push_date_range(&mut builder, params);
            builder.push(format!(
                " GROUP BY COALESCE({group_by}::text, 'unknown') ORDER BY value DESC"
            ));

            let rows: Vec<(String, i64)> = builder
                .build_query_as()
                .fetch_all(db)
                .await
                .map_err(AppError::database)?;

            groups = rows
                .into_iter()
                .map(|(name, value)| StatsBucket { name, value })
                .collect();
        }

        let active: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses WHERE status = $1")
            .bind(course_status::ACTIVE)
            .fetch_one(db)
            .await
            .map_err(AppError::database)?;

        let total_credits: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(credits), 0)::bigint FROM courses")
                .fetch_one(db)
                .await
                .map_err(AppError::database)?;

        let mut summary = HashMap::new();
        summary.insert("total".to_string(), total);
        summary.insert("active".to_string(), active);
        summary.insert("total_credits".to_string(), total_credits);

        Ok(StatsReport {
            total,
            groups,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_clause_whitelist() {
        assert_eq!(CourseService::order_clause(Some("credits")), "credits ASC");
        assert_eq!(CourseService::order_clause(Some("-code")), "code DESC");
        assert_eq!(
            CourseService::order_clause(Some("teacher_name")),
            "created_at DESC"
        );
    }

    #[test]
    fn test_push_filters_credits_range() {
        use sqlx::Execute;

        let mut builder = QueryBuilder::<Postgres>::new("SELECT 1 FROM courses WHERE 1=1");
        let filter = CourseFilter {
            status: None,
            min_credits: Some(2),
            max_credits: Some(6),
        };
        CourseService::push_filters(&mut builder, None, &filter);

        let query = builder.build();
        let sql = query.sql();
        assert!(sql.contains("credits >="));
        assert!(sql.contains("credits <="));
    }
}
