use std::collections::HashMap;

use async_trait::async_trait;
use axum::body::Bytes;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use slate_config::ApiConfig;
use slate_core::{AppError, ListQuery};
use slate_models::reports::{ExportDescriptor, ImportReport, StatsBucket, StatsQuery, StatsReport};
use slate_models::students::{
    CreateStudentDto, Student, StudentFilter, UpdateStudentDto, student_status,
};

use crate::api::service::{BatchItem, ResourceService};
use crate::utils::export::{timestamped_filename, write_export};

/// Columns accepted by the `sort` parameter; anything else falls back to
/// the default ordering.
const SORTABLE: &[&str] = &[
    "name",
    "student_id",
    "grade_level",
    "status",
    "enrolled_at",
    "created_at",
];

/// Columns accepted by `group_by` in stats.
const GROUPABLE: &[&str] = &["status", "grade_level"];

pub struct StudentService {
    config: ApiConfig,
}

impl StudentService {
    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }

    /// Builds the ORDER BY clause. The column is interpolated into SQL;
    /// the whitelist above is the guard.
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
        filter: &StudentFilter,
    ) {
        if let Some(query) = query {
            if !query.is_empty() {
                builder
                    .push(" AND (name ILIKE ")
                    .push_bind(format!("%{query}%"))
                    .push(" OR student_id ILIKE ")
                    .push_bind(format!("%{query}%"))
                    .push(" OR email ILIKE ")
                    .push_bind(format!("%{query}%"))
                    .push(")");
            }
        }
        if let Some(status) = &filter.status {
            builder.push(" AND status = ").push_bind(status.clone());
        }
        if let Some(grade_level) = &filter.grade_level {
            builder
                .push(" AND grade_level = ")
                .push_bind(grade_level.clone());
        }
        if let Some(from) = filter.enrolled_from {
            builder.push(" AND enrolled_at >= ").push_bind(from);
        }
        if let Some(to) = filter.enrolled_to {
            builder.push(" AND enrolled_at <= ").push_bind(to);
        }
    }

    fn push_date_range(builder: &mut QueryBuilder<'_, Postgres>, params: &StatsQuery) {
        if let Some(start) = params.start_date {
            builder.push(" AND enrolled_at >= ").push_bind(start);
        }
        if let Some(end) = params.end_date {
            builder.push(" AND enrolled_at <= ").push_bind(end);
        }
    }

    async fn insert<'e, E>(executor: E, data: &CreateStudentDto) -> Result<Student, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students (name, student_id, email, phone, grade_level, status, enrolled_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, student_id, email, phone, grade_level, status, enrolled_at, created_at, updated_at
            "#,
        )
        .bind(&data.name)
        .bind(&data.student_id)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.grade_level)
        .bind(data.status.as_deref().unwrap_or(student_status::ACTIVE))
        .bind(data.enrolled_at)
        .fetch_one(executor)
        .await
    }

    async fn apply_update<'e, E>(
        executor: E,
        id: Uuid,
        data: &UpdateStudentDto,
    ) -> Result<Option<Student>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Student>(
            r#"
            UPDATE students SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                grade_level = COALESCE($5, grade_level),
                status = COALESCE($6, status),
                enrolled_at = COALESCE($7, enrolled_at),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, student_id, email, phone, grade_level, status, enrolled_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.grade_level)
        .bind(&data.status)
        .bind(data.enrolled_at)
        .fetch_optional(executor)
        .await
    }

    fn creation_error(e: sqlx::Error, student_number: &str) -> AppError {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return AppError::bad_request(anyhow::anyhow!(
                    "Student with number {} already exists",
                    student_number
                ));
            }
        }
        AppError::database(e)
    }
}

#[async_trait]
impl ResourceService for StudentService {
    const NAME: &'static str = "students";

    type Create = CreateStudentDto;
    type Update = UpdateStudentDto;
    type Filter = StudentFilter;
    type Response = Student;

    #[instrument(skip(self, db, filter))]
    async fn list(
        &self,
        db: &PgPool,
        params: &ListQuery,
        filter: &StudentFilter,
    ) -> Result<(i64, Vec<Student>), AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM students WHERE 1=1");
        Self::push_filters(&mut count, params.query.as_deref(), filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(db)
            .await
            .map_err(AppError::database)?;

        let mut select = QueryBuilder::<Postgres>::new(
            "SELECT id, name, student_id, email, phone, grade_level, status, enrolled_at, created_at, updated_at FROM students WHERE 1=1",
        );
        Self::push_filters(&mut select, params.query.as_deref(), filter);
        select.push(" ORDER BY ");
        select.push(Self::order_clause(params.sort.as_deref()));
        select.push(" LIMIT ");
        select.push_bind(params.size);
        select.push(" OFFSET ");
        select.push_bind(params.offset());

        let items = select
            .build_query_as::<Student>()
            .fetch_all(db)
            .await
            .map_err(AppError::database)?;

        Ok((total, items))
    }

    #[instrument(skip(self, db))]
    async fn get(&self, db: &PgPool, id: Uuid) -> Result<Option<Student>, AppError> {
        sqlx::query_as::<_, Student>(
            r#"
            SELECT id, name, student_id, email, phone, grade_level, status, enrolled_at, created_at, updated_at
            FROM students
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)
    }

    #[instrument(skip(self, db, data))]
    async fn create(&self, db: &PgPool, data: CreateStudentDto) -> Result<Student, AppError> {
        Self::insert(db, &data)
            .await
            .map_err(|e| Self::creation_error(e, &data.student_id))
    }

    #[instrument(skip(self, db, data))]
    async fn update(
        &self,
        db: &PgPool,
        id: Uuid,
        data: UpdateStudentDto,
    ) -> Result<Option<Student>, AppError> {
        Self::apply_update(db, id, &data)
            .await
            .map_err(AppError::database)
    }

    #[instrument(skip(self, db))]
    async fn delete(&self, db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Student not found")));
        }

        Ok(())
    }

    #[instrument(skip(self, db, items), fields(count = items.len()))]
    async fn batch_create(
        &self,
        db: &PgPool,
        items: Vec<CreateStudentDto>,
    ) -> Result<Vec<Student>, AppError> {
        let mut tx = db.begin().await.map_err(AppError::database)?;
        let mut created = Vec::with_capacity(items.len());

        for data in &items {
            let student = Self::insert(&mut *tx, data)
                .await
                .map_err(|e| Self::creation_error(e, &data.student_id))?;
            created.push(student);
        }

        tx.commit().await.map_err(AppError::database)?;
        Ok(created)
    }

    #[instrument(skip(self, db, items), fields(count = items.len()))]
    async fn batch_update(
        &self,
        db: &PgPool,
        items: Vec<BatchItem<UpdateStudentDto>>,
    ) -> Result<Vec<Student>, AppError> {
        let mut tx = db.begin().await.map_err(AppError::database)?;
        let mut updated = Vec::with_capacity(items.len());

        for item in &items {
            let student = Self::apply_update(&mut *tx, item.id, &item.data)
                .await
                .map_err(AppError::database)?
                .ok_or_else(|| {
                    AppError::not_found(anyhow::anyhow!("Student {} not found", item.id))
                })?;
            updated.push(student);
        }

        tx.commit().await.map_err(AppError::database)?;
        Ok(updated)
    }

    #[instrument(skip(self, db, ids), fields(count = ids.len()))]
    async fn batch_delete(&self, db: &PgPool, ids: &[Uuid]) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM students WHERE id = ANY($1)")
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

        for (index, row) in reader.deserialize::<CreateStudentDto>().enumerate() {
            // Header occupies line 1.
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
        filter: &StudentFilter,
    ) -> Result<ExportDescriptor, AppError> {
        let export_params = ListQuery {
            query: params.query.clone(),
            page: 1,
            size: self.config.export_row_limit,
            sort: params.sort.clone(),
        };
        let (_, students) = self.list(db, &export_params, filter).await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        for student in &students {
            writer.serialize(student).map_err(|e| {
                AppError::internal(anyhow::anyhow!("Failed to encode export row: {}", e))
            })?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to flush export: {}", e)))?;

        let filename = timestamped_filename("students");
        write_export(&self.config.export_dir, &filename, bytes).await?;

        Ok(ExportDescriptor {
            url: format!("{}/{}", self.config.export_url_base, filename),
            filename,
            size: students.len() as i64,
        })
    }

    #[instrument(skip(self, db, filter))]
    async fn stats(
        &self,
        db: &PgPool,
        params: &StatsQuery,
        filter: &StudentFilter,
    ) -> Result<StatsReport, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM students WHERE 1=1");
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
                "SELECT COALESCE({group_by}::text, 'unknown') AS name, COUNT(*) AS value FROM students WHERE 1=1"
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

        let active: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students WHERE status = $1")
            .bind(student_status::ACTIVE)
            .fetch_one(db)
            .await
            .map_err(AppError::database)?;

        let mut summary = HashMap::new();
        summary.insert("total".to_string(), total);
        summary.insert("active".to_string(), active);

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
    fn test_order_clause_default() {
        assert_eq!(StudentService::order_clause(None), "created_at DESC");
    }

    #[test]
    fn test_order_clause_ascending() {
        assert_eq!(StudentService::order_clause(Some("name")), "name ASC");
    }

    #[test]
    fn test_order_clause_descending() {
        assert_eq!(
            StudentService::order_clause(Some("-enrolled_at")),
            "enrolled_at DESC"
        );
    }

    #[test]
    fn test_order_clause_rejects_unknown_column() {
        assert_eq!(
            StudentService::order_clause(Some("password; DROP TABLE students")),
            "created_at DESC"
        );
    }

    #[test]
    fn test_push_filters_builds_expected_sql() {
        use sqlx::Execute;

        let mut builder = QueryBuilder::<Postgres>::new("SELECT 1 FROM students WHERE 1=1");
        let filter = StudentFilter {
            status: Some("active".to_string()),
            grade_level: Some("10".to_string()),
            enrolled_from: None,
            enrolled_to: None,
        };
        StudentService::push_filters(&mut builder, Some("alice"), &filter);

        let query = builder.build();
        let sql = query.sql();
        assert!(sql.contains("name ILIKE"));
        assert!(sql.contains("status ="));
        assert!(sql.contains("grade_level ="));
        assert!(!sql.contains("enrolled_at"));
    }
}
