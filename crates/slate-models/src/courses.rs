//! Course domain models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Lifecycle status values stored in `courses.status`.
pub mod course_status {
    pub const ACTIVE: &str = "active";
    pub const ARCHIVED: &str = "archived";

    pub const ALL: &[&str] = &[ACTIVE, ARCHIVED];

    pub fn is_valid(status: &str) -> bool {
        ALL.contains(&status)
    }
}

/// A course record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Course {
    pub id: Uuid,
    /// Catalog code, unique per installation (e.g. `MATH101`).
    pub code: String,
    pub title: String,
    pub credits: i32,
    pub teacher_name: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// DTO for creating a course.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct CreateCourseDto {
    #[validate(length(min = 1, max = 32), custom(function = validate_course_code))]
    pub code: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(range(min = 0, max = 30))]
    pub credits: i32,
    #[validate(length(max = 100))]
    pub teacher_name: Option<String>,
    #[validate(custom(function = validate_status))]
    pub status: Option<String>,
}

/// DTO for updating a course. All fields optional.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct UpdateCourseDto {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(range(min = 0, max = 30))]
    pub credits: Option<i32>,
    #[validate(length(max = 100))]
    pub teacher_name: Option<String>,
    #[validate(custom(function = validate_status))]
    pub status: Option<String>,
}

/// Optional list filters. Absent fields mean "no constraint".
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
pub struct CourseFilter {
    pub status: Option<String>,
    pub min_credits: Option<i32>,
    pub max_credits: Option<i32>,
}

fn validate_course_code(value: &str) -> Result<(), ValidationError> {
    if value.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("course_code");
        err.message = Some("code may only contain letters and digits".into());
        Err(err)
    }
}

fn validate_status(value: &str) -> Result<(), ValidationError> {
    if course_status::is_valid(value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("status");
        err.message = Some("unknown course status".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_create() -> CreateCourseDto {
        CreateCourseDto {
            code: "MATH101".to_string(),
            title: "Calculus I".to_string(),
            credits: 4,
            teacher_name: Some("R. Lee".to_string()),
            status: None,
        }
    }

    #[test]
    fn test_create_dto_valid() {
        assert!(valid_create().validate().is_ok());
    }

    #[test]
    fn test_create_dto_rejects_bad_code() {
        let dto = CreateCourseDto {
            code: "MATH-101".to_string(),
            ..valid_create()
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_create_dto_rejects_excessive_credits() {
        let dto = CreateCourseDto {
            credits: 31,
            ..valid_create()
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_update_dto_rejects_unknown_status() {
        let dto = UpdateCourseDto {
            title: None,
            credits: None,
            teacher_name: None,
            status: Some("retired".to_string()),
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_filter_defaults() {
        let filter = CourseFilter::default();
        assert!(filter.status.is_none());
        assert!(filter.min_credits.is_none());
    }
}
