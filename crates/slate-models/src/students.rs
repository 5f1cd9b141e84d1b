//! Student domain models and DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Enrollment status values stored in `students.status`.
pub mod student_status {
    pub const ACTIVE: &str = "active";
    pub const SUSPENDED: &str = "suspended";
    pub const GRADUATED: &str = "graduated";
    pub const WITHDRAWN: &str = "withdrawn";

    pub const ALL: &[&str] = &[ACTIVE, SUSPENDED, GRADUATED, WITHDRAWN];

    pub fn is_valid(status: &str) -> bool {
        ALL.contains(&status)
    }
}

/// A student record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    /// School-assigned student number, unique per installation.
    pub student_id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub grade_level: Option<String>,
    pub status: String,
    pub enrolled_at: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// DTO for creating a student.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct CreateStudentDto {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 32), custom(function = validate_student_number))]
    pub student_id: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(custom(function = validate_phone))]
    pub phone: Option<String>,
    #[validate(length(max = 10))]
    pub grade_level: Option<String>,
    #[validate(custom(function = validate_status))]
    pub status: Option<String>,
    pub enrolled_at: Option<NaiveDate>,
}

/// DTO for updating a student. All fields optional; only provided fields
/// are written.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct UpdateStudentDto {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(custom(function = validate_phone))]
    pub phone: Option<String>,
    #[validate(length(max = 10))]
    pub grade_level: Option<String>,
    #[validate(custom(function = validate_status))]
    pub status: Option<String>,
    pub enrolled_at: Option<NaiveDate>,
}

/// Optional list filters. Absent fields mean "no constraint".
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
pub struct StudentFilter {
    pub status: Option<String>,
    pub grade_level: Option<String>,
    pub enrolled_from: Option<NaiveDate>,
    pub enrolled_to: Option<NaiveDate>,
}

fn validate_student_number(value: &str) -> Result<(), ValidationError> {
    if value.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("student_number");
        err.message = Some("student_id may only contain letters and digits".into());
        Err(err)
    }
}

fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if value.chars().all(|c| c.is_ascii_digit() || c == '+') {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone");
        err.message = Some("phone may only contain digits and a leading +".into());
        Err(err)
    }
}

fn validate_status(value: &str) -> Result<(), ValidationError> {
    if student_status::is_valid(value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("status");
        err.message = Some("unknown student status".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_create() -> CreateStudentDto {
        CreateStudentDto {
            name: "Alice".to_string(),
            student_id: "S001".to_string(),
            email: Some("alice@example.com".to_string()),
            phone: None,
            grade_level: Some("10".to_string()),
            status: None,
            enrolled_at: None,
        }
    }

    #[test]
    fn test_create_dto_valid() {
        assert!(valid_create().validate().is_ok());
    }

    #[test]
    fn test_create_dto_rejects_empty_name() {
        let dto = CreateStudentDto {
            name: "".to_string(),
            ..valid_create()
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_create_dto_rejects_non_alphanumeric_student_id() {
        let dto = CreateStudentDto {
            student_id: "S-001!".to_string(),
            ..valid_create()
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_create_dto_rejects_bad_email() {
        let dto = CreateStudentDto {
            email: Some("not-an-email".to_string()),
            ..valid_create()
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_create_dto_rejects_unknown_status() {
        let dto = CreateStudentDto {
            status: Some("enrolled".to_string()),
            ..valid_create()
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_create_dto_accepts_known_status() {
        let dto = CreateStudentDto {
            status: Some(student_status::GRADUATED.to_string()),
            ..valid_create()
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_update_dto_empty_is_valid() {
        let dto = UpdateStudentDto {
            name: None,
            email: None,
            phone: None,
            grade_level: None,
            status: None,
            enrolled_at: None,
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_update_dto_rejects_bad_phone() {
        let dto = UpdateStudentDto {
            name: None,
            email: None,
            phone: Some("555-CALL".to_string()),
            grade_level: None,
            status: None,
            enrolled_at: None,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_filter_deserializes_with_missing_fields() {
        let filter: StudentFilter = serde_json::from_str("{}").unwrap();
        assert!(filter.status.is_none());
        assert!(filter.grade_level.is_none());
    }

    #[test]
    fn test_status_catalog() {
        assert!(student_status::is_valid("active"));
        assert!(!student_status::is_valid("expelled"));
    }
}
