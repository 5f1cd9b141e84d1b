//! OpenAPI document.
//!
//! The generic resource router registers routes programmatically, so paths
//! are not annotated individually; the document carries the component
//! schemas and is served as JSON at `/api-docs/openapi.json`.

use utoipa::OpenApi;

use slate_models::auth::{LoginRequest, LoginResponse};
use slate_models::courses::{Course, CreateCourseDto, UpdateCourseDto};
use slate_models::reports::{ExportDescriptor, ImportReport, StatsBucket, StatsReport};
use slate_models::students::{CreateStudentDto, Student, UpdateStudentDto};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Slate API",
        description = "School management REST API with a generic resource router"
    ),
    components(schemas(
        Student,
        CreateStudentDto,
        UpdateStudentDto,
        Course,
        CreateCourseDto,
        UpdateCourseDto,
        LoginRequest,
        LoginResponse,
        ImportReport,
        ExportDescriptor,
        StatsBucket,
        StatsReport,
    )),
    tags(
        (name = "Auth", description = "Authentication"),
        (name = "Students", description = "Student management"),
        (name = "Courses", description = "Course management"),
    )
)]
pub struct ApiDoc;
