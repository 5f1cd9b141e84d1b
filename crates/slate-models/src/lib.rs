//! # Slate Models
//!
//! Domain models and DTOs for the Slate API.
//!
//! This crate provides the data structures used throughout the Slate
//! application: database entities, request/response DTOs, validation
//! schemas, and the report types shared by import/export/stats endpoints.
//!
//! # Modules
//!
//! - [`auth`]: Login request/response models
//! - [`courses`]: Course entity, DTOs, and filter
//! - [`reports`]: Import/export/stats report types
//! - [`students`]: Student entity, DTOs, and filter
//! - [`users`]: User account model

pub mod auth;
pub mod courses;
pub mod reports;
pub mod students;
pub mod users;
