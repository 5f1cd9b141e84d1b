//! # Slate Core
//!
//! Core types, errors, and utilities for the Slate API.
//!
//! This crate provides foundational types used throughout the Slate
//! application:
//!
//! - [`errors`]: Application error types with HTTP response conversion
//! - [`response`]: The uniform `{code, message, data}` response envelope
//! - [`pagination`]: List query parameters and paginated responses
//! - [`permissions`]: Capability code constants and helpers
//!
//! # Example
//!
//! ```ignore
//! use slate_core::errors::AppError;
//! use slate_core::pagination::{ListQuery, PageResponse};
//! use slate_core::response::Envelope;
//!
//! let error = AppError::not_found(anyhow::anyhow!("record not found"));
//! let page = PageResponse::new(0, Vec::<()>::new(), &ListQuery::default());
//! let body = Envelope::ok(page);
//! ```

pub mod errors;
pub mod pagination;
pub mod permissions;
pub mod response;

pub use errors::AppError;
pub use pagination::{ListQuery, PageResponse};
pub use response::Envelope;
