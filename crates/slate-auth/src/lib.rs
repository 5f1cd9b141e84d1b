//! # Slate Auth
//!
//! Authentication types and JWT utilities for the Slate API.
//!
//! This crate provides:
//!
//! - [`claims`]: JWT claim structure for access tokens
//! - [`jwt`]: Token creation and verification utilities
//!
//! Access tokens identify the caller; they do not embed permissions. The
//! caller's effective permission set is resolved (and cached) server-side
//! per request, so role changes take effect without re-issuing tokens.
//!
//! # Example
//!
//! ```ignore
//! use slate_auth::{create_access_token, verify_token};
//! use slate_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token(user_id, "user@example.com", &config)?;
//! let claims = verify_token(&token, &config)?;
//! ```

pub mod claims;
pub mod jwt;

pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
