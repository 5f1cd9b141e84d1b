//! # Slate Config
//!
//! Configuration types for the Slate API.
//!
//! This crate provides configuration structures loaded from environment
//! variables:
//!
//! - [`jwt`]: JWT authentication configuration
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`rate_limit`]: API rate limiting configuration
//! - [`api`]: Cache TTLs, export storage, and permission-cache tunables
//!
//! Configuration is constructed once at startup and carried inside the
//! application state; nothing reads the environment after boot.
//!
//! # Example
//!
//! ```ignore
//! use slate_config::{ApiConfig, CorsConfig, JwtConfig, RateLimitConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let cors_config = CorsConfig::from_env();
//! let rate_limit_config = RateLimitConfig::from_env();
//! let api_config = ApiConfig::from_env();
//! ```

pub mod api;
pub mod cors;
pub mod jwt;
pub mod rate_limit;

// Re-export commonly used types at crate root
pub use api::ApiConfig;
pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use rate_limit::RateLimitConfig;
