//! Student data models and DTOs.
//!
//! Re-exported from the `slate-models` crate.

pub use slate_models::students::*;
