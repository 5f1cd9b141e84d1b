//! Capability code constants and helpers.
//!
//! Capability codes take the form `"<resource>:<action>"`, e.g.
//! `"students:read"`. Using these helpers instead of string literals keeps
//! the codes consistent between route guards and the seeded permission
//! catalog.

/// Permission code granting unrestricted access.
pub const SUPER_ADMIN: &str = "super_admin";

/// Wildcard capability, equivalent to [`SUPER_ADMIN`].
pub const WILDCARD: &str = "*:*";

/// Standard actions shared by every resource.
pub mod actions {
    pub const READ: &str = "read";
    pub const CREATE: &str = "create";
    pub const UPDATE: &str = "update";
    pub const DELETE: &str = "delete";
    pub const EXPORT: &str = "export";
}

/// Builds a capability code for a resource/action pair.
///
/// # Example
///
/// ```
/// use slate_core::permissions::{actions, code};
///
/// assert_eq!(code("students", actions::READ), "students:read");
/// ```
pub fn code(resource: &str, action: &str) -> String {
    format!("{resource}:{action}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_shape() {
        assert_eq!(code("courses", actions::DELETE), "courses:delete");
    }

    #[test]
    fn test_markers_are_distinct() {
        assert_ne!(SUPER_ADMIN, WILDCARD);
    }
}
