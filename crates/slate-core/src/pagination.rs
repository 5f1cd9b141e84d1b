//! List query parameters and paginated responses.
//!
//! Pagination bounds are enforced by validation before a request reaches any
//! service: `page >= 1` and `size` within `[1, 100]`. Out-of-range values are
//! rejected rather than clamped.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

fn default_page() -> i64 {
    1
}

fn default_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

/// Common list parameters shared by every resource listing.
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
pub struct ListQuery {
    /// Keyword matched against the resource's searchable columns.
    pub query: Option<String>,
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: i64,
    #[serde(default = "default_size")]
    #[validate(range(min = 1, max = 100, message = "size must be between 1 and 100"))]
    pub size: i64,
    /// Sort field; prefix with `-` for descending order.
    pub sort: Option<String>,
}

impl ListQuery {
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.size
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            query: None,
            page: default_page(),
            size: default_size(),
            sort: None,
        }
    }
}

/// Paginated collection response: `{total, items, page, size}`.
///
/// Invariants: `items.len() <= size` and `total >= items.len()`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PageResponse<T> {
    pub total: i64,
    pub items: Vec<T>,
    pub page: i64,
    pub size: i64,
}

impl<T> PageResponse<T> {
    pub fn new(total: i64, items: Vec<T>, query: &ListQuery) -> Self {
        Self {
            total,
            items,
            page: query.page,
            size: query.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_defaults() {
        let query = ListQuery::default();
        assert_eq!(query.page, 1);
        assert_eq!(query.size, DEFAULT_PAGE_SIZE);
        assert_eq!(query.offset(), 0);
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_list_query_offset() {
        let query = ListQuery {
            page: 3,
            size: 25,
            ..ListQuery::default()
        };
        assert_eq!(query.offset(), 50);
    }

    #[test]
    fn test_list_query_rejects_page_zero() {
        let query = ListQuery {
            page: 0,
            ..ListQuery::default()
        };
        assert!(query.validate().is_err());
    }

    #[test]
    fn test_list_query_rejects_negative_page() {
        let query = ListQuery {
            page: -1,
            ..ListQuery::default()
        };
        assert!(query.validate().is_err());
    }

    #[test]
    fn test_list_query_rejects_size_zero() {
        let query = ListQuery {
            size: 0,
            ..ListQuery::default()
        };
        assert!(query.validate().is_err());
    }

    #[test]
    fn test_list_query_rejects_size_over_max() {
        let query = ListQuery {
            size: MAX_PAGE_SIZE + 1,
            ..ListQuery::default()
        };
        assert!(query.validate().is_err());
    }

    #[test]
    fn test_list_query_accepts_size_at_max() {
        let query = ListQuery {
            size: MAX_PAGE_SIZE,
            ..ListQuery::default()
        };
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_list_query_deserialize_from_query_string() {
        let query: ListQuery =
            serde_urlencoded_like(r#"{"query":"alice","page":2,"size":50}"#);
        assert_eq!(query.query.as_deref(), Some("alice"));
        assert_eq!(query.page, 2);
        assert_eq!(query.size, 50);
    }

    #[test]
    fn test_list_query_deserialize_missing_fields() {
        let query: ListQuery = serde_urlencoded_like("{}");
        assert_eq!(query.page, 1);
        assert_eq!(query.size, DEFAULT_PAGE_SIZE);
    }

    fn serde_urlencoded_like(json: &str) -> ListQuery {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_page_response_carries_query_paging() {
        let query = ListQuery {
            page: 2,
            size: 10,
            ..ListQuery::default()
        };
        let page = PageResponse::new(35, vec![1, 2, 3], &query);
        assert_eq!(page.total, 35);
        assert_eq!(page.page, 2);
        assert_eq!(page.size, 10);
        assert!(page.items.len() as i64 <= page.size);
        assert!(page.total >= page.items.len() as i64);
    }
}
