//! Report types shared by import, export, and stats endpoints.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Result of a file import: row counts plus per-row error messages.
///
/// Imports are best-effort: valid rows commit, invalid rows are reported
/// here with their row number.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImportReport {
    pub total: i64,
    pub succeeded: i64,
    pub failed: i64,
    pub errors: Vec<String>,
}

/// Descriptor of a generated export file.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExportDescriptor {
    /// URL path the file is served under.
    pub url: String,
    pub filename: String,
    /// Number of exported rows.
    pub size: i64,
}

/// Parameters for a stats aggregation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
pub struct StatsQuery {
    /// Column to group by; must be in the resource's groupable whitelist.
    pub group_by: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// One group in a stats breakdown.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatsBucket {
    pub name: String,
    pub value: i64,
}

/// Aggregated statistics: total, optional grouped breakdown, and a
/// resource-specific summary.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatsReport {
    pub total: i64,
    pub groups: Vec<StatsBucket>,
    pub summary: HashMap<String, i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_report_round_trip() {
        let report = ImportReport {
            total: 3,
            succeeded: 2,
            failed: 1,
            errors: vec!["row 3: missing name".to_string()],
        };
        let json = serde_json::to_string(&report).unwrap();
        let parsed: ImportReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.total, 3);
        assert_eq!(parsed.errors.len(), 1);
    }

    #[test]
    fn test_stats_query_defaults() {
        let query: StatsQuery = serde_json::from_str("{}").unwrap();
        assert!(query.group_by.is_none());
        assert!(query.start_date.is_none());
    }

    #[test]
    fn test_stats_report_round_trip() {
        let report = StatsReport {
            total: 10,
            groups: vec![StatsBucket {
                name: "active".to_string(),
                value: 8,
            }],
            summary: HashMap::from([("active".to_string(), 8)]),
        };
        let json = serde_json::to_string(&report).unwrap();
        let parsed: StatsReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.total, 10);
        assert_eq!(parsed.groups[0].name, "active");
    }
}
