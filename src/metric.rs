//! Metric record types shared by the server, the importer and the dashboard

use serde::{Deserialize, Serialize};

/// A metric as the dashboard sees it
///
/// This is the `id/org/date` projection of a stored [`MetricRecord`].
/// Extra fields in a response body are ignored when parsing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Metric {
    pub id: i64,
    pub org: String,
    pub date: String,
}

/// A stored metric snapshot: one GitHub Copilot metrics day for one org
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MetricRecord {
    pub id: i64,
    pub org: String,
    pub date: String,
    /// Raw day object as returned by the GitHub API
    pub data: serde_json::Value,
}

impl From<MetricRecord> for Metric {
    fn from(record: MetricRecord) -> Self {
        Self {
            id: record.id,
            org: record.org,
            date: record.date,
        }
    }
}

/// Pretty-print a metric collection as two-space indented JSON
pub fn format_collection(metrics: &[Metric]) -> String {
    // Serializing plain structs of strings and integers cannot fail
    serde_json::to_string_pretty(metrics).unwrap_or_else(|_| "[]".to_string())
}
