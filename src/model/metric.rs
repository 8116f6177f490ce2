use std::collections::BTreeMap;

use chrono::NaiveDate;

/// A per-day performance snapshot for a tool.
///
/// Written by the external metrics-ingestion collaborator; read-only to the
/// rest of the funnel. At most one row per `(tool_id, date)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub id: i64,
    pub tool_id: i64,
    pub date: NaiveDate,
    pub clicks: i64,
    pub sales: i64,
    pub revenue: f64,
    /// Platform name to view count. Opaque to the funnel.
    pub platform_views: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Default)]
pub struct NewMetric {
    pub date: NaiveDate,
    pub clicks: i64,
    pub sales: i64,
    pub revenue: f64,
    pub platform_views: BTreeMap<String, i64>,
}

/// Summed metric totals for one tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolRevenue {
    pub tool_id: i64,
    pub slug: String,
    pub revenue: f64,
    pub sales: i64,
}
