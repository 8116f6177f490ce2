//! Shared storage helper functions.
//!
//! Timestamp, date and JSON column conversions used by the SQLite store.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::{FunnelError, Result};

/// Current time as an RFC3339 string, the format every timestamp column uses.
pub fn now_rfc3339() -> (DateTime<Utc>, String) {
    let now = Utc::now();
    (now, now.to_rfc3339())
}

/// Parse a stored RFC3339 timestamp.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| FunnelError::InvalidState(format!("timestamp '{value}': {e}")))
}

/// Parse a nullable stored timestamp.
pub fn parse_optional_timestamp(value: Option<String>) -> Result<Option<DateTime<Utc>>> {
    value.as_deref().map(parse_timestamp).transpose()
}

/// Parse a stored `YYYY-MM-DD` calendar day.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| FunnelError::InvalidState(format!("date '{value}': {e}")))
}

/// Decode the platform view map. Empty text is treated as no views.
pub fn parse_platform_views(value: &str) -> Result<BTreeMap<String, i64>> {
    if value.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    serde_json::from_str(value)
        .map_err(|e| FunnelError::InvalidState(format!("platform views '{value}': {e}")))
}
