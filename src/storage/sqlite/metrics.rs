//! Metric rows.
//!
//! The funnel only reads metrics; [`SqliteStore::append_metric`] is the
//! entry point for the external ingestion collaborator.

use sea_query::{Expr, Order, Query, SqliteQueryBuilder};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::debug;

use crate::model::{Metric, NewMetric};
use crate::storage::helpers::{parse_date, parse_platform_views};
use crate::storage::schema::Metrics;
use crate::{FunnelError, Result};

use super::SqliteStore;

const DATE_FORMAT: &str = "%Y-%m-%d";

fn metric_from_row(row: &SqliteRow) -> Result<Metric> {
    let date: String = row.try_get("date")?;
    let views: String = row.try_get("platform_views_json")?;
    Ok(Metric {
        id: row.try_get("id")?,
        tool_id: row.try_get("tool_id")?,
        date: parse_date(&date)?,
        clicks: row.try_get("clicks")?,
        sales: row.try_get("sales")?,
        revenue: row.try_get("revenue")?,
        platform_views: parse_platform_views(&views)?,
    })
}

impl SqliteStore {
    /// Append one day's snapshot for a tool.
    ///
    /// Fails with `NotFound` for an unknown slug and `Conflict` if the tool
    /// already has a row for that date.
    pub async fn append_metric(&self, tool_slug: &str, metric: &NewMetric) -> Result<Metric> {
        let tool = self.get_tool(tool_slug).await?;
        let date = metric.date.format(DATE_FORMAT).to_string();
        let views = serde_json::to_string(&metric.platform_views)?;

        let query = Query::insert()
            .into_table(Metrics::Table)
            .columns([
                Metrics::ToolId,
                Metrics::Date,
                Metrics::Clicks,
                Metrics::Sales,
                Metrics::Revenue,
                Metrics::PlatformViews,
            ])
            .values_panic([
                tool.id.into(),
                date.clone().into(),
                metric.clicks.into(),
                metric.sales.into(),
                metric.revenue.into(),
                views.into(),
            ])
            .to_string(SqliteQueryBuilder);

        let result = sqlx::query(&query)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                FunnelError::from_write(e, || ("metric", format!("{tool_slug} on {date}")))
            })?;

        debug!(slug = %tool_slug, %date, revenue = metric.revenue, "Metric appended");

        Ok(Metric {
            id: result.last_insert_rowid(),
            tool_id: tool.id,
            date: metric.date,
            clicks: metric.clicks,
            sales: metric.sales,
            revenue: metric.revenue,
            platform_views: metric.platform_views.clone(),
        })
    }

    /// Metrics for a tool, oldest day first.
    pub async fn list_metrics(&self, tool_id: i64) -> Result<Vec<Metric>> {
        let query = Query::select()
            .columns([
                Metrics::Id,
                Metrics::ToolId,
                Metrics::Date,
                Metrics::Clicks,
                Metrics::Sales,
                Metrics::Revenue,
                Metrics::PlatformViews,
            ])
            .from(Metrics::Table)
            .and_where(Expr::col(Metrics::ToolId).eq(tool_id))
            .order_by(Metrics::Date, Order::Asc)
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        rows.iter().map(metric_from_row).collect()
    }
}
