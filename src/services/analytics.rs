//! Analytics Aggregator: read-only rollups across the funnel.
//!
//! Every aggregate treats an empty table as zero or empty.

use std::fmt;

use crate::model::{ContentStatus, ToolRevenue, ToolStatus};
use crate::storage::SqliteStore;
use crate::Result;

/// Size of the ranking shown in reports.
pub const TOP_TOOLS: u64 = 5;

/// Point-in-time view of the funnel.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsSnapshot {
    pub tools_built: i64,
    pub products: i64,
    pub posted: i64,
    pub total_content: i64,
    pub total_revenue: f64,
    pub top_tools: Vec<ToolRevenue>,
}

impl fmt::Display for AnalyticsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📊 FUNNEL ANALYTICS")?;
        writeln!(f, "{}", "=".repeat(40))?;
        writeln!(f, "Tools built: {}", self.tools_built)?;
        writeln!(f, "Products published: {}", self.products)?;
        writeln!(f, "Content posted: {}/{}", self.posted, self.total_content)?;
        writeln!(f, "Total revenue: ${:.2}", self.total_revenue)?;
        writeln!(f)?;
        write!(f, "🏆 Top Tools (by revenue):")?;
        if self.top_tools.is_empty() {
            write!(f, "\n  (no revenue yet)")?;
        }
        for tool in &self.top_tools {
            write!(
                f,
                "\n  {}: ${:.2} ({} sales)",
                tool.slug, tool.revenue, tool.sales
            )?;
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct AnalyticsAggregator {
    store: SqliteStore,
}

impl AnalyticsAggregator {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }

    pub async fn count_tools(&self, status: ToolStatus) -> Result<i64> {
        self.store.count_tools(status).await
    }

    pub async fn count_products(&self) -> Result<i64> {
        self.store.count_products().await
    }

    /// `(posted, total)` content rows.
    pub async fn content_posted_ratio(&self) -> Result<(i64, i64)> {
        let posted = self.store.count_content(Some(ContentStatus::Posted)).await?;
        let total = self.store.count_content(None).await?;
        Ok((posted, total))
    }

    pub async fn total_revenue(&self) -> Result<f64> {
        self.store.total_revenue().await
    }

    /// Tools by summed revenue, highest first, ties by slug.
    pub async fn top_tools(&self, n: u64) -> Result<Vec<ToolRevenue>> {
        if n == 0 {
            return Ok(Vec::new());
        }
        self.store.revenue_ranking(n).await
    }

    /// The tool with the largest summed revenue, if any tool has metrics.
    pub async fn winner(&self) -> Result<Option<ToolRevenue>> {
        Ok(self.top_tools(1).await?.into_iter().next())
    }

    pub async fn snapshot(&self) -> Result<AnalyticsSnapshot> {
        let (posted, total_content) = self.content_posted_ratio().await?;
        Ok(AnalyticsSnapshot {
            tools_built: self.count_tools(ToolStatus::Built).await?,
            products: self.count_products().await?,
            posted,
            total_content,
            total_revenue: self.total_revenue().await?,
            top_tools: self.top_tools(TOP_TOOLS).await?,
        })
    }
}
