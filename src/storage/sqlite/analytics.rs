//! Read-only rollups across tools and metrics.

use sea_query::{Alias, Expr, Func, Order, Query, SqliteQueryBuilder};
use sqlx::Row;

use crate::model::ToolRevenue;
use crate::storage::schema::{Metrics, Tools};
use crate::Result;

use super::SqliteStore;

impl SqliteStore {
    /// Sum of revenue over every metric row; `0.0` when there are none.
    pub async fn total_revenue(&self) -> Result<f64> {
        // TOTAL() is SQLite's float-returning SUM that yields 0.0 on no rows.
        let query = Query::select()
            .expr(Func::cust(Alias::new("TOTAL")).arg(Expr::col(Metrics::Revenue)))
            .from(Metrics::Table)
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_one(&self.pool).await?;
        Ok(row.try_get(0)?)
    }

    /// Tools with at least one metric row, ranked by summed revenue.
    ///
    /// Descending by revenue, ties broken by slug ascending.
    pub async fn revenue_ranking(&self, limit: u64) -> Result<Vec<ToolRevenue>> {
        let revenue_sum = || {
            Func::cust(Alias::new("TOTAL")).arg(Expr::col((Metrics::Table, Metrics::Revenue)))
        };

        let query = Query::select()
            .column((Tools::Table, Tools::Id))
            .column((Tools::Table, Tools::Slug))
            .expr_as(revenue_sum(), Alias::new("revenue"))
            .expr_as(
                Expr::col((Metrics::Table, Metrics::Sales)).sum(),
                Alias::new("sales"),
            )
            .from(Tools::Table)
            .inner_join(
                Metrics::Table,
                Expr::col((Metrics::Table, Metrics::ToolId)).equals((Tools::Table, Tools::Id)),
            )
            .group_by_columns([(Tools::Table, Tools::Id), (Tools::Table, Tools::Slug)])
            .order_by_expr(revenue_sum().into(), Order::Desc)
            .order_by((Tools::Table, Tools::Slug), Order::Asc)
            .limit(limit)
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| {
                Ok(ToolRevenue {
                    tool_id: row.try_get("id")?,
                    slug: row.try_get("slug")?,
                    revenue: row.try_get("revenue")?,
                    sales: row.try_get("sales")?,
                })
            })
            .collect()
    }
}
