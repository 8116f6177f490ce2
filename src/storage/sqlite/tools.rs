//! Tool rows.

use std::path::PathBuf;

use sea_query::{Expr, Order, Query, SelectStatement, SqliteQueryBuilder};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use crate::model::{NewTool, Tool, ToolStatus};
use crate::storage::helpers::{now_rfc3339, parse_timestamp};
use crate::storage::schema::Tools;
use crate::{FunnelError, Result};

use super::SqliteStore;

fn select_tools() -> SelectStatement {
    Query::select()
        .columns([
            Tools::Id,
            Tools::Slug,
            Tools::Name,
            Tools::Niche,
            Tools::Version,
            Tools::BuildPath,
            Tools::LandingUrl,
            Tools::CreatedAt,
            Tools::Status,
        ])
        .from(Tools::Table)
        .to_owned()
}

pub(super) fn tool_from_row(row: &SqliteRow) -> Result<Tool> {
    let status: String = row.try_get("status")?;
    let created_at: String = row.try_get("created_at")?;
    let build_path: Option<String> = row.try_get("build_path")?;

    Ok(Tool {
        id: row.try_get("id")?,
        slug: row.try_get("slug")?,
        name: row.try_get("name")?,
        niche: row.try_get("niche")?,
        version: row.try_get("version")?,
        build_path: build_path.map(PathBuf::from),
        landing_url: row.try_get("landing_url")?,
        created_at: parse_timestamp(&created_at)?,
        status: status.parse()?,
    })
}

impl SqliteStore {
    /// Insert a tool inside the caller's transaction.
    ///
    /// The slug's UNIQUE constraint decides races between concurrent builds:
    /// the loser gets `Conflict` and nothing is written.
    pub async fn insert_tool(conn: &mut SqliteConnection, tool: &NewTool) -> Result<Tool> {
        let (created_at, created_at_str) = now_rfc3339();
        let build_path = tool.build_path.to_string_lossy().into_owned();

        let query = Query::insert()
            .into_table(Tools::Table)
            .columns([
                Tools::Slug,
                Tools::Name,
                Tools::Niche,
                Tools::Version,
                Tools::BuildPath,
                Tools::CreatedAt,
                Tools::Status,
            ])
            .values_panic([
                tool.slug.as_str().into(),
                tool.name.as_str().into(),
                tool.niche.as_str().into(),
                1_i64.into(),
                build_path.into(),
                created_at_str.into(),
                tool.status.as_str().into(),
            ])
            .to_string(SqliteQueryBuilder);

        let result = sqlx::query(&query)
            .execute(&mut *conn)
            .await
            .map_err(|e| FunnelError::from_write(e, || ("tool", tool.slug.clone())))?;

        Ok(Tool {
            id: result.last_insert_rowid(),
            slug: tool.slug.clone(),
            name: tool.name.clone(),
            niche: tool.niche.clone(),
            version: 1,
            build_path: Some(tool.build_path.clone()),
            landing_url: None,
            created_at,
            status: tool.status,
        })
    }

    /// Look up a tool by slug.
    pub async fn find_tool(&self, slug: &str) -> Result<Option<Tool>> {
        let query = select_tools()
            .and_where(Expr::col(Tools::Slug).eq(slug))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_optional(&self.pool).await?;
        row.as_ref().map(tool_from_row).transpose()
    }

    /// Look up a tool by slug, failing with `NotFound` if absent.
    pub async fn get_tool(&self, slug: &str) -> Result<Tool> {
        self.find_tool(slug)
            .await?
            .ok_or_else(|| FunnelError::not_found("tool", slug))
    }

    /// The earliest-created tool, if any.
    pub async fn first_tool(&self) -> Result<Option<Tool>> {
        let query = select_tools()
            .order_by(Tools::Id, Order::Asc)
            .limit(1)
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_optional(&self.pool).await?;
        row.as_ref().map(tool_from_row).transpose()
    }

    /// All tools in creation order.
    pub async fn list_tools(&self) -> Result<Vec<Tool>> {
        let query = select_tools()
            .order_by(Tools::Id, Order::Asc)
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        rows.iter().map(tool_from_row).collect()
    }

    /// Number of tools in the given status.
    pub async fn count_tools(&self, status: ToolStatus) -> Result<i64> {
        let query = Query::select()
            .expr(Expr::col(Tools::Id).count())
            .from(Tools::Table)
            .and_where(Expr::col(Tools::Status).eq(status.as_str()))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_one(&self.pool).await?;
        Ok(row.try_get(0)?)
    }
}
