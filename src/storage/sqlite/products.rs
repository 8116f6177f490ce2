//! Product rows.

use sea_query::{Expr, OnConflict, Order, Query, SelectStatement, SqliteQueryBuilder};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::model::{NewProduct, Product};
use crate::storage::helpers::{now_rfc3339, parse_timestamp};
use crate::storage::schema::Products;
use crate::{FunnelError, Result};

use super::SqliteStore;

fn select_products() -> SelectStatement {
    Query::select()
        .columns([
            Products::Id,
            Products::ToolId,
            Products::Platform,
            Products::ProductId,
            Products::Url,
            Products::Price,
            Products::CreatedAt,
        ])
        .from(Products::Table)
        .to_owned()
}

fn product_from_row(row: &SqliteRow) -> Result<Product> {
    let created_at: String = row.try_get("created_at")?;
    Ok(Product {
        id: row.try_get("id")?,
        tool_id: row.try_get("tool_id")?,
        platform: row.try_get("platform")?,
        product_id: row.try_get("product_id")?,
        url: row.try_get("url")?,
        price: row.try_get("price")?,
        created_at: parse_timestamp(&created_at)?,
    })
}

impl SqliteStore {
    /// Record a confirmed remote listing.
    ///
    /// Idempotent on `(platform, product_id)`: recording the same external
    /// listing twice returns the row written the first time.
    pub async fn insert_product(&self, product: &NewProduct) -> Result<Product> {
        let (_, created_at) = now_rfc3339();

        let insert = Query::insert()
            .into_table(Products::Table)
            .columns([
                Products::ToolId,
                Products::Platform,
                Products::ProductId,
                Products::Url,
                Products::Price,
                Products::CreatedAt,
            ])
            .values_panic([
                product.tool_id.into(),
                product.platform.as_str().into(),
                product.product_id.as_str().into(),
                product.url.as_str().into(),
                product.price.into(),
                created_at.into(),
            ])
            .on_conflict(
                OnConflict::columns([Products::Platform, Products::ProductId])
                    .do_nothing()
                    .to_owned(),
            )
            .to_string(SqliteQueryBuilder);

        sqlx::query(&insert)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                FunnelError::from_write(e, || ("tool", format!("id {}", product.tool_id)))
            })?;

        let select = select_products()
            .and_where(Expr::col(Products::Platform).eq(product.platform.as_str()))
            .and_where(Expr::col(Products::ProductId).eq(product.product_id.as_str()))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&select).fetch_one(&self.pool).await?;
        product_from_row(&row)
    }

    /// Products listed for a tool, oldest first.
    pub async fn list_products(&self, tool_id: i64) -> Result<Vec<Product>> {
        let query = select_products()
            .and_where(Expr::col(Products::ToolId).eq(tool_id))
            .order_by(Products::Id, Order::Asc)
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        rows.iter().map(product_from_row).collect()
    }

    /// Number of recorded products.
    pub async fn count_products(&self) -> Result<i64> {
        let query = Query::select()
            .expr(Expr::col(Products::Id).count())
            .from(Products::Table)
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_one(&self.pool).await?;
        Ok(row.try_get(0)?)
    }
}
