//! Content rows and the posting claim.

use std::time::Duration;

use chrono::Utc;
use sea_query::{Expr, Order, Query, SelectStatement, SqliteQueryBuilder};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::{debug, warn};

use crate::model::{Content, ContentStatus, NewContent};
use crate::storage::helpers::{now_rfc3339, parse_optional_timestamp};
use crate::storage::schema::{ContentItems, Tools};
use crate::{FunnelError, Result};

use super::SqliteStore;

const CONTENT_COLUMNS: [ContentItems; 10] = [
    ContentItems::Id,
    ContentItems::ToolId,
    ContentItems::Platform,
    ContentItems::VideoPath,
    ContentItems::Caption,
    ContentItems::Hashtags,
    ContentItems::ScheduledAt,
    ContentItems::PostedAt,
    ContentItems::PostedUrl,
    ContentItems::Status,
];

fn select_content() -> SelectStatement {
    Query::select()
        .columns(CONTENT_COLUMNS.map(|col| (ContentItems::Table, col)))
        .from(ContentItems::Table)
        .to_owned()
}

fn content_from_row(row: &SqliteRow) -> Result<Content> {
    let status: String = row.try_get("status")?;
    Ok(Content {
        id: row.try_get("id")?,
        tool_id: row.try_get("tool_id")?,
        platform: row.try_get("platform")?,
        video_path: row.try_get("video_path")?,
        caption: row.try_get("caption")?,
        hashtags: row.try_get("hashtags")?,
        scheduled_at: parse_optional_timestamp(row.try_get("scheduled_at")?)?,
        posted_at: parse_optional_timestamp(row.try_get("posted_at")?)?,
        posted_url: row.try_get("posted_url")?,
        status: status.parse()?,
    })
}

impl SqliteStore {
    /// Insert one `generated` content row inside the caller's transaction.
    pub async fn insert_content(
        conn: &mut SqliteConnection,
        item: &NewContent,
    ) -> Result<Content> {
        let query = Query::insert()
            .into_table(ContentItems::Table)
            .columns([
                ContentItems::ToolId,
                ContentItems::Platform,
                ContentItems::VideoPath,
                ContentItems::Caption,
                ContentItems::Hashtags,
                ContentItems::Status,
            ])
            .values_panic([
                item.tool_id.into(),
                item.platform.as_str().into(),
                item.video_path.as_str().into(),
                item.caption.as_str().into(),
                item.hashtags.as_str().into(),
                ContentStatus::Generated.as_str().into(),
            ])
            .to_string(SqliteQueryBuilder);

        let result = sqlx::query(&query)
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                FunnelError::from_write(e, || ("tool", format!("id {}", item.tool_id)))
            })?;

        Ok(Content {
            id: result.last_insert_rowid(),
            tool_id: item.tool_id,
            platform: item.platform.clone(),
            video_path: Some(item.video_path.clone()),
            caption: item.caption.clone(),
            hashtags: item.hashtags.clone(),
            scheduled_at: None,
            posted_at: None,
            posted_url: None,
            status: ContentStatus::Generated,
        })
    }

    /// Fetch one content row.
    pub async fn get_content(&self, id: i64) -> Result<Content> {
        let query = select_content()
            .and_where(Expr::col((ContentItems::Table, ContentItems::Id)).eq(id))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| FunnelError::not_found("content", id.to_string()))?;
        content_from_row(&row)
    }

    /// Content rows for a tool in insertion order.
    pub async fn list_content(&self, tool_id: i64) -> Result<Vec<Content>> {
        let query = select_content()
            .and_where(Expr::col((ContentItems::Table, ContentItems::ToolId)).eq(tool_id))
            .order_by((ContentItems::Table, ContentItems::Id), Order::Asc)
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        rows.iter().map(content_from_row).collect()
    }

    /// Number of content rows, optionally restricted to one status.
    pub async fn count_content(&self, status: Option<ContentStatus>) -> Result<i64> {
        let mut query = Query::select();
        query
            .expr(Expr::col(ContentItems::Id).count())
            .from(ContentItems::Table);
        if let Some(status) = status {
            query.and_where(Expr::col(ContentItems::Status).eq(status.as_str()));
        }

        let row = sqlx::query(&query.to_string(SqliteQueryBuilder))
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get(0)?)
    }

    /// Claim the oldest `generated` row for a platform.
    ///
    /// The row is leased in a short IMMEDIATE transaction that stamps
    /// `claimed_at` and commits; no lock is held afterwards. Rows under a
    /// live lease are skipped, so a concurrent claimer for the same platform
    /// gets `None`. Leases older than the store's claim lease are treated as
    /// abandoned. Ties on age are broken by lowest id.
    pub async fn claim_oldest_generated(&self, platform: &str) -> Result<Option<ContentClaim>> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

        let leased = match lease_oldest(&mut conn, platform, self.claim_lease).await {
            Ok(leased) => leased,
            Err(e) => {
                rollback(&mut conn).await;
                return Err(e);
            }
        };

        if let Err(e) = sqlx::query("COMMIT").execute(&mut *conn).await {
            rollback(&mut conn).await;
            // Never hand a connection with an open transaction back to the pool.
            drop(conn.detach());
            return Err(e.into());
        }

        Ok(leased.map(|(content, tool_slug, tool_name, lease)| {
            debug!(content_id = content.id, %platform, lease, "Claimed content for posting");
            ContentClaim {
                pool: self.pool.clone(),
                content,
                tool_slug,
                tool_name,
                lease,
                finished: false,
            }
        }))
    }
}

type Leased = (Content, String, String, i64);

async fn lease_oldest(
    conn: &mut SqliteConnection,
    platform: &str,
    claim_lease: Duration,
) -> Result<Option<Leased>> {
    let lease = Utc::now().timestamp_micros();
    let lease_micros = i64::try_from(claim_lease.as_micros()).unwrap_or(i64::MAX);
    let expired_before = lease.saturating_sub(lease_micros);

    let query = select_content()
        .column((Tools::Table, Tools::Slug))
        .column((Tools::Table, Tools::Name))
        .inner_join(
            Tools::Table,
            Expr::col((Tools::Table, Tools::Id)).equals((ContentItems::Table, ContentItems::ToolId)),
        )
        .and_where(Expr::col((ContentItems::Table, ContentItems::Platform)).eq(platform))
        .and_where(
            Expr::col((ContentItems::Table, ContentItems::Status))
                .eq(ContentStatus::Generated.as_str()),
        )
        .and_where(
            Expr::col((ContentItems::Table, ContentItems::ClaimedAt))
                .is_null()
                .or(Expr::col((ContentItems::Table, ContentItems::ClaimedAt)).lt(expired_before)),
        )
        .order_by((ContentItems::Table, ContentItems::Id), Order::Asc)
        .limit(1)
        .to_string(SqliteQueryBuilder);

    let Some(row) = sqlx::query(&query).fetch_optional(&mut *conn).await? else {
        return Ok(None);
    };
    let content = content_from_row(&row)?;
    let tool_slug: String = row.try_get("slug")?;
    let tool_name: String = row.try_get("name")?;

    let update = Query::update()
        .table(ContentItems::Table)
        .value(ContentItems::ClaimedAt, lease)
        .and_where(Expr::col(ContentItems::Id).eq(content.id))
        .and_where(Expr::col(ContentItems::Status).eq(ContentStatus::Generated.as_str()))
        .to_string(SqliteQueryBuilder);
    let updated = sqlx::query(&update).execute(&mut *conn).await?.rows_affected();
    if updated != 1 {
        return Err(FunnelError::InvalidState(format!(
            "content {} changed while being claimed",
            content.id
        )));
    }

    Ok(Some((content, tool_slug, tool_name, lease)))
}

async fn rollback(conn: &mut SqliteConnection) {
    if let Err(e) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
        warn!(error = %e, "Rollback failed");
    }
}

fn release_query(content_id: i64, lease: i64) -> String {
    Query::update()
        .table(ContentItems::Table)
        .value(ContentItems::ClaimedAt, Option::<i64>::None)
        .and_where(Expr::col(ContentItems::Id).eq(content_id))
        .and_where(Expr::col(ContentItems::ClaimedAt).eq(lease))
        .to_string(SqliteQueryBuilder)
}

/// A leased `generated` content row.
///
/// Finish with [`ContentClaim::mark_posted`] or [`ContentClaim::release`].
/// Dropping an unfinished claim releases the lease in the background; if
/// that cannot run, the lease simply expires.
pub struct ContentClaim {
    pool: SqlitePool,
    content: Content,
    tool_slug: String,
    tool_name: String,
    lease: i64,
    finished: bool,
}

impl ContentClaim {
    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn tool_slug(&self) -> &str {
        &self.tool_slug
    }

    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    /// Transition the row to `posted` and drop the lease.
    ///
    /// Fails with `InvalidState` if the lease expired and another poster
    /// took the row over.
    pub async fn mark_posted(mut self, posted_url: Option<&str>) -> Result<Content> {
        let next = ContentStatus::Posted;
        if !self.content.status.can_advance_to(next) {
            return Err(FunnelError::InvalidState(format!(
                "content {} cannot go from {} to {next}",
                self.content.id, self.content.status
            )));
        }
        let (posted_at, posted_at_str) = now_rfc3339();

        let query = Query::update()
            .table(ContentItems::Table)
            .values([
                (ContentItems::Status, next.as_str().into()),
                (ContentItems::PostedAt, posted_at_str.into()),
                (ContentItems::PostedUrl, posted_url.map(str::to_string).into()),
                (ContentItems::ClaimedAt, Option::<i64>::None.into()),
            ])
            .and_where(Expr::col(ContentItems::Id).eq(self.content.id))
            .and_where(Expr::col(ContentItems::Status).eq(self.content.status.as_str()))
            .and_where(Expr::col(ContentItems::ClaimedAt).eq(self.lease))
            .to_string(SqliteQueryBuilder);

        let updated = sqlx::query(&query).execute(&self.pool).await?.rows_affected();
        self.finished = true;
        if updated != 1 {
            return Err(FunnelError::InvalidState(format!(
                "claim on content {} was lost before it was posted",
                self.content.id
            )));
        }

        let mut content = self.content.clone();
        content.status = next;
        content.posted_at = Some(posted_at);
        content.posted_url = posted_url.map(str::to_string);
        Ok(content)
    }

    /// Give the row back untouched.
    pub async fn release(mut self) -> Result<()> {
        self.finished = true;
        sqlx::query(&release_query(self.content.id, self.lease))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

impl Drop for ContentClaim {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        warn!(
            content_id = self.content.id,
            "Content claim dropped unfinished; releasing"
        );
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let pool = self.pool.clone();
            let content_id = self.content.id;
            let query = release_query(content_id, self.lease);
            handle.spawn(async move {
                if let Err(e) = sqlx::query(&query).execute(&pool).await {
                    warn!(content_id, error = %e, "Failed to release dropped claim");
                }
            });
        }
    }
}
