//! SQLite store integration tests.
//!
//! Run with: cargo test --test storage_sqlite

mod common;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;

use common::Fixture;
use funnel::config::StorageConfig;
use funnel::model::{ContentStatus, NewContent, NewMetric, NewProduct, NewTool, ToolStatus};
use funnel::storage::SqliteStore;
use funnel::FunnelError;

fn new_tool(slug: &str) -> NewTool {
    NewTool {
        slug: slug.to_string(),
        name: funnel::model::display_name(slug),
        niche: "general".to_string(),
        build_path: PathBuf::from("generated_tools").join(slug),
        status: ToolStatus::Built,
    }
}

async fn insert_tool(store: &SqliteStore, slug: &str) -> funnel::model::Tool {
    let mut conn = store.pool().acquire().await.unwrap();
    SqliteStore::insert_tool(&mut conn, &new_tool(slug))
        .await
        .unwrap()
}

async fn insert_content(store: &SqliteStore, tool_id: i64, platform: &str) -> i64 {
    let mut conn = store.pool().acquire().await.unwrap();
    SqliteStore::insert_content(
        &mut conn,
        &NewContent {
            tool_id,
            platform: platform.to_string(),
            video_path: format!("renders/{platform}.mp4"),
            caption: "caption".into(),
            hashtags: "#a #b".into(),
        },
    )
    .await
    .unwrap()
    .id
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
}

#[tokio::test]
async fn test_init_is_idempotent() {
    let fx = Fixture::new().await;
    insert_tool(&fx.store, "roi-calc").await;
    fx.store.close().await;

    let again = SqliteStore::init(&fx.config.storage).await.unwrap();
    let sql = "SELECT name FROM sqlite_master \
               WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name";
    let tables: Vec<(String,)> = sqlx::query_as(sql).fetch_all(again.pool()).await.unwrap();
    let names: Vec<_> = tables.into_iter().map(|(n,)| n).collect();

    assert_eq!(names, vec!["content", "metrics", "products", "tools"]);
    assert_eq!(again.count_tools(ToolStatus::Built).await.unwrap(), 1);
}

#[tokio::test]
async fn test_open_requires_init() {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig {
        path: dir.path().join("missing.db"),
        ..StorageConfig::default()
    };

    let err = SqliteStore::open(&config).await.err().unwrap();
    assert!(matches!(err, FunnelError::Configuration(ref m) if m.contains("funnel init")));
    assert!(!config.path.exists());
}

#[tokio::test]
async fn test_duplicate_slug_is_conflict() {
    let fx = Fixture::new().await;
    insert_tool(&fx.store, "roi-calc").await;

    let mut conn = fx.store.pool().acquire().await.unwrap();
    let err = SqliteStore::insert_tool(&mut conn, &new_tool("roi-calc"))
        .await
        .unwrap_err();

    assert!(matches!(err, FunnelError::Conflict(_)));
    assert_eq!(fx.store.list_tools().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_lookup_unknown_tool() {
    let fx = Fixture::new().await;
    assert!(fx.store.find_tool("nope").await.unwrap().is_none());
    assert!(fx.store.first_tool().await.unwrap().is_none());

    let err = fx.store.get_tool("nope").await.unwrap_err();
    assert!(matches!(err, FunnelError::NotFound { kind: "tool", .. }));
}

#[tokio::test]
async fn test_content_for_unknown_tool_is_not_found() {
    let fx = Fixture::new().await;
    let mut conn = fx.store.pool().acquire().await.unwrap();

    let err = SqliteStore::insert_content(
        &mut conn,
        &NewContent {
            tool_id: 999,
            platform: "youtube".into(),
            video_path: "x.mp4".into(),
            caption: String::new(),
            hashtags: String::new(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, FunnelError::NotFound { .. }));
}

#[tokio::test]
async fn test_product_insert_is_idempotent_on_external_id() {
    let fx = Fixture::new().await;
    let tool = insert_tool(&fx.store, "roi-calc").await;
    let product = NewProduct {
        tool_id: tool.id,
        platform: "lemonsqueezy".into(),
        product_id: "123".into(),
        url: "https://shop.test/123".into(),
        price: 29.0,
    };

    let first = fx.store.insert_product(&product).await.unwrap();
    let second = fx.store.insert_product(&product).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(fx.store.count_products().await.unwrap(), 1);
    assert_eq!(fx.store.list_products(tool.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_aggregates_on_empty_store() {
    let fx = Fixture::new().await;

    assert_eq!(fx.store.total_revenue().await.unwrap(), 0.0);
    assert!(fx.store.revenue_ranking(5).await.unwrap().is_empty());
    assert_eq!(fx.store.count_tools(ToolStatus::Built).await.unwrap(), 0);
    assert_eq!(fx.store.count_products().await.unwrap(), 0);
    assert_eq!(fx.store.count_content(None).await.unwrap(), 0);
}

#[tokio::test]
async fn test_metric_unique_per_tool_and_day() {
    let fx = Fixture::new().await;
    insert_tool(&fx.store, "roi-calc").await;
    let metric = NewMetric {
        date: day(1),
        clicks: 10,
        sales: 1,
        revenue: 29.0,
        platform_views: BTreeMap::from([("youtube".to_string(), 120)]),
    };

    let stored = fx.store.append_metric("roi-calc", &metric).await.unwrap();
    assert_eq!(stored.platform_views["youtube"], 120);

    let err = fx.store.append_metric("roi-calc", &metric).await.unwrap_err();
    assert!(matches!(err, FunnelError::Conflict(ref m) if m.contains("2026-03-01")));

    let err = fx.store.append_metric("ghost", &metric).await.unwrap_err();
    assert!(matches!(err, FunnelError::NotFound { .. }));

    let metrics = fx.store.list_metrics(stored.tool_id).await.unwrap();
    assert_eq!(metrics, vec![stored]);
}

#[tokio::test]
async fn test_revenue_ranking_orders_and_breaks_ties_by_slug() {
    let fx = Fixture::new().await;
    for slug in ["beta", "alpha", "gamma", "idle"] {
        insert_tool(&fx.store, slug).await;
    }
    let revenue = |date, revenue, sales| NewMetric {
        date,
        sales,
        revenue,
        ..NewMetric::default()
    };
    fx.store.append_metric("beta", &revenue(day(1), 30.0, 1)).await.unwrap();
    fx.store.append_metric("beta", &revenue(day(2), 20.0, 1)).await.unwrap();
    fx.store.append_metric("alpha", &revenue(day(1), 50.0, 2)).await.unwrap();
    fx.store.append_metric("gamma", &revenue(day(1), 80.0, 4)).await.unwrap();

    let ranking = fx.store.revenue_ranking(5).await.unwrap();
    let order: Vec<_> = ranking.iter().map(|r| (r.slug.as_str(), r.revenue, r.sales)).collect();
    assert_eq!(
        order,
        vec![("gamma", 80.0, 4), ("alpha", 50.0, 2), ("beta", 50.0, 2)]
    );

    assert_eq!(fx.store.revenue_ranking(1).await.unwrap()[0].slug, "gamma");
    assert_eq!(fx.store.total_revenue().await.unwrap(), 180.0);
}

#[tokio::test]
async fn test_posted_at_required_for_posted_status() {
    let fx = Fixture::new().await;
    let tool = insert_tool(&fx.store, "roi-calc").await;
    let id = insert_content(&fx.store, tool.id, "youtube").await;

    let result = sqlx::query("UPDATE content SET status = 'posted' WHERE id = ?")
        .bind(id)
        .execute(fx.store.pool())
        .await;
    assert!(result.is_err());
    assert_eq!(
        fx.store.get_content(id).await.unwrap().status,
        ContentStatus::Generated
    );
}

#[tokio::test]
async fn test_claim_picks_oldest_and_marks_posted() {
    let fx = Fixture::new().await;
    let tool = insert_tool(&fx.store, "roi-calc").await;
    let first = insert_content(&fx.store, tool.id, "youtube").await;
    insert_content(&fx.store, tool.id, "pinterest").await;
    let second = insert_content(&fx.store, tool.id, "youtube").await;

    let claim = fx.store.claim_oldest_generated("youtube").await.unwrap().unwrap();
    assert_eq!(claim.content().id, first);
    assert_eq!(claim.tool_slug(), "roi-calc");
    assert_eq!(claim.tool_name(), "Roi Calc");

    let posted = claim.mark_posted(Some("https://yt.test/1")).await.unwrap();
    assert_eq!(posted.status, ContentStatus::Posted);
    assert!(posted.posted_at.is_some());

    let stored = fx.store.get_content(first).await.unwrap();
    assert_eq!(stored.status, ContentStatus::Posted);
    assert_eq!(stored.posted_url.as_deref(), Some("https://yt.test/1"));
    assert!(stored.posted_at.is_some());

    let next = fx.store.claim_oldest_generated("youtube").await.unwrap().unwrap();
    assert_eq!(next.content().id, second);
    next.release().await.unwrap();
}

#[tokio::test]
async fn test_released_or_dropped_claim_leaves_row_generated() {
    let fx = Fixture::new().await;
    let tool = insert_tool(&fx.store, "roi-calc").await;
    let id = insert_content(&fx.store, tool.id, "youtube").await;

    let claim = fx.store.claim_oldest_generated("youtube").await.unwrap().unwrap();
    claim.release().await.unwrap();

    let claim = fx.store.claim_oldest_generated("youtube").await.unwrap().unwrap();
    drop(claim);

    let content = fx.store.get_content(id).await.unwrap();
    assert_eq!(content.status, ContentStatus::Generated);
    assert!(content.posted_at.is_none());

    // The dropped claim is released in the background.
    let mut reclaimed = None;
    for _ in 0..50 {
        reclaimed = fx.store.claim_oldest_generated("youtube").await.unwrap();
        if reclaimed.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(reclaimed.unwrap().content().id, id);
}

#[tokio::test]
async fn test_claimed_row_is_skipped_without_blocking_writers() {
    let fx = Fixture::new().await;
    let tool = insert_tool(&fx.store, "roi-calc").await;
    let first = insert_content(&fx.store, tool.id, "youtube").await;
    let second = insert_content(&fx.store, tool.id, "youtube").await;

    let held = fx.store.claim_oldest_generated("youtube").await.unwrap().unwrap();
    assert_eq!(held.content().id, first);

    // Other writers proceed while the claim is outstanding.
    insert_tool(&fx.store, "flip").await;
    insert_content(&fx.store, tool.id, "pinterest").await;

    let next = fx.store.claim_oldest_generated("youtube").await.unwrap().unwrap();
    assert_eq!(next.content().id, second);
    assert!(fx
        .store
        .claim_oldest_generated("youtube")
        .await
        .unwrap()
        .is_none());

    next.release().await.unwrap();
    held.mark_posted(Some("https://yt.test/1")).await.unwrap();
    assert_eq!(
        fx.store.get_content(first).await.unwrap().status,
        ContentStatus::Posted
    );
}

#[tokio::test]
async fn test_expired_claim_is_taken_over() {
    let fx = Fixture::new().await;
    let store = fx.store.clone().with_claim_lease(Duration::ZERO);
    let tool = insert_tool(&store, "roi-calc").await;
    let id = insert_content(&store, tool.id, "youtube").await;

    let stale = store.claim_oldest_generated("youtube").await.unwrap().unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    let fresh = store.claim_oldest_generated("youtube").await.unwrap().unwrap();
    assert_eq!(fresh.content().id, id);

    let err = stale.mark_posted(Some("https://yt.test/stale")).await.unwrap_err();
    assert!(matches!(err, FunnelError::InvalidState(_)));

    let posted = fresh.mark_posted(Some("https://yt.test/fresh")).await.unwrap();
    assert_eq!(posted.posted_url.as_deref(), Some("https://yt.test/fresh"));
}

#[tokio::test]
async fn test_claim_with_nothing_pending() {
    let fx = Fixture::new().await;
    assert!(fx
        .store
        .claim_oldest_generated("youtube")
        .await
        .unwrap()
        .is_none());
}
