//! Database schema definitions using sea-query.
//!
//! These define the table and column identifiers for type-safe query building.

use sea_query::Iden;

/// Tools table schema.
#[derive(Iden, Clone, Copy)]
pub enum Tools {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "slug"]
    Slug,
    #[iden = "name"]
    Name,
    #[iden = "niche"]
    Niche,
    #[iden = "version"]
    Version,
    #[iden = "build_path"]
    BuildPath,
    #[iden = "landing_url"]
    LandingUrl,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "status"]
    Status,
}

/// Products table schema.
#[derive(Iden, Clone, Copy)]
pub enum Products {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "tool_id"]
    ToolId,
    #[iden = "platform"]
    Platform,
    #[iden = "product_id"]
    ProductId,
    #[iden = "url"]
    Url,
    #[iden = "price"]
    Price,
    #[iden = "created_at"]
    CreatedAt,
}

/// Content table schema.
#[derive(Iden, Clone, Copy)]
pub enum ContentItems {
    #[iden = "content"]
    Table,
    #[iden = "id"]
    Id,
    #[iden = "tool_id"]
    ToolId,
    #[iden = "platform"]
    Platform,
    #[iden = "video_path"]
    VideoPath,
    #[iden = "caption"]
    Caption,
    #[iden = "hashtags"]
    Hashtags,
    #[iden = "scheduled_at"]
    ScheduledAt,
    #[iden = "posted_at"]
    PostedAt,
    #[iden = "posted_url"]
    PostedUrl,
    #[iden = "status"]
    Status,
    #[iden = "claimed_at"]
    ClaimedAt,
}

/// Metrics table schema.
#[derive(Iden, Clone, Copy)]
pub enum Metrics {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "tool_id"]
    ToolId,
    #[iden = "date"]
    Date,
    #[iden = "clicks"]
    Clicks,
    #[iden = "sales"]
    Sales,
    #[iden = "revenue"]
    Revenue,
    #[iden = "platform_views_json"]
    PlatformViews,
}

/// SQL for creating the tools table.
pub const CREATE_TOOLS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS tools (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    slug TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    niche TEXT NOT NULL DEFAULT 'general',
    version INTEGER NOT NULL DEFAULT 1,
    build_path TEXT,
    landing_url TEXT,
    created_at TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'draft' CHECK (status IN ('draft', 'built'))
);
"#;

/// SQL for creating the products table.
pub const CREATE_PRODUCTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    tool_id INTEGER NOT NULL REFERENCES tools(id) ON DELETE RESTRICT,
    platform TEXT NOT NULL,
    product_id TEXT NOT NULL,
    url TEXT NOT NULL,
    price REAL NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE (platform, product_id)
);

CREATE INDEX IF NOT EXISTS idx_products_tool ON products(tool_id);
"#;

/// SQL for creating the content table.
pub const CREATE_CONTENT_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS content (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    tool_id INTEGER NOT NULL REFERENCES tools(id) ON DELETE RESTRICT,
    platform TEXT NOT NULL,
    video_path TEXT,
    caption TEXT NOT NULL,
    hashtags TEXT NOT NULL,
    scheduled_at TEXT,
    posted_at TEXT,
    posted_url TEXT,
    status TEXT NOT NULL DEFAULT 'pending'
        CHECK (status IN ('pending', 'generated', 'posted')),
    claimed_at INTEGER,
    CHECK ((status = 'posted') = (posted_at IS NOT NULL)),
    CHECK (status = 'generated' OR claimed_at IS NULL)
);

CREATE INDEX IF NOT EXISTS idx_content_platform_status ON content(platform, status, id);
"#;

/// SQL for creating the metrics table.
pub const CREATE_METRICS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS metrics (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    tool_id INTEGER NOT NULL REFERENCES tools(id) ON DELETE RESTRICT,
    date TEXT NOT NULL,
    clicks INTEGER NOT NULL DEFAULT 0,
    sales INTEGER NOT NULL DEFAULT 0,
    revenue REAL NOT NULL DEFAULT 0,
    platform_views_json TEXT NOT NULL DEFAULT '{}',
    UNIQUE (tool_id, date)
);
"#;

/// Schema statements in dependency order.
pub const SCHEMA: [&str; 4] = [
    CREATE_TOOLS_TABLE,
    CREATE_PRODUCTS_TABLE,
    CREATE_CONTENT_TABLE,
    CREATE_METRICS_TABLE,
];
