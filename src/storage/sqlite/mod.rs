//! SQLite implementation of the funnel store.

mod analytics;
mod content;
mod metrics;
mod products;
mod tools;

use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};

use crate::config::StorageConfig;
use crate::{FunnelError, Result};

use super::schema::SCHEMA;

pub use content::ContentClaim;

const MAX_CONNECTIONS: u32 = 4;

/// SQLite-backed funnel store.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    claim_lease: Duration,
}

impl SqliteStore {
    /// Wrap an existing pool. The schema is not touched.
    pub fn new(pool: SqlitePool) -> Self {
        let claim_lease = Duration::from_secs(StorageConfig::default().claim_lease_secs);
        Self { pool, claim_lease }
    }

    /// Override how long a posting claim holds its row.
    pub fn with_claim_lease(mut self, claim_lease: Duration) -> Self {
        self.claim_lease = claim_lease;
        self
    }

    /// Create the database file (and its folder) if needed and apply the
    /// schema. Safe to call any number of times.
    pub async fn init(config: &StorageConfig) -> Result<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let store = Self::connect(config, true).await?;
        store.init_schema().await?;
        info!(path = %config.path.display(), "Store initialized");
        Ok(store)
    }

    /// Open an initialized database.
    pub async fn open(config: &StorageConfig) -> Result<Self> {
        if !config.path.exists() {
            return Err(FunnelError::Configuration(format!(
                "store not initialized at {}; run `funnel init` first",
                config.path.display()
            )));
        }
        Self::connect(config, false).await
    }

    async fn connect(config: &StorageConfig, create: bool) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(create)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(config.busy_timeout_secs));

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await?;

        debug!(path = %config.path.display(), "Connected to store");
        Ok(Self::new(pool).with_claim_lease(Duration::from_secs(config.claim_lease_secs)))
    }

    /// Initialize the database schema.
    pub async fn init_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Start a deferred transaction.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin().await?)
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
