//! Funnel lifecycle components.
//!
//! One module per component; [`Services`] wires them to a store and the
//! adapters chosen from configuration.

pub mod analytics;
pub mod builder;
pub mod generator;
pub mod orchestrator;
pub mod poster;
pub mod publisher;

use std::sync::Arc;

use tracing::info;

use crate::adapters::{self, CommerceRegistry, MediaRenderer, SocialRegistry};
use crate::config::Config;
use crate::storage::SqliteStore;
use crate::Result;

pub use analytics::{AnalyticsAggregator, AnalyticsSnapshot, TOP_TOOLS};
pub use builder::ToolBuilder;
pub use generator::ContentGenerator;
pub use orchestrator::{DailyOrchestrator, DailyReport, DailyStep, GenerationOutcome, StepFailure};
pub use poster::ContentPoster;
pub use publisher::Publisher;

/// Create the store and output folders. Safe to repeat.
pub async fn initialize(config: &Config) -> Result<SqliteStore> {
    for dir in config.paths.output_dirs() {
        tokio::fs::create_dir_all(dir).await?;
    }
    let store = SqliteStore::init(&config.storage).await?;
    info!(
        db = %config.storage.path.display(),
        tools = %config.paths.tools_dir.display(),
        "Funnel initialized"
    );
    Ok(store)
}

/// Every component, sharing one store.
pub struct Services {
    pub store: SqliteStore,
    pub builder: ToolBuilder,
    pub publisher: Publisher,
    pub generator: ContentGenerator,
    pub poster: ContentPoster,
    pub analytics: AnalyticsAggregator,
    pub orchestrator: DailyOrchestrator,
}

impl Services {
    /// Wire components with the production adapters.
    pub fn from_config(store: SqliteStore, config: &Config) -> Result<Self> {
        let client = adapters::http_client(&config.http)?;
        Ok(Self::new(
            store,
            config,
            adapters::commerce::registry(&config.commerce, client.clone()),
            adapters::social::registry(&config.social, client),
            adapters::media::renderer(&config.media),
        ))
    }

    /// Wire components with caller-supplied adapters.
    pub fn new(
        store: SqliteStore,
        config: &Config,
        commerce: CommerceRegistry,
        social: SocialRegistry,
        renderer: Arc<dyn MediaRenderer>,
    ) -> Self {
        let generator = ContentGenerator::new(store.clone(), config.paths.clone(), renderer);
        let analytics = AnalyticsAggregator::new(store.clone());

        Self {
            builder: ToolBuilder::new(store.clone(), config.paths.clone()),
            publisher: Publisher::new(store.clone(), commerce),
            poster: ContentPoster::new(store.clone(), social),
            orchestrator: DailyOrchestrator::new(
                store.clone(),
                analytics.clone(),
                generator.clone(),
                config.daily.clone(),
            ),
            generator,
            analytics,
            store,
        }
    }
}
