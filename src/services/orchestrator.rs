//! Daily Orchestrator: analytics, winner selection, then content for the
//! winner.
//!
//! Steps always run in that order. A failing step is logged and recorded in
//! the report; the remaining steps still run.

use std::fmt;

use tracing::{error, info};

use crate::config::DailyConfig;
use crate::model::ToolRevenue;
use crate::storage::SqliteStore;

use super::analytics::{AnalyticsAggregator, AnalyticsSnapshot};
use super::generator::ContentGenerator;

/// A step of the daily run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyStep {
    Analytics,
    Winner,
    Generation,
}

impl fmt::Display for DailyStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Analytics => "analytics",
            Self::Winner => "winner selection",
            Self::Generation => "content generation",
        })
    }
}

/// A step that failed, with its cause rendered for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub step: DailyStep,
    pub error: String,
}

/// What the generation step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Generated {
        slug: String,
        items: usize,
        /// False when no winner existed and the first tool was used.
        for_winner: bool,
    },
    /// The store holds no tools.
    NoTools,
    Failed {
        slug: Option<String>,
    },
}

/// Result of one daily run.
#[derive(Debug, Clone)]
pub struct DailyReport {
    pub snapshot: Option<AnalyticsSnapshot>,
    pub winner: Option<ToolRevenue>,
    pub generation: GenerationOutcome,
    pub failures: Vec<StepFailure>,
}

impl DailyReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for DailyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📊 Checking analytics...")?;
        match &self.snapshot {
            Some(snapshot) => writeln!(f, "{snapshot}")?,
            None => writeln!(f, "   Analytics unavailable")?,
        }

        writeln!(f, "\n🏆 Identifying winners...")?;
        match &self.winner {
            Some(winner) => writeln!(f, "   Winner: {} (${:.2})", winner.slug, winner.revenue)?,
            None => writeln!(f, "   No winner yet (no sales data)")?,
        }

        writeln!(f, "\n🎬 Generating content...")?;
        match &self.generation {
            GenerationOutcome::Generated {
                slug,
                items,
                for_winner,
            } => {
                let reason = if *for_winner { "winner" } else { "first tool" };
                writeln!(f, "   Generated {items} item(s) for {slug} ({reason})")?;
            }
            GenerationOutcome::NoTools => writeln!(f, "   No tools to promote yet")?,
            GenerationOutcome::Failed { slug: Some(slug) } => {
                writeln!(f, "   Generation failed for {slug}")?
            }
            GenerationOutcome::Failed { slug: None } => writeln!(f, "   Generation failed")?,
        }

        for failure in &self.failures {
            writeln!(f, "⚠️  {} failed: {}", failure.step, failure.error)?;
        }
        Ok(())
    }
}

pub struct DailyOrchestrator {
    store: SqliteStore,
    analytics: AnalyticsAggregator,
    generator: ContentGenerator,
    daily: DailyConfig,
}

impl DailyOrchestrator {
    pub fn new(
        store: SqliteStore,
        analytics: AnalyticsAggregator,
        generator: ContentGenerator,
        daily: DailyConfig,
    ) -> Self {
        Self {
            store,
            analytics,
            generator,
            daily,
        }
    }

    /// Run the daily sequence. Never fails; step errors land in the report.
    pub async fn run_daily(&self) -> DailyReport {
        let mut failures = Vec::new();
        let mut record = |step: DailyStep, e: crate::FunnelError| {
            error!(%step, error = %e, "Daily step failed");
            failures.push(StepFailure {
                step,
                error: e.to_string(),
            });
        };

        let snapshot = match self.analytics.snapshot().await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                record(DailyStep::Analytics, e);
                None
            }
        };

        let winner = match self.analytics.winner().await {
            Ok(winner) => winner,
            Err(e) => {
                record(DailyStep::Winner, e);
                None
            }
        };
        match &winner {
            Some(w) => info!(slug = %w.slug, revenue = w.revenue, "Winner selected"),
            None => info!("No winner yet"),
        }

        let target = match &winner {
            Some(w) => Ok(Some((w.slug.clone(), true))),
            None => self
                .store
                .first_tool()
                .await
                .map(|tool| tool.map(|t| (t.slug, false))),
        };

        let generation = match target {
            Ok(None) => GenerationOutcome::NoTools,
            Ok(Some((slug, for_winner))) => {
                match self
                    .generator
                    .generate(&slug, self.daily.platforms.as_slice(), self.daily.count)
                    .await
                {
                    Ok(items) => GenerationOutcome::Generated {
                        slug,
                        items: items.len(),
                        for_winner,
                    },
                    Err(e) => {
                        record(DailyStep::Generation, e);
                        GenerationOutcome::Failed { slug: Some(slug) }
                    }
                }
            }
            Err(e) => {
                record(DailyStep::Generation, e);
                GenerationOutcome::Failed { slug: None }
            }
        };

        info!(failures = failures.len(), "Daily run complete");
        DailyReport {
            snapshot,
            winner,
            generation,
            failures,
        }
    }
}
