//! Content Generator: promotional items for a tool, one per platform per
//! requested count.
//!
//! Every clip is rendered before any row is written, and all rows of one
//! call go in a single transaction: a render failure leaves the store
//! untouched. Repeated calls create repeated rows.

use std::sync::Arc;

use tracing::{debug, info};

use crate::adapters::{MediaRenderer, RenderJob};
use crate::config::PathsConfig;
use crate::model::{Content, NewContent, Tool};
use crate::storage::SqliteStore;
use crate::{FunnelError, Result};

/// Largest `count` a single call accepts.
pub const MAX_COUNT: u32 = 100;

/// Caption shared by every item generated for a tool.
pub fn caption(tool: &Tool) -> String {
    format!(
        "🔥 Free {} - Link in bio!\n\n\
         Calculate your profits instantly with this free tool.\n\
         #free #calculator #profit #business #{}",
        tool.name, tool.slug
    )
}

/// Hashtags derived from the slug.
pub fn hashtags(slug: &str) -> String {
    format!(
        "#{} #profit #calculator #free #tool",
        slug.replace('-', "")
    )
}

/// Trim, drop empties and de-duplicate while keeping first-seen order.
pub fn normalize_platforms<S: AsRef<str>>(platforms: &[S]) -> Vec<String> {
    let mut seen = Vec::new();
    for platform in platforms {
        let platform = platform.as_ref().trim();
        if !platform.is_empty() && !seen.iter().any(|p: &String| p == platform) {
            seen.push(platform.to_string());
        }
    }
    seen
}

#[derive(Clone)]
pub struct ContentGenerator {
    store: SqliteStore,
    paths: PathsConfig,
    renderer: Arc<dyn MediaRenderer>,
}

impl ContentGenerator {
    pub fn new(store: SqliteStore, paths: PathsConfig, renderer: Arc<dyn MediaRenderer>) -> Self {
        Self {
            store,
            paths,
            renderer,
        }
    }

    /// Generate `count` items for each platform in `platforms`.
    ///
    /// Rows are created in `generated` status, ordered by round and then by
    /// platform as given.
    pub async fn generate<S: AsRef<str>>(
        &self,
        tool_slug: &str,
        platforms: &[S],
        count: u32,
    ) -> Result<Vec<Content>> {
        let platforms = normalize_platforms(platforms);
        if platforms.is_empty() {
            return Err(FunnelError::InvalidInput(
                "at least one platform is required".into(),
            ));
        }
        if count == 0 || count > MAX_COUNT {
            return Err(FunnelError::InvalidInput(format!(
                "count must be between 1 and {MAX_COUNT}, got {count}"
            )));
        }

        let tool = self.store.get_tool(tool_slug).await?;
        let caption = caption(&tool);
        let hashtags = hashtags(&tool.slug);

        let mut items = Vec::new();
        for round in 1..=count {
            for platform in &platforms {
                let job = self.render_job(&tool, platform, round);
                let media = self.renderer.render(&job).await?;
                debug!(slug = %tool.slug, %platform, round, video = %media.video_path.display(), "Media ready");

                items.push(NewContent {
                    tool_id: tool.id,
                    platform: platform.clone(),
                    video_path: media.video_path.to_string_lossy().into_owned(),
                    caption: caption.clone(),
                    hashtags: hashtags.clone(),
                });
            }
        }

        let mut tx = self.store.begin().await?;
        let mut created = Vec::with_capacity(items.len());
        for item in &items {
            created.push(SqliteStore::insert_content(&mut *tx, item).await?);
        }
        tx.commit().await?;

        info!(
            slug = %tool.slug,
            platforms = ?platforms,
            count,
            created = created.len(),
            "Content generated"
        );
        Ok(created)
    }

    fn render_job(&self, tool: &Tool, platform: &str, round: u32) -> RenderJob {
        let stem = format!("{}_{}_{}", tool.slug, platform, round);
        RenderJob {
            tool_name: tool.name.clone(),
            niche: tool.niche.clone(),
            video_path: self.paths.renders_dir.join(format!("{stem}.mp4")),
            thumbnail_path: self.paths.thumbnails_dir.join(format!("{stem}.jpg")),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::model::ToolStatus;

    fn tool() -> Tool {
        Tool {
            id: 7,
            slug: "roi-calc".into(),
            name: "Roi Calc".into(),
            niche: "freelance".into(),
            version: 1,
            build_path: None,
            landing_url: None,
            created_at: Utc::now(),
            status: ToolStatus::Built,
        }
    }

    #[test]
    fn test_caption_mentions_name_and_slug() {
        let text = caption(&tool());
        assert!(text.starts_with("🔥 Free Roi Calc - Link in bio!\n\n"));
        assert!(text.contains("Calculate your profits instantly with this free tool.\n"));
        assert!(text.ends_with("#business #roi-calc"));
    }

    #[test]
    fn test_hashtags_strip_dashes() {
        assert_eq!(
            hashtags("roi-calc"),
            "#roicalc #profit #calculator #free #tool"
        );
    }

    #[test]
    fn test_normalize_platforms() {
        assert_eq!(
            normalize_platforms(&["youtube", " pinterest ", "", "youtube"]),
            vec!["youtube", "pinterest"]
        );
        assert!(normalize_platforms::<&str>(&[]).is_empty());
    }
}
