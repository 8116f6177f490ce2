//! Social platforms content is posted to.
//!
//! The set is closed: only platforms registered here can be posted to, and
//! any other name is rejected by the poster.

mod pinterest;
mod youtube;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::SocialConfig;
use crate::Result;

pub use pinterest::Pinterest;
pub use youtube::Youtube;

/// One item to publish.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRequest {
    pub video_path: PathBuf,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
}

/// Publishes media to one social platform.
#[async_trait]
pub trait SocialUploader: Send + Sync {
    /// Upload and return the public URL of the post.
    async fn upload(&self, request: &UploadRequest) -> Result<String>;

    fn name(&self) -> &str;
}

pub type SocialRegistry = super::Registry<dyn SocialUploader>;

/// Register every social platform the funnel knows.
pub fn registry(config: &SocialConfig, client: Client) -> SocialRegistry {
    SocialRegistry::new()
        .with(
            Youtube::PLATFORM,
            Arc::new(Youtube::new(config.youtube.clone(), client.clone())),
        )
        .with(
            Pinterest::PLATFORM,
            Arc::new(Pinterest::new(config.pinterest.clone(), client)),
        )
}
