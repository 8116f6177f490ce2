//! YouTube Data API v3 resumable upload.
//!
//! Two requests: a metadata POST that opens an upload session (the session
//! URL comes back in `Location`), then a PUT of the raw file bytes.

use std::io;
use std::path::Path;

use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::adapters::{ensure_success, require};
use crate::config::{YoutubeConfig, YOUTUBE_ACCESS_TOKEN_ENV_VAR};
use crate::{FunnelError, Result};

use super::{SocialUploader, UploadRequest};

/// YouTube uploader.
pub struct Youtube {
    config: YoutubeConfig,
    client: Client,
}

#[derive(Deserialize)]
struct VideoResource {
    id: String,
}

impl Youtube {
    pub const PLATFORM: &'static str = "youtube";

    pub fn new(config: YoutubeConfig, client: Client) -> Self {
        Self { config, client }
    }

    fn metadata(&self, request: &UploadRequest) -> Value {
        json!({
            "snippet": {
                "title": request.title,
                "description": request.description,
                "tags": request.tags,
                "categoryId": self.config.category_id,
            },
            "status": {
                "privacyStatus": self.config.privacy_status,
                "selfDeclaredMadeForKids": false,
            }
        })
    }

    pub fn watch_url(video_id: &str) -> String {
        format!("https://youtube.com/watch?v={video_id}")
    }
}

/// Load the rendered clip. A missing file means nothing rendered it.
async fn read_video(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => FunnelError::Configuration(format!(
            "rendered video {} not found; set media.renderer to ffmpeg or render it before posting",
            path.display()
        )),
        _ => e.into(),
    })
}

#[async_trait]
impl SocialUploader for Youtube {
    async fn upload(&self, request: &UploadRequest) -> Result<String> {
        let token = require(&self.config.access_token, YOUTUBE_ACCESS_TOKEN_ENV_VAR)?;
        let bytes = read_video(&request.video_path).await?;

        let url = format!(
            "{}/upload/youtube/v3/videos?uploadType=resumable&part=snippet,status",
            self.config.upload_base.trim_end_matches('/')
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json; charset=UTF-8")
            .header("X-Upload-Content-Type", "video/*")
            .header("X-Upload-Content-Length", bytes.len())
            .body(self.metadata(request).to_string())
            .send()
            .await?;
        let response = ensure_success(Self::PLATFORM, response).await?;

        let session = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| FunnelError::ExternalService {
                service: Self::PLATFORM.to_string(),
                status: response.status().as_u16(),
                body: "upload session has no Location header".to_string(),
            })?;
        debug!(video = %request.video_path.display(), "YouTube upload session opened");

        let response = self
            .client
            .put(&session)
            .bearer_auth(token)
            .header(CONTENT_TYPE, "video/*")
            .header(CONTENT_LENGTH, bytes.len())
            .body(bytes)
            .send()
            .await?;
        let response = ensure_success(Self::PLATFORM, response).await?;

        let video: VideoResource = serde_json::from_str(&response.text().await?)?;
        let watch_url = Self::watch_url(&video.id);
        info!(url = %watch_url, "Uploaded to YouTube");
        Ok(watch_url)
    }

    fn name(&self) -> &str {
        Self::PLATFORM
    }
}
