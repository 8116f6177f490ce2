//! Pinterest API v5 pins.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::adapters::{ensure_success, require};
use crate::config::{PinterestConfig, PINTEREST_ACCESS_TOKEN_ENV_VAR, PINTEREST_BOARD_ID_ENV_VAR};
use crate::Result;

use super::{SocialUploader, UploadRequest};

/// Pinterest uploader.
pub struct Pinterest {
    config: PinterestConfig,
    client: Client,
}

#[derive(Deserialize)]
struct Pin {
    id: String,
    url: Option<String>,
}

impl Pinterest {
    pub const PLATFORM: &'static str = "pinterest";

    pub fn new(config: PinterestConfig, client: Client) -> Self {
        Self { config, client }
    }

    fn pin_url(pin: Pin) -> String {
        pin.url
            .unwrap_or_else(|| format!("https://www.pinterest.com/pin/{}/", pin.id))
    }
}

#[async_trait]
impl SocialUploader for Pinterest {
    async fn upload(&self, request: &UploadRequest) -> Result<String> {
        let token = require(&self.config.access_token, PINTEREST_ACCESS_TOKEN_ENV_VAR)?;
        let board_id = require(&self.config.board_id, PINTEREST_BOARD_ID_ENV_VAR)?;
        let url = format!("{}/v5/pins", self.config.api_base.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&json!({
                "title": request.title,
                "description": request.description,
                "link": self.config.link,
                "board_id": board_id,
            }))
            .send()
            .await?;
        let response = ensure_success(Self::PLATFORM, response).await?;

        let pin_url = Self::pin_url(response.json().await?);
        info!(url = %pin_url, "Pin created");
        Ok(pin_url)
    }

    fn name(&self) -> &str {
        Self::PLATFORM
    }
}
