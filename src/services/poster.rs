//! Content Poster: publish the oldest generated item for a platform.
//!
//! The row is leased before the upload and only marked `posted` once the
//! platform has accepted it. No database lock is held during the upload; a
//! concurrent poster for the same platform skips the leased row, so each row
//! is posted at most once. A failed upload releases the lease and the row
//! stays `generated` for the next call; there is no automatic retry.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::adapters::{SocialRegistry, UploadRequest};
use crate::model::Content;
use crate::storage::{ContentClaim, SqliteStore};
use crate::{FunnelError, Result};

pub struct ContentPoster {
    store: SqliteStore,
    social: SocialRegistry,
}

impl ContentPoster {
    pub fn new(store: SqliteStore, social: SocialRegistry) -> Self {
        Self { store, social }
    }

    /// Post the oldest `generated` item for `platform`.
    ///
    /// Returns `None` when nothing is pending. Fails with
    /// `UnsupportedPlatform` for a platform without a social adapter,
    /// leaving its rows untouched.
    pub async fn post_next(&self, platform: &str) -> Result<Option<Content>> {
        let Some(uploader) = self.social.get(platform) else {
            return Err(FunnelError::UnsupportedPlatform(platform.to_string()));
        };

        let Some(claim) = self.store.claim_oldest_generated(platform).await? else {
            return Ok(None);
        };

        let request = match upload_request(&claim) {
            Ok(request) => request,
            Err(e) => {
                release(claim).await;
                return Err(e);
            }
        };

        let url = match uploader.upload(&request).await {
            Ok(url) => url,
            Err(e) => {
                warn!(
                    content_id = claim.content().id,
                    platform = uploader.name(),
                    error = %e,
                    "Upload failed; content left generated"
                );
                release(claim).await;
                return Err(e);
            }
        };

        let posted = claim.mark_posted(Some(&url)).await?;
        info!(content_id = posted.id, %platform, %url, "Content posted");
        Ok(Some(posted))
    }
}

fn upload_request(claim: &ContentClaim) -> Result<UploadRequest> {
    let content = claim.content();
    let video_path = content.video_path.as_deref().ok_or_else(|| {
        FunnelError::InvalidState(format!("content {} has no video path", content.id))
    })?;

    Ok(UploadRequest {
        video_path: PathBuf::from(video_path),
        title: format!("{} - Free Calculator", claim.tool_slug()),
        description: content.caption.clone(),
        tags: content.tags(),
    })
}

async fn release(claim: ContentClaim) {
    let id = claim.content().id;
    if let Err(e) = claim.release().await {
        warn!(content_id = id, error = %e, "Failed to release content claim");
    }
}
