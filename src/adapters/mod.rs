//! External collaborator boundaries.
//!
//! Each outward concern (commerce listing, media rendering, social upload)
//! is an async trait with one production implementation per platform.
//! Services only see the traits, so tests swap in in-process fakes.
//!
//! Adapters make exactly one attempt per call. A non-2xx response surfaces
//! as [`FunnelError::ExternalService`] carrying the remote status and body;
//! the caller decides whether and when to try again.

pub mod commerce;
pub mod media;
pub mod social;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Response};
use tracing::error;

use crate::config::HttpConfig;
use crate::{FunnelError, Result};

pub use commerce::{CommerceAdapter, CommerceRegistry, Listing, ListingRequest};
pub use media::{MediaRenderer, RenderJob, RenderedMedia};
pub use social::{SocialRegistry, SocialUploader, UploadRequest};

const USER_AGENT: &str = concat!("funnel/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by every adapter.
pub fn http_client(config: &HttpConfig) -> Result<Client> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?)
}

/// Pass a successful response through; turn anything else into
/// `ExternalService` with the remote body attached.
pub(crate) async fn ensure_success(service: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    error!(service, status = %status, body = %body, "Remote call failed");
    Err(FunnelError::ExternalService {
        service: service.to_string(),
        status: status.as_u16(),
        body,
    })
}

/// Return the credential or a `Configuration` error naming the variable.
pub(crate) fn require<'a>(value: &'a Option<String>, env_var: &str) -> Result<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| FunnelError::Configuration(format!("{env_var} is not set")))
}

/// Adapters keyed by platform name.
pub struct Registry<A: ?Sized> {
    adapters: HashMap<String, Arc<A>>,
}

impl<A: ?Sized> Registry<A> {
    pub fn new() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    /// Register (or replace) the adapter for a platform.
    pub fn with(mut self, platform: impl Into<String>, adapter: Arc<A>) -> Self {
        self.adapters.insert(platform.into(), adapter);
        self
    }

    pub fn get(&self, platform: &str) -> Option<Arc<A>> {
        self.adapters.get(platform).cloned()
    }

    pub fn contains(&self, platform: &str) -> bool {
        self.adapters.contains_key(platform)
    }

    /// Registered platform names, sorted.
    pub fn platforms(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.adapters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<A: ?Sized> Default for Registry<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_rejects_missing_and_empty() {
        assert_eq!(require(&Some("k".into()), "API_KEY").unwrap(), "k");

        let err = require(&None, "API_KEY").unwrap_err();
        assert!(matches!(err, FunnelError::Configuration(ref m) if m.contains("API_KEY")));
        assert!(require(&Some(String::new()), "API_KEY").is_err());
    }

    #[test]
    fn test_registry_lookup() {
        let registry: Registry<str> = Registry::new()
            .with("youtube", Arc::from("yt"))
            .with("pinterest", Arc::from("pin"));

        assert_eq!(registry.get("youtube").as_deref(), Some("yt"));
        assert!(registry.get("tiktok").is_none());
        assert!(registry.contains("pinterest"));
        assert_eq!(registry.platforms(), vec!["pinterest", "youtube"]);
    }
}
