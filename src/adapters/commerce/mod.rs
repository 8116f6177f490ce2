//! Commerce platforms that turn a tool into a paid listing.

mod lemonsqueezy;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::CommerceConfig;
use crate::Result;

pub use lemonsqueezy::LemonSqueezy;

/// What to list.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRequest {
    pub name: String,
    pub price: f64,
    pub description: String,
    pub slug: String,
}

/// A confirmed remote listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    /// Identifier assigned by the platform.
    pub external_id: String,
    pub checkout_url: String,
}

/// Creates product listings on one commerce platform.
#[async_trait]
pub trait CommerceAdapter: Send + Sync {
    /// Create one listing. Not retried; a repeated call creates a second
    /// remote listing.
    async fn create_listing(&self, request: &ListingRequest) -> Result<Listing>;

    /// Platform name for logging.
    fn name(&self) -> &str;
}

pub type CommerceRegistry = super::Registry<dyn CommerceAdapter>;

/// Register every commerce platform the funnel knows.
///
/// Adapters are registered even without credentials; the missing value is
/// reported when a listing is attempted.
pub fn registry(config: &CommerceConfig, client: Client) -> CommerceRegistry {
    CommerceRegistry::new().with(
        LemonSqueezy::PLATFORM,
        Arc::new(LemonSqueezy::new(config.lemonsqueezy.clone(), client)),
    )
}
