//! Publisher: list a built tool on a commerce platform.
//!
//! The remote listing is created first; the product row is written only
//! once the platform has confirmed it. The insert is idempotent on the
//! platform's product id, so re-recording a confirmed listing is safe.

use tracing::{info, warn};

use crate::adapters::{CommerceRegistry, ListingRequest};
use crate::model::{NewProduct, Product, Tool, ToolStatus};
use crate::storage::SqliteStore;
use crate::{FunnelError, Result};

pub struct Publisher {
    store: SqliteStore,
    commerce: CommerceRegistry,
}

impl Publisher {
    pub fn new(store: SqliteStore, commerce: CommerceRegistry) -> Self {
        Self { store, commerce }
    }

    /// Publish `tool_slug` to `platform` at `price`.
    ///
    /// Returns `None` when the platform has no commerce adapter; such
    /// platforms are accepted but nothing is listed.
    pub async fn publish(
        &self,
        tool_slug: &str,
        platform: &str,
        price: f64,
    ) -> Result<Option<Product>> {
        if !price.is_finite() || price <= 0.0 {
            return Err(FunnelError::InvalidInput(format!(
                "price must be a positive amount, got {price}"
            )));
        }

        let tool = self.store.get_tool(tool_slug).await?;
        if tool.status != ToolStatus::Built {
            return Err(FunnelError::InvalidInput(format!(
                "tool '{tool_slug}' is {} and cannot be published",
                tool.status
            )));
        }

        let Some(adapter) = self.commerce.get(platform) else {
            warn!(
                %platform,
                available = ?self.commerce.platforms(),
                "No commerce adapter for platform; nothing published"
            );
            return Ok(None);
        };

        let listing = adapter.create_listing(&listing_request(&tool, price)).await?;
        let product = self
            .store
            .insert_product(&NewProduct {
                tool_id: tool.id,
                platform: platform.to_string(),
                product_id: listing.external_id,
                url: listing.checkout_url,
                price,
            })
            .await?;

        info!(
            slug = %tool.slug,
            platform = adapter.name(),
            product_id = %product.product_id,
            url = %product.url,
            "Product published"
        );
        Ok(Some(product))
    }
}

fn listing_request(tool: &Tool, price: f64) -> ListingRequest {
    ListingRequest {
        name: tool.name.clone(),
        price,
        description: format!("A simple {} tool for {}", tool.slug, tool.niche),
        slug: tool.slug.clone(),
    }
}
