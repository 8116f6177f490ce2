//! LemonSqueezy products via the JSON:API `POST /v1/products` endpoint.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::adapters::{ensure_success, require};
use crate::config::{
    LemonSqueezyConfig, LEMONSQUEEZY_API_KEY_ENV_VAR, LEMONSQUEEZY_STORE_ID_ENV_VAR,
};
use crate::{FunnelError, Result};

use super::{CommerceAdapter, Listing, ListingRequest};

const JSON_API: &str = "application/vnd.api+json";

/// LemonSqueezy commerce adapter.
pub struct LemonSqueezy {
    config: LemonSqueezyConfig,
    client: Client,
}

#[derive(Deserialize)]
struct ProductResponse {
    data: ProductData,
}

#[derive(Deserialize)]
struct ProductData {
    id: Value,
    attributes: ProductAttributes,
}

#[derive(Deserialize)]
struct ProductAttributes {
    urls: ProductUrls,
}

#[derive(Deserialize)]
struct ProductUrls {
    checkout_url: Option<String>,
}

impl LemonSqueezy {
    pub const PLATFORM: &'static str = "lemonsqueezy";

    pub fn new(config: LemonSqueezyConfig, client: Client) -> Self {
        Self { config, client }
    }

    fn payload(request: &ListingRequest, store_id: &str) -> Value {
        json!({
            "data": {
                "type": "products",
                "attributes": {
                    "name": request.name,
                    "price": (request.price * 100.0).round() as i64,
                    "price_formatted": format!("${:.2}", request.price),
                    "description": request.description,
                    "slug": request.slug,
                    "status": "published",
                },
                "relationships": {
                    "store": {
                        "data": { "type": "stores", "id": store_id }
                    }
                }
            }
        })
    }
}

#[async_trait]
impl CommerceAdapter for LemonSqueezy {
    async fn create_listing(&self, request: &ListingRequest) -> Result<Listing> {
        let api_key = require(&self.config.api_key, LEMONSQUEEZY_API_KEY_ENV_VAR)?;
        let store_id = require(&self.config.store_id, LEMONSQUEEZY_STORE_ID_ENV_VAR)?;
        let url = format!("{}/v1/products", self.config.api_base.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .header(CONTENT_TYPE, JSON_API)
            .header(ACCEPT, JSON_API)
            .body(Self::payload(request, store_id).to_string())
            .send()
            .await?;
        let response = ensure_success(Self::PLATFORM, response).await?;

        let body: ProductResponse = serde_json::from_str(&response.text().await?)?;
        // JSON:API ids are strings, but be lenient about numeric ones.
        let external_id = match body.data.id {
            Value::String(id) => id,
            other => other.to_string(),
        };
        let checkout_url = body.data.attributes.urls.checkout_url.ok_or_else(|| {
            FunnelError::ExternalService {
                service: Self::PLATFORM.to_string(),
                status: 200,
                body: format!("product {external_id} has no checkout_url"),
            }
        })?;

        info!(slug = %request.slug, product_id = %external_id, "LemonSqueezy product created");
        Ok(Listing {
            external_id,
            checkout_url,
        })
    }

    fn name(&self) -> &str {
        Self::PLATFORM
    }
}
