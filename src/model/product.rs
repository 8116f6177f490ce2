use chrono::{DateTime, Utc};

/// An external marketplace listing for a tool. Immutable once recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
    pub tool_id: i64,
    pub platform: String,
    /// Identifier assigned by the commerce platform.
    pub product_id: String,
    /// Checkout link.
    pub url: String,
    pub price: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub tool_id: i64,
    pub platform: String,
    pub product_id: String,
    pub url: String,
    pub price: f64,
}
