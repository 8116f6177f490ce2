//! Commerce, social, media and daily-run configuration.
//!
//! ```yaml
//! commerce:
//!   default_platform: lemonsqueezy
//!   default_price: 29
//!   lemonsqueezy:
//!     store_id: "12345"
//! social:
//!   pinterest:
//!     board_id: "987654"
//!     link: https://example.com/roi-calc
//! media:
//!   renderer: ffmpeg
//! daily:
//!   platforms: [youtube, pinterest]
//!   count: 1
//! ```
//!
//! Secrets are normally supplied through `LEMONSQUEEZY_API_KEY`,
//! `YOUTUBE_ACCESS_TOKEN`, `PINTEREST_ACCESS_TOKEN` and friends.

use serde::Deserialize;

// ============================================================================
// Commerce
// ============================================================================

/// Commerce platform configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CommerceConfig {
    /// Platform used when `publish_product` is given none.
    pub default_platform: String,
    /// Price used when `publish_product` is given none.
    pub default_price: f64,
    pub lemonsqueezy: LemonSqueezyConfig,
}

impl Default for CommerceConfig {
    fn default() -> Self {
        Self {
            default_platform: "lemonsqueezy".to_string(),
            default_price: 29.0,
            lemonsqueezy: LemonSqueezyConfig::default(),
        }
    }
}

/// LemonSqueezy credentials and endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LemonSqueezyConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub store_id: Option<String>,
}

impl Default for LemonSqueezyConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.lemonsqueezy.com".to_string(),
            api_key: None,
            store_id: None,
        }
    }
}

// ============================================================================
// Social
// ============================================================================

/// Social platform configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SocialConfig {
    pub youtube: YoutubeConfig,
    pub pinterest: PinterestConfig,
}

/// YouTube Data API v3 settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct YoutubeConfig {
    /// Base for the resumable upload endpoint.
    pub upload_base: String,
    /// OAuth access token with the `youtube.upload` scope. Acquiring it is
    /// outside the funnel.
    pub access_token: Option<String>,
    /// Video category. Default: "22" (People & Blogs).
    pub category_id: String,
    pub privacy_status: String,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            upload_base: "https://www.googleapis.com".to_string(),
            access_token: None,
            category_id: "22".to_string(),
            privacy_status: "public".to_string(),
        }
    }
}

/// Pinterest API v5 settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PinterestConfig {
    pub api_base: String,
    pub access_token: Option<String>,
    pub board_id: Option<String>,
    /// Destination link attached to every pin.
    pub link: Option<String>,
}

impl Default for PinterestConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.pinterest.com".to_string(),
            access_token: None,
            board_id: None,
            link: None,
        }
    }
}

// ============================================================================
// Media
// ============================================================================

/// Which media renderer the content generator uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// Record the expected output paths without rendering.
    #[default]
    None,
    /// Render placeholder clips with the `ffmpeg` binary.
    Ffmpeg,
}

/// Media rendering configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub renderer: RendererKind,
    /// ffmpeg executable. Default: "ffmpeg" (resolved on PATH).
    pub ffmpeg_path: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            renderer: RendererKind::None,
            ffmpeg_path: "ffmpeg".to_string(),
        }
    }
}

// ============================================================================
// Daily run / HTTP
// ============================================================================

/// Daily run configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DailyConfig {
    /// Platforms content is generated for.
    pub platforms: Vec<String>,
    /// Items per platform.
    pub count: u32,
}

impl Default for DailyConfig {
    fn default() -> Self {
        Self {
            platforms: vec!["youtube".to_string()],
            count: 1,
        }
    }
}

/// Outbound HTTP settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds. Default: 30.
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}
