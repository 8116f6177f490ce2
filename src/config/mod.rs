//! Application configuration.
//!
//! Aggregates configuration from all modules into a single Config struct
//! that can be loaded from YAML files or environment variables. Loaded once at
//! process start; adapters receive the sections they need by reference.

mod platforms;
mod storage;

pub use platforms::{
    CommerceConfig, DailyConfig, HttpConfig, LemonSqueezyConfig, MediaConfig, PinterestConfig,
    RendererKind, SocialConfig, YoutubeConfig,
};
pub use storage::{PathsConfig, StorageConfig};

use serde::Deserialize;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "funnel.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "FUNNEL_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "FUNNEL";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "FUNNEL_LOG";

/// LemonSqueezy API key.
pub const LEMONSQUEEZY_API_KEY_ENV_VAR: &str = "LEMONSQUEEZY_API_KEY";
/// LemonSqueezy store the products are created in.
pub const LEMONSQUEEZY_STORE_ID_ENV_VAR: &str = "LEMONSQUEEZY_STORE_ID";
/// OAuth access token with the `youtube.upload` scope.
pub const YOUTUBE_ACCESS_TOKEN_ENV_VAR: &str = "YOUTUBE_ACCESS_TOKEN";
/// Pinterest API access token.
pub const PINTEREST_ACCESS_TOKEN_ENV_VAR: &str = "PINTEREST_ACCESS_TOKEN";
/// Pinterest board pins are created on.
pub const PINTEREST_BOARD_ID_ENV_VAR: &str = "PINTEREST_BOARD_ID";

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Folders for templates, built tools and rendered media.
    pub paths: PathsConfig,
    /// Commerce platform configuration.
    pub commerce: CommerceConfig,
    /// Social platform configuration.
    pub social: SocialConfig,
    /// Media rendering configuration.
    pub media: MediaConfig,
    /// Daily run configuration.
    pub daily: DailyConfig,
    /// Outbound HTTP settings shared by all adapters.
    pub http: HttpConfig,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `funnel.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix
    /// 5. Well-known credential variables (`LEMONSQUEEZY_API_KEY`, ...)
    pub fn load(path: Option<&str>) -> crate::Result<Self> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("daily.platforms")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Config = config.try_deserialize()?;
        config.apply_credentials(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Fill unset credentials from well-known variable names.
    ///
    /// Values already present in a config file or `FUNNEL__*` variable win.
    pub fn apply_credentials<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let fill = |slot: &mut Option<String>, name: &str| {
            if slot.is_none() {
                *slot = lookup(name).filter(|v| !v.trim().is_empty());
            }
        };

        let lemonsqueezy = &mut self.commerce.lemonsqueezy;
        fill(&mut lemonsqueezy.api_key, LEMONSQUEEZY_API_KEY_ENV_VAR);
        fill(&mut lemonsqueezy.store_id, LEMONSQUEEZY_STORE_ID_ENV_VAR);
        fill(
            &mut self.social.youtube.access_token,
            YOUTUBE_ACCESS_TOKEN_ENV_VAR,
        );
        fill(
            &mut self.social.pinterest.access_token,
            PINTEREST_ACCESS_TOKEN_ENV_VAR,
        );
        fill(&mut self.social.pinterest.board_id, PINTEREST_BOARD_ID_ENV_VAR);
    }

    /// Create config for testing, rooted in `base`.
    pub fn for_test(base: &std::path::Path) -> Self {
        Self {
            storage: StorageConfig {
                path: base.join("db").join("factory.db"),
                ..StorageConfig::default()
            },
            paths: PathsConfig::rooted_at(base),
            ..Self::default()
        }
    }
}
