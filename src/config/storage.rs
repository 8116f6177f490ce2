//! Storage and filesystem layout configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    pub path: PathBuf,
    /// How long a writer waits for the database write lock. Default: 30.
    pub busy_timeout_secs: u64,
    /// How long a posting claim keeps a content row from other posters.
    /// A claim left behind by a crashed poster frees up after this.
    /// Default: 600.
    pub claim_lease_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("db/factory.db"),
            busy_timeout_secs: 30,
            claim_lease_secs: 600,
        }
    }
}

/// Folders the funnel reads from and writes into.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// One sub-folder per template (`roi_calculator/`, ...).
    pub templates_dir: PathBuf,
    /// Built tools land in `<tools_dir>/<slug>/`.
    pub tools_dir: PathBuf,
    /// Rendered videos.
    pub renders_dir: PathBuf,
    /// Rendered thumbnails.
    pub thumbnails_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self::rooted_at(Path::new(""))
    }
}

impl PathsConfig {
    /// Default layout under `base`.
    pub fn rooted_at(base: &Path) -> Self {
        Self {
            templates_dir: base.join("tool_templates"),
            tools_dir: base.join("generated_tools"),
            renders_dir: base.join("content").join("renders"),
            thumbnails_dir: base.join("content").join("thumbnails"),
        }
    }

    /// Folders `init` creates.
    pub fn output_dirs(&self) -> [&Path; 3] {
        [&self.tools_dir, &self.renders_dir, &self.thumbnails_dir]
    }
}
