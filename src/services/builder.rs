//! Tool Builder: materialize a template into a new, uniquely-slugged tool.
//!
//! The tool row is inserted first, inside an open transaction, so a taken
//! slug is rejected before anything touches disk. The template tree is then
//! copied; the transaction commits only after the files are in place, and a
//! failed copy removes the partial folder and rolls the row back.

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::config::PathsConfig;
use crate::model::{display_name, validate_slug, NewTool, Template, Tool, ToolStatus, DEFAULT_NICHE};
use crate::storage::SqliteStore;
use crate::{FunnelError, Result};

/// File written into every built tool.
pub const DESCRIPTOR_FILE: &str = "config.json";

/// Contents of [`DESCRIPTOR_FILE`].
#[derive(Debug, Serialize)]
struct ToolDescriptor<'a> {
    slug: &'a str,
    template: &'a str,
    niche: &'a str,
    version: i64,
    name: &'a str,
}

pub struct ToolBuilder {
    store: SqliteStore,
    paths: PathsConfig,
}

impl ToolBuilder {
    pub fn new(store: SqliteStore, paths: PathsConfig) -> Self {
        Self { store, paths }
    }

    /// Build `slug` from `template`.
    ///
    /// Fails with `NotFound` for an unknown template and `Conflict` if the
    /// slug is taken or its output folder already exists.
    pub async fn build(&self, slug: &str, template: &str, niche: Option<&str>) -> Result<Tool> {
        validate_slug(slug)?;
        let template: Template = template.parse()?;
        let niche = niche
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_NICHE);

        let source = self.paths.templates_dir.join(template.as_str());
        if !source.is_dir() {
            return Err(FunnelError::not_found(
                "template files",
                source.display().to_string(),
            ));
        }
        let target = self.paths.tools_dir.join(slug);
        if target.exists() {
            return Err(FunnelError::Conflict(format!(
                "output location {} already exists",
                target.display()
            )));
        }

        let mut tx = self.store.begin().await?;
        let tool = SqliteStore::insert_tool(
            &mut *tx,
            &NewTool {
                slug: slug.to_string(),
                name: display_name(slug),
                niche: niche.to_string(),
                build_path: target.clone(),
                status: ToolStatus::Built,
            },
        )
        .await?;

        let descriptor = serde_json::to_vec_pretty(&ToolDescriptor {
            slug,
            template: template.as_str(),
            niche,
            version: tool.version,
            name: &tool.name,
        })?;
        materialize(source, target.clone(), descriptor).await?;

        if let Err(e) = tx.commit().await {
            remove_partial(&target).await;
            return Err(e.into());
        }

        info!(%slug, %template, %niche, path = %target.display(), "Tool built");
        Ok(tool)
    }
}

/// Copy `source` to a fresh `target` and drop the descriptor into it.
///
/// `target` must not exist yet; if creating it races with another writer the
/// loser gets `Conflict` and leaves the folder alone.
async fn materialize(source: PathBuf, target: PathBuf, descriptor: Vec<u8>) -> Result<()> {
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    match tokio::fs::create_dir(&target).await {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Err(FunnelError::Conflict(format!(
                "output location {} already exists",
                target.display()
            )));
        }
        Err(e) => return Err(e.into()),
    }

    let dest = target.clone();
    let copied = tokio::task::spawn_blocking(move || {
        copy_tree(&source, &dest)?;
        std::fs::write(dest.join(DESCRIPTOR_FILE), descriptor)
    })
    .await
    .map_err(|e| io::Error::other(e.to_string()))
    .and_then(|r| r);

    if let Err(e) = copied {
        remove_partial(&target).await;
        return Err(e.into());
    }
    Ok(())
}

/// Recursively copy the contents of `from` into the existing folder `to`.
fn copy_tree(from: &Path, to: &Path) -> io::Result<()> {
    for entry in std::fs::read_dir(from)? {
        let entry = entry?;
        let dest = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            std::fs::create_dir(&dest)?;
            copy_tree(&entry.path(), &dest)?;
        } else {
            std::fs::copy(entry.path(), &dest)?;
        }
    }
    Ok(())
}

async fn remove_partial(target: &Path) {
    if let Err(e) = tokio::fs::remove_dir_all(target).await {
        warn!(path = %target.display(), error = %e, "Failed to remove partial tool folder");
    }
}
