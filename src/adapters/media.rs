//! Media rendering for promotional content.
//!
//! The generator decides where each clip and thumbnail lives; a renderer
//! either produces those files or, for [`PlannedRender`], just vouches for
//! the paths so a later pipeline can fill them in.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::config::{MediaConfig, RendererKind};
use crate::{FunnelError, Result};

/// One clip to render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderJob {
    pub tool_name: String,
    pub niche: String,
    pub video_path: PathBuf,
    pub thumbnail_path: PathBuf,
}

/// Where the rendered files ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMedia {
    pub video_path: PathBuf,
    pub thumbnail_path: PathBuf,
}

#[async_trait]
pub trait MediaRenderer: Send + Sync {
    async fn render(&self, job: &RenderJob) -> Result<RenderedMedia>;
}

/// Build the renderer selected in configuration.
pub fn renderer(config: &MediaConfig) -> Arc<dyn MediaRenderer> {
    match config.renderer {
        RendererKind::None => Arc::new(PlannedRender),
        RendererKind::Ffmpeg => Arc::new(FfmpegRenderer::new(config.ffmpeg_path.clone())),
    }
}

/// Returns the requested paths without producing any files.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlannedRender;

#[async_trait]
impl MediaRenderer for PlannedRender {
    async fn render(&self, job: &RenderJob) -> Result<RenderedMedia> {
        Ok(RenderedMedia {
            video_path: job.video_path.clone(),
            thumbnail_path: job.thumbnail_path.clone(),
        })
    }
}

/// Renders a short vertical placeholder clip and a landscape thumbnail with
/// the `ffmpeg` binary.
#[derive(Debug, Clone)]
pub struct FfmpegRenderer {
    program: String,
}

impl FfmpegRenderer {
    const SERVICE: &'static str = "ffmpeg";

    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn video_args(video: &Path) -> Vec<String> {
        [
            "-y",
            "-f",
            "lavfi",
            "-i",
            "color=c=0x1e293b:s=1080x1920:d=5",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
        ]
        .into_iter()
        .map(str::to_string)
        .chain([video.to_string_lossy().into_owned()])
        .collect()
    }

    fn thumbnail_args(thumbnail: &Path) -> Vec<String> {
        [
            "-y",
            "-f",
            "lavfi",
            "-i",
            "color=c=0x1e293b:s=1280x720",
            "-frames:v",
            "1",
        ]
        .into_iter()
        .map(str::to_string)
        .chain([thumbnail.to_string_lossy().into_owned()])
        .collect()
    }

    async fn run(&self, args: Vec<String>) -> Result<()> {
        let output = Command::new(&self.program)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| FunnelError::ExternalService {
                service: Self::SERVICE.to_string(),
                status: 0,
                body: format!("failed to start {}: {e}", self.program),
            })?;

        if !output.status.success() {
            return Err(FunnelError::ExternalService {
                service: Self::SERVICE.to_string(),
                status: output.status.code().unwrap_or(-1).unsigned_abs() as u16,
                body: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MediaRenderer for FfmpegRenderer {
    async fn render(&self, job: &RenderJob) -> Result<RenderedMedia> {
        for path in [&job.video_path, &job.thumbnail_path] {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        self.run(Self::video_args(&job.video_path)).await?;
        self.run(Self::thumbnail_args(&job.thumbnail_path)).await?;
        debug!(video = %job.video_path.display(), tool = %job.tool_name, "Rendered clip");

        Ok(RenderedMedia {
            video_path: job.video_path.clone(),
            thumbnail_path: job.thumbnail_path.clone(),
        })
    }
}
