//! # Watermark Phase
//!
//! Composites watermarks onto already resized images, in place.
//!
//! Text watermarks are rendered to temporary rasters once per run, not once
//! per image. For every image/watermark pair both sizes are queried, the
//! watermark is shrunk to a temporary copy when it would not fit inside the
//! margins, and the result is blended into the canvas. All temporary rasters
//! belong to the [`Watermarker`] and are removed by [`Watermarker::cleanup`]
//! (or on drop).

use crate::commands::Toolset;
use crate::error::StepError;
use crate::gateway::CommandRunner;
use crate::geometry::{plan_placement, Dimensions, Placement};
use crate::temp_files::TempArtifacts;
use crate::watermark::{RenderedWatermark, WatermarkSource, WatermarkSpec};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Counts of one watermark phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatermarkReport {
    pub applied: usize,
    pub failed: usize,
}

pub struct Watermarker<'a, R> {
    tools: &'a Toolset,
    runner: &'a R,
    artifacts: TempArtifacts,
}

impl<'a, R: CommandRunner> Watermarker<'a, R> {
    pub fn new(tools: &'a Toolset, runner: &'a R, temp_dir: PathBuf) -> Self {
        Self {
            tools,
            runner,
            artifacts: TempArtifacts::new(temp_dir),
        }
    }

    /// Temporary files currently held
    pub fn pending_artifacts(&self) -> usize {
        self.artifacts.len()
    }

    /// Make every watermark ready to composite. Text is rendered exactly once per spec.
    pub async fn prerender(&mut self, specs: &[WatermarkSpec]) -> Result<Vec<RenderedWatermark>, StepError> {
        let mut rendered = Vec::with_capacity(specs.len());
        for spec in specs {
            let path = match &spec.source {
                WatermarkSource::Image(path) => path.clone(),
                WatermarkSource::Text { .. } => self.render_text(spec).await?,
            };
            rendered.push(RenderedWatermark::new(spec.clone(), path));
        }
        Ok(rendered)
    }

    async fn render_text(&mut self, spec: &WatermarkSpec) -> Result<PathBuf, StepError> {
        let output = self.artifacts.allocate("watermark_").await?;
        if let Some(invocation) = self.tools.render_text(spec, &output) {
            self.runner.run_checked(&invocation).await?;
        }
        debug!("Rendered text watermark to {}", output.display());
        Ok(output)
    }

    /// Pixel size of an image; non-zero exit or unparseable output means unavailable
    pub async fn dimensions(&self, image: &Path) -> Result<Dimensions, StepError> {
        let invocation = self.tools.identify(image);
        let output = self.runner.run_checked(&invocation).await?;
        Dimensions::parse(&invocation.executable.display().to_string(), &output.stdout_lines)
    }

    async fn rescale(&mut self, watermark: &Path, percent: u32) -> Result<PathBuf, StepError> {
        let stem = watermark
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "watermark".to_string());
        let output = self.artifacts.allocate(&format!("{}_resized_", stem)).await?;

        let invocation = self.tools.rescale(watermark, percent, &output);
        if let Err(e) = self.runner.run_checked(&invocation).await {
            self.artifacts.release(&output).await;
            return Err(e);
        }
        debug!("Rescaled {} to {}% as {}", watermark.display(), percent, output.display());
        Ok(output)
    }

    /// Composite one watermark onto one canvas, overwriting the canvas
    pub async fn apply(&mut self, canvas: &Path, watermark: &RenderedWatermark) -> Result<(), StepError> {
        let canvas_size = self.dimensions(canvas).await?;
        let watermark_size = self.dimensions(watermark.path()).await?;

        match plan_placement(canvas_size, watermark_size)? {
            Placement::AsIs => self.composite(canvas, watermark, watermark.path()).await,
            Placement::Rescale(percent) => {
                let copy = self.rescale(watermark.path(), percent).await?;
                let result = self.composite(canvas, watermark, &copy).await;
                self.artifacts.release(&copy).await;
                result
            }
        }
    }

    async fn composite(&self, canvas: &Path, watermark: &RenderedWatermark, raster: &Path) -> Result<(), StepError> {
        self.runner
            .run_checked(&self.tools.composite(&watermark.spec, raster, canvas))
            .await?;
        Ok(())
    }

    /// Delete every temporary raster of this run
    pub async fn cleanup(&mut self) {
        self.artifacts.cleanup().await;
    }
}
