//! # Resize-and-Watermark Step
//!
//! Orchestrates one run over a process's image folders:
//!
//! 1. resolve source and destination folders
//! 2. read the document's collection / media type and look up the resize size
//! 3. resize every source image into the destination (fail-fast)
//! 4. resolve the watermarks for the same keys; none is a successful no-op
//! 5. pre-render text watermarks once, composite every watermark onto every
//!    output image (best effort, failures are logged and skipped)
//! 6. delete every temporary raster, whatever happened in 5
//!
//! Detailed failure reasons go to the host's process log; the host only sees
//! [`StepOutcome`].

use crate::commands::Toolset;
use crate::config::{Config, StepSection};
use crate::error::StepError;
use crate::file_manager::FileManager;
use crate::gateway::CommandRunner;
use crate::rules::{resize_size, watermarks_for, DocumentKeys};
use crate::step::host::{LogEntry, ProcessHost, StepOutcome, WorkflowStep};
use crate::step::resizer::Resizer;
use crate::step::watermarker::{WatermarkReport, Watermarker};
use crate::watermark::WatermarkSpec;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

pub const STEP_TITLE: &str = "image_resize_and_watermark";

/// The workflow step. Configuration is fixed at construction.
pub struct ImageStep<H, R> {
    config: Config,
    tools: Toolset,
    host: H,
    runner: R,
    section: Option<StepSection>,
    report: WatermarkReport,
}

impl<H: ProcessHost, R: CommandRunner> ImageStep<H, R> {
    pub fn new(config: Config, host: H, runner: R) -> Self {
        let tools = Toolset::new(&config);
        Self {
            config,
            tools,
            host,
            runner,
            section: None,
            report: WatermarkReport::default(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Composite counts of the last run
    pub fn last_report(&self) -> WatermarkReport {
        self.report
    }

    fn log_error(&self, content: impl Into<String>) {
        let content = content.into();
        error!("{}", content);
        self.host.write_log(LogEntry::error(self.host.process_id(), content));
    }

    fn log_info(&self, content: impl Into<String>) {
        let content = content.into();
        info!("{}", content);
        self.host.write_log(LogEntry::info(self.host.process_id(), content));
    }

    fn folders(&self, section: &StepSection) -> Result<(PathBuf, PathBuf), StepError> {
        let source = self.host.image_folder(&section.source_dir)?;
        let dest = self.host.image_folder(&section.dest_dir)?;
        Ok((source, dest))
    }

    /// Resize phase. `Err(())` means a reason was already written to the process log.
    async fn resize_images(
        &self,
        section: &StepSection,
        keys: &DocumentKeys,
        source: &Path,
        dest: &Path,
    ) -> Result<(), ()> {
        let size = resize_size(&section.rules, keys);
        if size == 0 {
            self.log_error(
                "There is no image size configured for this process. Please check the plugin configuration.",
            );
            return Err(());
        }

        if let Err(e) = FileManager::ensure_dir(dest).await {
            self.log_error(format!("Error creating destination folder {}: {}", dest.display(), e));
            return Err(());
        }

        let resizer = Resizer::new(&self.tools, &self.runner);
        match resizer.resize_folder(source, dest, size).await {
            Ok(count) => {
                info!("Resized {} images", count);
                Ok(())
            }
            Err(StepError::Subprocess { stderr, .. }) => {
                self.log_error(format!("Error converting image. Command output:\n{}", stderr));
                Err(())
            }
            Err(e @ StepError::Io(_)) => {
                self.log_error(format!("Error converting images: {}", e));
                Err(())
            }
            Err(e) => {
                self.log_error(format!("Error converting image: {}", e));
                Err(())
            }
        }
    }

    /// Watermark phase. Per-pair failures are counted, not returned.
    async fn add_watermarks(
        &self,
        section: &StepSection,
        keys: &DocumentKeys,
        dest: &Path,
    ) -> Result<WatermarkReport, ()> {
        let specs = watermarks_for(&section.rules, keys);
        if specs.is_empty() {
            self.log_info("Could not find any watermark configuration for this process - not watermarking");
            return Ok(WatermarkReport::default());
        }

        let mut watermarker = Watermarker::new(&self.tools, &self.runner, self.config.temp_dir());
        let result = self.composite_all(&mut watermarker, &specs, dest).await;
        watermarker.cleanup().await;
        result
    }

    async fn composite_all(
        &self,
        watermarker: &mut Watermarker<'_, R>,
        specs: &[WatermarkSpec],
        dest: &Path,
    ) -> Result<WatermarkReport, ()> {
        let rendered = match watermarker.prerender(specs).await {
            Ok(rendered) => rendered,
            Err(e) => {
                warn!("Pre-rendering watermarks failed: {}", e);
                self.log_error("Error creating watermark image from text");
                return Err(());
            }
        };

        let canvases = match FileManager::list_images(dest) {
            Ok(canvases) => canvases,
            Err(e) => {
                warn!("Listing {} failed: {}", dest.display(), e);
                self.log_error("Error listing destination directory for watermarking.");
                return Err(());
            }
        };

        let mut report = WatermarkReport::default();
        for canvas in &canvases {
            for watermark in &rendered {
                match watermarker.apply(canvas, watermark).await {
                    Ok(()) => report.applied += 1,
                    Err(e) => {
                        report.failed += 1;
                        self.log_error(watermark_failure_message(canvas, &e));
                    }
                }
            }
        }

        info!(
            "Watermarked {} images: {} composites applied, {} failed",
            canvases.len(),
            report.applied,
            report.failed
        );
        Ok(report)
    }
}

fn watermark_failure_message(canvas: &Path, err: &StepError) -> String {
    match err {
        StepError::Subprocess { stderr, .. } => {
            format!("Error watermarking image. Process output was:\n{}", stderr)
        }
        StepError::UnexpectedOutput { .. } => {
            format!("Error watermarking image: Unexpected output from identify. ({})", err)
        }
        other => format!("Error watermarking image {}: {}", canvas.display(), other),
    }
}

impl<H: ProcessHost, R: CommandRunner> WorkflowStep for ImageStep<H, R> {
    fn title(&self) -> &'static str {
        STEP_TITLE
    }

    fn initialize(&mut self) -> Result<(), StepError> {
        let project = self.host.project_name();
        let step = self.host.step_name();
        let section = self.config.section_for(project, step).cloned().ok_or_else(|| {
            StepError::Configuration(format!(
                "No configuration section for project '{}' and step '{}'",
                project, step
            ))
        })?;
        info!(
            "Using section project='{}' step='{}' ({} rules)",
            section.project,
            section.step,
            section.rules.len()
        );
        self.section = Some(section);
        Ok(())
    }

    async fn run(&mut self) -> StepOutcome {
        let Some(section) = self.section.clone() else {
            self.log_error("Step was run without a configuration section");
            return StepOutcome::Error;
        };

        let (source, dest) = match self.folders(&section) {
            Ok(folders) => folders,
            Err(e) => {
                warn!("Folder resolution failed: {}", e);
                self.log_error("Error reading configured input and output folders");
                return StepOutcome::Error;
            }
        };

        let keys = match self.host.document_keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Metadata read failed: {}", e);
                self.log_error("Error reading metadata to determine resizing size.");
                return StepOutcome::Error;
            }
        };

        if self.resize_images(&section, &keys, &source, &dest).await.is_err() {
            return StepOutcome::Error;
        }

        match self.add_watermarks(&section, &keys, &dest).await {
            Ok(report) => {
                self.report = report;
                StepOutcome::Finished
            }
            Err(()) => StepOutcome::Error,
        }
    }
}
