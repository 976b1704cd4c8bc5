//! # Resize Phase
//!
//! Shrinks every source image to the configured edge length and writes it to
//! the destination folder, then strips the orientation tag. The first failure
//! stops the phase; images already written stay where they are.

use crate::commands::Toolset;
use crate::error::StepError;
use crate::file_manager::FileManager;
use crate::gateway::CommandRunner;
use std::path::Path;
use tracing::{debug, info};

pub struct Resizer<'a, R> {
    tools: &'a Toolset,
    runner: &'a R,
}

impl<'a, R: CommandRunner> Resizer<'a, R> {
    pub fn new(tools: &'a Toolset, runner: &'a R) -> Self {
        Self { tools, runner }
    }

    /// Resize one image into `dest_dir`
    pub async fn resize_image(&self, input: &Path, dest_dir: &Path, size: u32) -> Result<(), StepError> {
        let output = FileManager::output_path(input, dest_dir)?;
        debug!("Resizing {} -> {} ({}px)", input.display(), output.display(), size);

        self.runner.run_checked(&self.tools.resize(input, &output, size)).await?;
        self.runner.run_checked(&self.tools.strip_orientation(&output)).await?;
        Ok(())
    }

    /// Resize every file of `source_dir`, stopping at the first failure.
    /// Returns the number of images written.
    pub async fn resize_folder(&self, source_dir: &Path, dest_dir: &Path, size: u32) -> Result<usize, StepError> {
        let images = FileManager::list_images(source_dir)?;
        info!(
            "Resizing {} images from {} to {} (max {}px)",
            images.len(),
            source_dir.display(),
            dest_dir.display(),
            size
        );

        for image in &images {
            self.resize_image(image, dest_dir, size).await?;
        }
        Ok(images.len())
    }
}
