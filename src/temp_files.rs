//! # Temporary Artifacts
//!
//! Tracks the rasters a run creates (rendered text watermarks, rescaled
//! watermarks) so that each is deleted exactly once, whatever path the run takes.
//!
//! Files are only ever registered by the step itself, so a user-supplied
//! watermark image can never end up here.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Per-run set of temporary files
#[derive(Debug)]
pub struct TempArtifacts {
    dir: PathBuf,
    owned: Vec<PathBuf>,
}

impl TempArtifacts {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            owned: Vec::new(),
        }
    }

    /// Reserve a fresh, uniquely named file `<prefix><random>.png` and take ownership of it.
    ///
    /// The file is created empty; the tool that renders into it overwrites it.
    pub async fn allocate(&mut self, prefix: &str) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let dir = self.dir.clone();
        let prefix = prefix.to_string();
        let path = tokio::task::spawn_blocking(move || -> std::io::Result<PathBuf> {
            let file = tempfile::Builder::new()
                .prefix(&prefix)
                .suffix(".png")
                .tempfile_in(&dir)?;
            let (_, path) = file.keep().map_err(|e| e.error)?;
            Ok(path)
        })
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))??;
        debug!("Allocated temp file {}", path.display());
        self.owned.push(path.clone());
        Ok(path)
    }

    pub fn len(&self) -> usize {
        self.owned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owned.is_empty()
    }

    /// Delete one owned file now. Paths not owned by this set are left alone.
    pub async fn release(&mut self, path: &Path) {
        if let Some(index) = self.owned.iter().position(|p| p == path) {
            let path = self.owned.swap_remove(index);
            remove_logged(&path).await;
        }
    }

    /// Delete every remaining owned file
    pub async fn cleanup(&mut self) {
        for path in std::mem::take(&mut self.owned) {
            remove_logged(&path).await;
        }
    }
}

async fn remove_logged(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed temp file {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("Temp file {} already gone", path.display())
        }
        Err(e) => warn!("Could not delete temp file {}: {}", path.display(), e),
    }
}

/// Removes what `cleanup` never reached, e.g. when a run future is dropped.
/// Release builds abort on panic, so this does not run for panics there.
impl Drop for TempArtifacts {
    fn drop(&mut self) {
        for path in self.owned.drain(..) {
            if let Err(e) = std::fs::remove_file(&path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Could not delete temp file {}: {}", path.display(), e);
                }
            }
        }
    }
}
