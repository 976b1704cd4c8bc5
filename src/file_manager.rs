//! # File Management Module
//!
//! Folder operations of the step: enumerating the images of a folder and
//! preparing the output folder.
//!
//! Enumeration is non-recursive and follows the file system's order, which is
//! not sorted. Regular files and symlinks to them are returned; subfolders are
//! skipped. A dangling symlink is an error.

use crate::error::StepError;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use walkdir::WalkDir;

/// Folder helpers
pub struct FileManager;

impl FileManager {
    /// All files directly inside `dir`, symlinked ones included
    pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>, StepError> {
        let mut files = Vec::new();

        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
            let entry = entry.map_err(std::io::Error::from)?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            } else {
                debug!("Skipping non-file entry {}", entry.path().display());
            }
        }

        Ok(files)
    }

    /// Create `dir` and its parents; an existing folder is fine
    pub async fn ensure_dir(dir: &Path) -> Result<(), StepError> {
        fs::create_dir_all(dir).await?;
        Ok(())
    }

    /// Output path for `input` inside `dest_dir`, keeping the file name
    pub fn output_path(input: &Path, dest_dir: &Path) -> Result<PathBuf, StepError> {
        let name = input.file_name().ok_or_else(|| {
            StepError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Invalid file name: {}", input.display()),
            ))
        })?;
        Ok(dest_dir.join(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_list_images_skips_folders() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("00000001.tif"), b"a").unwrap();
        std::fs::write(dir.path().join("00000002.tif"), b"b").unwrap();
        std::fs::create_dir(dir.path().join("thumbs")).unwrap();
        std::fs::write(dir.path().join("thumbs").join("nested.tif"), b"c").unwrap();

        let mut files = FileManager::list_images(dir.path()).unwrap();
        files.sort();
        assert_eq!(
            files,
            vec![dir.path().join("00000001.tif"), dir.path().join("00000002.tif")]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_list_images_includes_symlinked_pages() {
        let dir = TempDir::new().unwrap();
        let store = TempDir::new().unwrap();
        std::fs::write(store.path().join("scan.tif"), b"a").unwrap();
        std::fs::write(dir.path().join("00000002.tif"), b"b").unwrap();
        std::os::unix::fs::symlink(store.path().join("scan.tif"), dir.path().join("00000001.tif")).unwrap();
        std::fs::create_dir(store.path().join("thumbs")).unwrap();
        std::os::unix::fs::symlink(store.path().join("thumbs"), dir.path().join("thumbs")).unwrap();

        let mut files = FileManager::list_images(dir.path()).unwrap();
        files.sort();
        assert_eq!(
            files,
            vec![dir.path().join("00000001.tif"), dir.path().join("00000002.tif")]
        );
    }

    #[test]
    fn test_list_missing_folder_is_error() {
        let dir = TempDir::new().unwrap();
        let err = FileManager::list_images(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, StepError::Io(_)));
    }

    #[tokio::test]
    async fn test_ensure_dir_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("images").join("media");
        FileManager::ensure_dir(&target).await.unwrap();
        FileManager::ensure_dir(&target).await.unwrap();
        assert!(target.is_dir());
    }

    #[test]
    fn test_output_path_keeps_name() {
        let out = FileManager::output_path(Path::new("/p/master/00000001.tif"), Path::new("/p/media")).unwrap();
        assert_eq!(out, PathBuf::from("/p/media/00000001.tif"));
        assert!(FileManager::output_path(Path::new("/"), Path::new("/p/media")).is_err());
    }
}
