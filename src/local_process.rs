//! # Local Process Host
//!
//! A [`ProcessHost`] backed by a plain process directory, used by the
//! command-line binary:
//!
//! ```text
//! <process_dir>/
//!   images/<folder>/      image folders, resolved by name
//!   metadata.json         {"collection": "...", "media_type": "..."} (optional)
//!   process_log.jsonl     process log, one JSON entry per line
//! ```

use crate::error::StepError;
use crate::rules::DocumentKeys;
use crate::step::host::{LogEntry, LogKind, ProcessHost};
use serde::Deserialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::{error, info, warn};

pub const IMAGES_DIR: &str = "images";
pub const METADATA_FILE: &str = "metadata.json";
pub const PROCESS_LOG_FILE: &str = "process_log.jsonl";

#[derive(Debug, Default, Deserialize)]
struct MetadataFile {
    collection: Option<String>,
    media_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LocalProcess {
    process_dir: PathBuf,
    process_id: u64,
    project: String,
    step: String,
    keys_override: Option<DocumentKeys>,
}

impl LocalProcess {
    pub fn new(
        process_dir: impl Into<PathBuf>,
        process_id: u64,
        project: impl Into<String>,
        step: impl Into<String>,
    ) -> Self {
        Self {
            process_dir: process_dir.into(),
            process_id,
            project: project.into(),
            step: step.into(),
            keys_override: None,
        }
    }

    /// Use these keys instead of reading `metadata.json`
    pub fn with_keys(mut self, keys: DocumentKeys) -> Self {
        self.keys_override = Some(keys);
        self
    }

    pub fn log_path(&self) -> PathBuf {
        self.process_dir.join(PROCESS_LOG_FILE)
    }

    fn append_log(&self, entry: &LogEntry) -> Result<(), StepError> {
        let line = serde_json::to_string(entry)
            .map_err(|e| StepError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_path())?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}

impl ProcessHost for LocalProcess {
    fn process_id(&self) -> u64 {
        self.process_id
    }

    fn project_name(&self) -> &str {
        &self.project
    }

    fn step_name(&self) -> &str {
        &self.step
    }

    fn image_folder(&self, name: &str) -> Result<PathBuf, StepError> {
        if name.trim().is_empty() {
            return Err(StepError::Configuration("Image folder name is empty".to_string()));
        }
        Ok(self.process_dir.join(IMAGES_DIR).join(name))
    }

    fn document_keys(&self) -> Result<DocumentKeys, StepError> {
        if let Some(keys) = &self.keys_override {
            return Ok(keys.clone());
        }

        let path = self.process_dir.join(METADATA_FILE);
        let content = std::fs::read_to_string(&path)
            .map_err(|e| StepError::MetadataRead(format!("{}: {}", path.display(), e)))?;
        let metadata: MetadataFile = serde_json::from_str(&content)
            .map_err(|e| StepError::MetadataRead(format!("{}: {}", path.display(), e)))?;

        Ok(DocumentKeys {
            collection: metadata.collection,
            media_type: metadata.media_type,
        })
    }

    fn write_log(&self, entry: LogEntry) {
        match entry.kind {
            LogKind::Error => error!(process = self.process_id, "{}", entry.content),
            LogKind::Info => info!(process = self.process_id, "{}", entry.content),
        }
        if let Err(e) = self.append_log(&entry) {
            warn!("Could not write process log {}: {}", self.log_path().display(), e);
        }
    }
}
