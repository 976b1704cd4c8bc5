//! # Host Engine Contract
//!
//! The narrow surface the step needs from the workflow engine that runs it:
//! folder resolution, the document's metadata keys and the process log.
//! The step itself is exposed to the host through [`WorkflowStep`].

use crate::error::StepError;
use crate::rules::DocumentKeys;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Author recorded on every process-log entry written by the step
pub const LOG_AUTHOR: &str = "automatic";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Error,
    Info,
}

/// One entry of the host's process log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub process_id: u64,
    /// Unix seconds
    pub created_at: u64,
    pub kind: LogKind,
    pub author: String,
    pub content: String,
}

impl LogEntry {
    fn now(process_id: u64, kind: LogKind, content: impl Into<String>) -> Self {
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            process_id,
            created_at,
            kind,
            author: LOG_AUTHOR.to_string(),
            content: content.into(),
        }
    }

    pub fn error(process_id: u64, content: impl Into<String>) -> Self {
        Self::now(process_id, LogKind::Error, content)
    }

    pub fn info(process_id: u64, content: impl Into<String>) -> Self {
        Self::now(process_id, LogKind::Info, content)
    }
}

/// What the host provides for the process being worked on
pub trait ProcessHost {
    fn process_id(&self) -> u64;

    fn project_name(&self) -> &str;

    fn step_name(&self) -> &str;

    /// Absolute path of a configured image folder such as `media` or `master`
    fn image_folder(&self, name: &str) -> Result<PathBuf, StepError>;

    /// Collection and media type of the digitized document
    fn document_keys(&self) -> Result<DocumentKeys, StepError>;

    /// Append to the process log. Must not fail the step.
    fn write_log(&self, entry: LogEntry);
}

/// Terminal signal reported back to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Finished,
    Error,
}

/// Lifecycle the host drives: initialize once, then run
#[allow(async_fn_in_trait)]
pub trait WorkflowStep {
    fn title(&self) -> &'static str;

    fn initialize(&mut self) -> Result<(), StepError>;

    async fn run(&mut self) -> StepOutcome;
}
