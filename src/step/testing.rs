//! Test doubles for the host engine and the external tools.
//!
//! `RecordingRunner` records every invocation and mimics the tools at the file
//! level: resize copies its input, rendering and rescaling write their output,
//! identify answers from a table of sizes. Nothing touches real image data.

use crate::commands::Invocation;
use crate::error::StepError;
use crate::gateway::{CommandOutput, CommandRunner};
use crate::geometry::Dimensions;
use crate::rules::DocumentKeys;
use crate::step::host::{LogEntry, LogKind, ProcessHost};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub struct RecordingRunner {
    calls: Mutex<Vec<Invocation>>,
    fail_rules: Vec<Vec<String>>,
    sizes: Vec<(String, Dimensions)>,
    default_size: Dimensions,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_rules: Vec::new(),
            sizes: Vec::new(),
            default_size: Dimensions::new(1000, 1000),
        }
    }

    /// Fail every call whose command line contains `pattern`
    pub fn fail_when(self, pattern: &str) -> Self {
        self.fail_when_all(&[pattern])
    }

    /// Fail every call whose command line contains all of `patterns`
    pub fn fail_when_all(mut self, patterns: &[&str]) -> Self {
        self.fail_rules.push(patterns.iter().map(|p| p.to_string()).collect());
        self
    }

    /// Report `size` for identify on files whose name starts with `prefix`
    pub fn with_size(mut self, prefix: &str, size: Dimensions) -> Self {
        self.sizes.push((prefix.to_string(), size));
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self, pred: impl Fn(&[OsString]) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(&c.args)).count()
    }

    /// gm sub-command count (`convert` includes resizes and rescales)
    pub fn count_subcommand(&self, name: &str) -> usize {
        self.count(|a| a.first().map(OsString::as_os_str) == Some(OsStr::new(name)))
    }

    pub fn count_resizes(&self) -> usize {
        self.count(|a| a.len() > 1 && a[0] == "convert" && a[1] == "-auto-orient")
    }

    pub fn count_rescales(&self) -> usize {
        self.count(|a| a.len() > 1 && a[0] == "convert" && a[1] != "-auto-orient")
    }

    pub fn count_exiftool(&self) -> usize {
        self.count(|a| a.first().map(OsString::as_os_str) == Some(OsStr::new("-Orientation=")))
    }

    pub fn count_text_renders(&self) -> usize {
        self.count(|a| a.first().map(OsString::as_os_str) == Some(OsStr::new("-size")))
    }

    fn size_of(&self, path: &Path) -> Dimensions {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.sizes
            .iter()
            .find(|(prefix, _)| name.starts_with(prefix.as_str()))
            .map(|(_, size)| *size)
            .unwrap_or(self.default_size)
    }

    fn emulate(&self, args: &[OsString]) -> Result<CommandOutput, StepError> {
        let ok = CommandOutput::default();
        let arg = |i: usize| args.get(i).and_then(|a| a.to_str());
        match arg(0) {
            Some("convert") if arg(1) == Some("-auto-orient") => {
                std::fs::copy(&args[2], &args[5])?;
                Ok(ok)
            }
            Some("convert") => {
                std::fs::write(&args[4], b"rescaled")?;
                Ok(ok)
            }
            Some("-size") => {
                if let Some(out) = args.last() {
                    std::fs::write(out, b"rendered")?;
                }
                Ok(ok)
            }
            Some("identify") => {
                let size = self.size_of(Path::new(&args[4]));
                Ok(CommandOutput {
                    stdout_lines: vec![format!("{} {}", size.width, size.height)],
                    ..ok
                })
            }
            _ => Ok(ok),
        }
    }
}

impl CommandRunner for RecordingRunner {
    async fn invoke(&self, executable: &Path, args: &[OsString]) -> Result<CommandOutput, StepError> {
        let invocation = Invocation {
            executable: executable.to_path_buf(),
            args: args.to_vec(),
        };
        let line = invocation.to_string();
        self.calls.lock().unwrap().push(invocation);

        if self
            .fail_rules
            .iter()
            .any(|rule| rule.iter().all(|p| line.contains(p.as_str())))
        {
            return Ok(CommandOutput {
                status: 1,
                stdout_lines: Vec::new(),
                stderr: "simulated failure".to_string(),
            });
        }
        self.emulate(args)
    }
}

/// In-memory host: folders under `root`, fixed document keys, captured log
pub struct MemoryHost {
    pub root: PathBuf,
    pub keys: Option<DocumentKeys>,
    pub folders_resolvable: bool,
    pub project: String,
    pub step: String,
    log: Mutex<Vec<LogEntry>>,
}

impl MemoryHost {
    pub fn new(root: &Path, keys: DocumentKeys) -> Self {
        Self {
            root: root.to_path_buf(),
            keys: Some(keys),
            folders_resolvable: true,
            project: "Archive".to_string(),
            step: "Resize".to_string(),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.log.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.kind == LogKind::Error)
            .map(|e| e.content)
            .collect()
    }

    pub fn infos(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.kind == LogKind::Info)
            .map(|e| e.content)
            .collect()
    }
}

impl ProcessHost for MemoryHost {
    fn process_id(&self) -> u64 {
        17
    }

    fn project_name(&self) -> &str {
        &self.project
    }

    fn step_name(&self) -> &str {
        &self.step
    }

    fn image_folder(&self, name: &str) -> Result<PathBuf, StepError> {
        if self.folders_resolvable {
            Ok(self.root.join(name))
        } else {
            Err(StepError::Configuration(format!("unknown folder {}", name)))
        }
    }

    fn document_keys(&self) -> Result<DocumentKeys, StepError> {
        self.keys
            .clone()
            .ok_or_else(|| StepError::MetadataRead("meta.xml unreadable".to_string()))
    }

    fn write_log(&self, entry: LogEntry) {
        self.log.lock().unwrap().push(entry);
    }
}
