//! # Subprocess Gateway
//!
//! Uniform way to run an external tool and capture everything it printed.
//!
//! The gateway never turns a non-zero exit status into an error: callers
//! decide per call site. Resize, orientation stripping, rendering and
//! compositing treat it as a failure. Dimension queries treat it as
//! "dimensions unavailable". Only a failure to start or wait for the process
//! (missing executable, timeout) is an `Err`.

use crate::commands::Invocation;
use crate::error::StepError;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Everything a finished tool reported
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, -1 when the process was ended by a signal
    pub status: i32,
    pub stdout_lines: Vec<String>,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }

    /// Turn a non-zero status into [`StepError::Subprocess`]
    pub fn into_result(self, tool: &Path) -> Result<Self, StepError> {
        if self.success() {
            Ok(self)
        } else {
            Err(StepError::Subprocess {
                tool: tool.display().to_string(),
                status: self.status,
                stderr: self.stderr,
            })
        }
    }
}

/// Runs external tools. Implemented by [`ShellRunner`] and by test doubles.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    async fn invoke(&self, executable: &Path, args: &[OsString]) -> Result<CommandOutput, StepError>;

    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, StepError> {
        self.invoke(&invocation.executable, &invocation.args).await
    }

    /// Run and fail on a non-zero exit status
    async fn run_checked(&self, invocation: &Invocation) -> Result<CommandOutput, StepError> {
        self.run(invocation).await?.into_result(&invocation.executable)
    }
}

/// Runs tools as real child processes, one at a time
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    timeout: Option<Duration>,
}

impl ShellRunner {
    pub fn new(timeout_secs: Option<u64>) -> Self {
        Self {
            timeout: timeout_secs.map(Duration::from_secs),
        }
    }
}

impl CommandRunner for ShellRunner {
    async fn invoke(&self, executable: &Path, args: &[OsString]) -> Result<CommandOutput, StepError> {
        debug!("Command: {:?} {:?}", executable, args);
        let start_time = std::time::Instant::now();

        let mut command = Command::new(executable);
        command.args(args).stdin(Stdio::null()).kill_on_drop(true);
        let child = command.output();

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child)
                .await
                .map_err(|_| StepError::Timeout {
                    tool: executable.display().to_string(),
                    secs: limit.as_secs(),
                })??,
            None => child.await?,
        };

        let result = CommandOutput {
            status: output.status.code().unwrap_or(-1),
            stdout_lines: String::from_utf8_lossy(&output.stdout)
                .lines()
                .map(String::from)
                .collect(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(
            "{} finished with status {} in {:?}",
            executable.display(),
            result.status,
            start_time.elapsed()
        );
        Ok(result)
    }
}
