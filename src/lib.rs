//! # Page Watermarker Library
//!
//! Workflow step that resizes the digitized page images of a process and
//! stamps image or text watermarks onto the results, driving GraphicsMagick,
//! ImageMagick and exiftool as external programs.
//!
//! ## Module layout:
//! - `config`: JSON configuration, section lookup and validation
//! - `error`: error type shared by all phases
//! - `rules`: rule matching on collection / media type
//! - `watermark`: watermark descriptors
//! - `geometry`: margin-aware watermark scaling
//! - `commands`: argument vectors for every external call
//! - `gateway`: running external commands
//! - `temp_files`: temporary rasters owned by one run
//! - `file_manager`: folder listing and preparation
//! - `step`: the workflow step, its phases and the host contract
//! - `local_process`: host backed by a process directory
//!
//! ## Usage:
//! ```rust,no_run
//! use page_watermarker::{Config, ImageStep, LocalProcess, ShellRunner, WorkflowStep};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::from_file("watermark.json".as_ref()).await?;
//! let host = LocalProcess::new("/data/processes/17", 17, "Archive", "Resize");
//! let runner = ShellRunner::new(config.command_timeout_secs);
//! let mut step = ImageStep::new(config, host, runner);
//! step.initialize()?;
//! let outcome = step.run().await;
//! # Ok(())
//! # }
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod file_manager;
pub mod gateway;
pub mod geometry;
pub mod local_process;
pub mod rules;
pub mod step;
pub mod temp_files;
pub mod utils;
pub mod watermark;

pub use config::Config;
pub use error::StepError;
pub use gateway::{CommandRunner, ShellRunner};
pub use local_process::LocalProcess;
pub use rules::DocumentKeys;
pub use step::{ImageStep, ProcessHost, StepOutcome, WorkflowStep};
