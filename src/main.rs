//! # Page Watermarker - Main Entry Point
//!
//! Runs the resize-and-watermark step once for a process directory.
//!
//! ## Execution flow:
//! 1. Parse the command line with `clap`
//! 2. Set up `tracing` (INFO, DEBUG with `--verbose`, `RUST_LOG` wins)
//! 3. Load and validate the JSON configuration
//! 4. Build the local process host and the shell runner
//! 5. Initialize the step for the project/step pair and run it
//!
//! ## Example:
//! ```bash
//! page-watermarker --config watermark.json --process-dir /data/processes/17 \
//!     --project Archive --step "Create derivates" --collection mycollection
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use page_watermarker::{
    Config, DocumentKeys, ImageStep, LocalProcess, ShellRunner, StepOutcome, WorkflowStep,
};

#[derive(Parser)]
#[command(name = "page-watermarker")]
#[command(about = "Resize page images and stamp watermarks onto them")]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Process directory holding images/, metadata.json and the process log
    #[arg(long)]
    process_dir: PathBuf,

    /// Project name used for section lookup
    #[arg(long)]
    project: String,

    /// Step name used for section lookup
    #[arg(long)]
    step: String,

    /// Process id recorded in log entries
    #[arg(long, default_value = "0")]
    process_id: u64,

    /// Collection of the document (skips metadata.json)
    #[arg(long)]
    collection: Option<String>,

    /// Media type of the document (skips metadata.json)
    #[arg(long)]
    media_type: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if !args.process_dir.is_dir() {
        return Err(anyhow::anyhow!(
            "Process directory does not exist: {}",
            args.process_dir.display()
        ));
    }

    let config = Config::from_file(&args.config).await?;

    let mut host = LocalProcess::new(&args.process_dir, args.process_id, args.project, args.step);
    if args.collection.is_some() || args.media_type.is_some() {
        host = host.with_keys(DocumentKeys {
            collection: args.collection,
            media_type: args.media_type,
        });
    }

    let runner = ShellRunner::new(config.command_timeout_secs);
    let mut step = ImageStep::new(config, host, runner);
    step.initialize()?;

    info!("Running {} on {}", step.title(), args.process_dir.display());
    match step.run().await {
        StepOutcome::Finished => {
            let report = step.last_report();
            info!(
                "Step finished: {} watermarks applied, {} failed",
                report.applied, report.failed
            );
            Ok(())
        }
        StepOutcome::Error => Err(anyhow::anyhow!(
            "Step failed, see {}",
            step.host().log_path().display()
        )),
    }
}
