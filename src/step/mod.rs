//! # Step Module
//!
//! The workflow step and its phases:
//!
//! - `host`: contract with the workflow engine (folders, metadata, process log)
//! - `resizer`: resize phase
//! - `watermarker`: watermark phase and its temporary rasters
//! - `image_step`: orchestration of one run

pub mod host;
pub mod image_step;
pub mod resizer;
pub mod watermarker;

#[cfg(test)]
pub mod testing;

pub use host::{LogEntry, LogKind, ProcessHost, StepOutcome, WorkflowStep};
pub use image_step::ImageStep;
pub use resizer::Resizer;
pub use watermarker::{WatermarkReport, Watermarker};
