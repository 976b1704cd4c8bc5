//! # Error Types Module
//!
//! Defines the error taxonomy of the resize-and-watermark step.
//!
//! ## Categories:
//! - `Configuration`: missing or zero resize size, unresolvable folders, bad config file
//! - `MetadataRead`: the document's collection / media type could not be read
//! - `Subprocess`: an external tool exited with a non-zero status
//! - `UnexpectedOutput`: a tool succeeded but printed something we cannot parse
//! - `Timeout`: a tool ran longer than the configured limit
//! - `Geometry`: the watermark cannot be scaled to fit the canvas
//! - `Io`: directory listing, creation and temp-file failures
//!
//! Which of these stop a run is decided by the caller, not here: resize-phase
//! failures are fatal, watermark-phase failures only skip one image/watermark pair.

/// Errors raised while resizing and watermarking a process's images
#[derive(thiserror::Error, Debug)]
pub enum StepError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Metadata read error: {0}")]
    MetadataRead(String),

    #[error("{tool} exited with status {status}: {stderr}")]
    Subprocess {
        tool: String,
        status: i32,
        stderr: String,
    },

    #[error("Unexpected output from {tool}: {output:?}")]
    UnexpectedOutput { tool: String, output: String },

    #[error("{tool} timed out after {secs}s")]
    Timeout { tool: String, secs: u64 },

    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subprocess_message_carries_stderr() {
        let err = StepError::Subprocess {
            tool: "/usr/bin/gm".to_string(),
            status: 1,
            stderr: "unable to open image".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "/usr/bin/gm exited with status 1: unable to open image"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: StepError = io.into();
        assert!(matches!(err, StepError::Io(_)));
        assert_eq!(err.to_string(), "IO error: gone");
    }
}
