//! # Watermark Geometry
//!
//! Decides whether a watermark has to shrink before it is composited.
//!
//! A margin of [`MARGIN`] pixels is kept on each side of the canvas, so the
//! usable area is `canvas - 2 * MARGIN` along each axis. A watermark that does
//! not fit is scaled by the smaller of the two axis ratios, expressed as a
//! truncated integer percentage for `-resize N%`.

use crate::error::StepError;
use std::fmt;

/// Pixels kept free between the watermark and each canvas edge
pub const MARGIN: u32 = 100;

/// Pixel size of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Parse the `"%w %h"` line printed by `identify -format`.
    ///
    /// Exactly two positive integers are accepted. Anything else, including
    /// empty output, is an error rather than a zero size.
    pub fn parse(tool: &str, stdout_lines: &[String]) -> Result<Self, StepError> {
        let unexpected = || StepError::UnexpectedOutput {
            tool: tool.to_string(),
            output: stdout_lines.join("\n"),
        };

        let line = stdout_lines
            .iter()
            .map(|l| l.trim())
            .find(|l| !l.is_empty())
            .ok_or_else(unexpected)?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 2 {
            return Err(unexpected());
        }
        let (width, height) = match (parts[0].parse::<u32>(), parts[1].parse::<u32>()) {
            (Ok(w), Ok(h)) if w > 0 && h > 0 => (w, h),
            _ => return Err(unexpected()),
        };
        Ok(Self { width, height })
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Outcome of [`plan_placement`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Watermark fits as is, composite the original raster
    AsIs,
    /// Watermark must be resized to this percentage (1..=99) first
    Rescale(u32),
}

/// Percentage for one axis, 100 when the watermark already fits
fn axis_percent(axis: &str, canvas: u32, watermark: u32) -> Result<u32, StepError> {
    let available = i64::from(canvas) - 2 * i64::from(MARGIN);
    let watermark = i64::from(watermark);
    if available >= watermark {
        return Ok(100);
    }
    if available <= 0 {
        return Err(StepError::Geometry(format!(
            "canvas {} of {}px leaves no room inside the {}px margins",
            axis, canvas, MARGIN
        )));
    }
    // available < watermark, so the result is below 100
    Ok((available * 100 / watermark) as u32)
}

/// Compute how much a watermark must shrink to fit the canvas with margins
pub fn plan_placement(canvas: Dimensions, watermark: Dimensions) -> Result<Placement, StepError> {
    let percent_x = axis_percent("width", canvas.width, watermark.width)?;
    let percent_y = axis_percent("height", canvas.height, watermark.height)?;
    match percent_x.min(percent_y) {
        100 => Ok(Placement::AsIs),
        0 => Err(StepError::Geometry(format!(
            "watermark {} would shrink below 1% to fit canvas {}",
            watermark, canvas
        ))),
        p => Ok(Placement::Rescale(p)),
    }
}
