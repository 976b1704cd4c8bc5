//! # Watermark Descriptors
//!
//! Normalized watermark settings and the rasters that are ready to composite.
//!
//! A [`WatermarkSpec`] is exactly one of image or text. A [`RenderedWatermark`]
//! pairs a spec with the file that actually gets composited: the user's own
//! image, or a temporary raster rendered from text.

use crate::config::WatermarkEntry;
use std::path::{Path, PathBuf};

/// Where the watermark pixels come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatermarkSource {
    /// Pre-existing image on disk, never deleted by the step
    Image(PathBuf),
    /// Caption rendered by the text tool before compositing
    Text {
        text: String,
        font: String,
        box_size: String,
        shade_size: String,
    },
}

/// A normalized watermark: source plus placement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatermarkSpec {
    pub source: WatermarkSource,
    /// Compass gravity for the composite tool (north, southeast, ...)
    pub location: String,
    pub x_distance: u32,
    pub y_distance: u32,
}

impl From<&WatermarkEntry> for WatermarkSpec {
    /// An entry without an image path is a text watermark
    fn from(entry: &WatermarkEntry) -> Self {
        let source = match &entry.image {
            Some(path) => WatermarkSource::Image(path.clone()),
            None => WatermarkSource::Text {
                text: entry.text.clone().unwrap_or_default(),
                font: entry.font.clone(),
                box_size: entry.box_size.clone(),
                shade_size: entry.shade_size.clone(),
            },
        };
        Self {
            source,
            location: entry.location.clone(),
            x_distance: entry.x_distance,
            y_distance: entry.y_distance,
        }
    }
}

/// A watermark whose raster exists on disk for the duration of one run
#[derive(Debug, Clone)]
pub struct RenderedWatermark {
    pub spec: WatermarkSpec,
    path: PathBuf,
}

impl RenderedWatermark {
    pub fn new(spec: WatermarkSpec, path: PathBuf) -> Self {
        Self { spec, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_entry() {
        let spec = WatermarkSpec::from(&WatermarkEntry::image("/opt/wm/logo.png"));
        assert_eq!(spec.source, WatermarkSource::Image(PathBuf::from("/opt/wm/logo.png")));
        assert_eq!(spec.location, "southeast");
        assert_eq!((spec.x_distance, spec.y_distance), (100, 100));
        assert!(matches!(spec.source, WatermarkSource::Image(_)));
    }

    #[test]
    fn test_text_entry() {
        let mut entry = WatermarkEntry::text("Goobi.io");
        entry.font = "Arial".to_string();
        entry.location = "north".to_string();
        entry.x_distance = 10;
        let spec = WatermarkSpec::from(&entry);
        assert_eq!(
            spec.source,
            WatermarkSource::Text {
                text: "Goobi.io".to_string(),
                font: "Arial".to_string(),
                box_size: "450x200".to_string(),
                shade_size: "240x40".to_string(),
            }
        );
        assert_eq!(spec.location, "north");
        assert_eq!(spec.x_distance, 10);
    }

    #[test]
    fn test_image_wins_over_text() {
        let mut entry = WatermarkEntry::image("/opt/wm/logo.png");
        entry.text = Some("ignored".to_string());
        assert!(matches!(WatermarkSpec::from(&entry).source, WatermarkSource::Image(_)));
    }
}
