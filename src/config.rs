//! # Configuration Management Module
//!
//! Holds the plugin configuration: which executables to call, and for each
//! project/step combination where the images live and which rules apply.
//!
//! ## Parameters:
//! - `gm_path`: GraphicsMagick binary used for resize, identify, rescale and composite (default: `/usr/bin/gm`)
//! - `exiftool_path`: exiftool binary used to strip the orientation tag (default: `/usr/bin/exiftool`)
//! - `convert_path`: ImageMagick `convert` used to render text watermarks (default: `/usr/bin/convert`)
//! - `temp_dir`: where temporary watermark rasters are written (default: OS temp dir)
//! - `command_timeout_secs`: optional limit for every external call (default: none)
//! - `sections`: per project/step settings, see [`StepSection`]
//!
//! ## Section lookup
//! A section is picked in four tiers, the first tier with a match wins:
//! 1. project and step match
//! 2. project is `*`, step matches
//! 3. project matches, step is `*`
//! 4. project and step are `*`
//!
//! ## Example:
//! ```json
//! {
//!   "gm_path": "/usr/bin/gm",
//!   "sections": [{
//!     "project": "*", "step": "*",
//!     "source_dir": "master", "dest_dir": "media",
//!     "rules": [{
//!       "collection": "*", "media_type": "*", "resize_to": 1500,
//!       "watermarks": [{ "text": "Goobi.io", "location": "southeast" }]
//!     }]
//!   }]
//! }
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Wildcard accepted by section and rule matchers
pub const WILDCARD: &str = "*";

/// Configuration for the resize-and-watermark step
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GraphicsMagick binary
    pub gm_path: PathBuf,
    /// exiftool binary
    pub exiftool_path: PathBuf,
    /// ImageMagick convert binary, used for text watermarks
    pub convert_path: PathBuf,
    /// Directory for temporary watermark rasters (None = OS temp dir)
    pub temp_dir: Option<PathBuf>,
    /// Timeout applied to every external call (None = wait forever)
    pub command_timeout_secs: Option<u64>,
    /// Per project/step settings in declaration order
    pub sections: Vec<StepSection>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gm_path: PathBuf::from("/usr/bin/gm"),
            exiftool_path: PathBuf::from("/usr/bin/exiftool"),
            convert_path: PathBuf::from("/usr/bin/convert"),
            temp_dir: None,
            command_timeout_secs: None,
            sections: Vec::new(),
        }
    }
}

/// Settings for one project/step combination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepSection {
    pub project: String,
    pub step: String,
    /// Folder name of the source images, resolved by the host
    #[serde(default = "default_folder")]
    pub source_dir: String,
    /// Folder name of the output images, resolved by the host
    #[serde(default = "default_folder")]
    pub dest_dir: String,
    #[serde(default)]
    pub rules: Vec<ImageRule>,
}

/// One entry of the rule set, matched against collection and media type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageRule {
    #[serde(default)]
    pub collection: String,
    #[serde(default)]
    pub media_type: String,
    /// Maximum edge length in pixels, 0 = unset
    #[serde(default)]
    pub resize_to: u32,
    #[serde(default)]
    pub watermarks: Vec<WatermarkEntry>,
}

/// Raw watermark settings as written in the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatermarkEntry {
    #[serde(default)]
    pub image: Option<PathBuf>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default = "default_font")]
    pub font: String,
    #[serde(default = "default_box_size")]
    pub box_size: String,
    #[serde(default = "default_shade_size")]
    pub shade_size: String,
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default = "default_distance")]
    pub x_distance: u32,
    #[serde(default = "default_distance")]
    pub y_distance: u32,
}

impl WatermarkEntry {
    /// Image watermark with default placement
    pub fn image(path: impl Into<PathBuf>) -> Self {
        Self {
            image: Some(path.into()),
            ..Self::default()
        }
    }

    /// Text watermark with default font, box, shade and placement
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

impl Default for WatermarkEntry {
    fn default() -> Self {
        Self {
            image: None,
            text: None,
            font: default_font(),
            box_size: default_box_size(),
            shade_size: default_shade_size(),
            location: default_location(),
            x_distance: default_distance(),
            y_distance: default_distance(),
        }
    }
}

fn default_folder() -> String {
    "media".to_string()
}

fn default_font() -> String {
    "Open-Sans".to_string()
}

fn default_box_size() -> String {
    "450x200".to_string()
}

fn default_shade_size() -> String {
    "240x40".to_string()
}

fn default_location() -> String {
    "southeast".to_string()
}

fn default_distance() -> u32 {
    100
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        for (name, path) in [
            ("gm_path", &self.gm_path),
            ("exiftool_path", &self.exiftool_path),
            ("convert_path", &self.convert_path),
        ] {
            if path.as_os_str().is_empty() {
                return Err(anyhow::anyhow!("{} must not be empty", name));
            }
        }

        if self.command_timeout_secs == Some(0) {
            return Err(anyhow::anyhow!("Command timeout must be greater than 0 seconds"));
        }

        for section in &self.sections {
            for rule in &section.rules {
                for entry in &rule.watermarks {
                    match (&entry.image, &entry.text) {
                        (None, None) => {
                            return Err(anyhow::anyhow!(
                                "Watermark in section {}/{} (collection '{}', media type '{}') has neither image nor text",
                                section.project,
                                section.step,
                                rule.collection,
                                rule.media_type
                            ));
                        }
                        (Some(image), Some(_)) => {
                            warn!(
                                "Watermark has both image and text, using image {}",
                                image.display()
                            );
                        }
                        _ => {}
                    }
                }
            }
        }

        Ok(())
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    /// Pick the section for a project and step, falling back through the wildcard tiers
    pub fn section_for(&self, project: &str, step: &str) -> Option<&StepSection> {
        let tiers = [
            (project, step),
            (WILDCARD, step),
            (project, WILDCARD),
            (WILDCARD, WILDCARD),
        ];
        tiers.iter().find_map(|(p, s)| {
            self.sections
                .iter()
                .find(|section| section.project == *p && section.step == *s)
        })
    }

    /// Directory for temporary rasters
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}
