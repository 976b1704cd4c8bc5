//! # External Command Builders
//!
//! Every external call the step makes, as a deterministic argument vector.
//!
//! | operation | executable | arguments |
//! |---|---|---|
//! | resize | `gm` | `convert -auto-orient <in> -resize <N>x<N>> <out>` |
//! | strip orientation | `exiftool` | `-Orientation= <out> -overwrite_original` |
//! | dimensions | `gm` | `identify -ping -format "%w %h" <path>` |
//! | text watermark | `convert` | `-size <box> -background none -font <font> -fill white -gravity center caption:<text> -shade <shade> <out>` |
//! | rescale | `gm` | `convert <in> -resize <P>% <out>` |
//! | composite | `gm` | `composite -dissolve 50% -geometry +<x>+<y> -gravity <loc> <wm> <canvas> <canvas>` |

use crate::args;
use crate::config::Config;
use crate::watermark::{WatermarkSource, WatermarkSpec};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Opacity used when blending the watermark into the canvas
pub const DISSOLVE_PERCENT: u32 = 50;

/// One external call: executable plus arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub executable: PathBuf,
    pub args: Vec<OsString>,
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.executable.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Resolved executable paths, with one builder per operation
#[derive(Debug, Clone)]
pub struct Toolset {
    gm: PathBuf,
    exiftool: PathBuf,
    convert: PathBuf,
}

impl Toolset {
    pub fn new(config: &Config) -> Self {
        Self {
            gm: config.gm_path.clone(),
            exiftool: config.exiftool_path.clone(),
            convert: config.convert_path.clone(),
        }
    }

    fn gm(&self, args: Vec<OsString>) -> Invocation {
        Invocation {
            executable: self.gm.clone(),
            args,
        }
    }

    /// Shrink-only resize that also applies the EXIF orientation to the pixels
    pub fn resize(&self, input: &Path, output: &Path, size: u32) -> Invocation {
        self.gm(args![
            "convert",
            "-auto-orient",
            input,
            "-resize",
            format!("{}x{}>", size, size),
            output,
        ])
    }

    /// Drop the orientation tag so viewers do not rotate a second time
    pub fn strip_orientation(&self, image: &Path) -> Invocation {
        Invocation {
            executable: self.exiftool.clone(),
            args: args!["-Orientation=", image, "-overwrite_original"],
        }
    }

    pub fn identify(&self, image: &Path) -> Invocation {
        self.gm(args!["identify", "-ping", "-format", "%w %h", image])
    }

    /// Render a caption to a transparent raster. Returns `None` for image watermarks.
    pub fn render_text(&self, spec: &WatermarkSpec, output: &Path) -> Option<Invocation> {
        let WatermarkSource::Text {
            text,
            font,
            box_size,
            shade_size,
        } = &spec.source
        else {
            return None;
        };
        Some(Invocation {
            executable: self.convert.clone(),
            args: args![
                "-size",
                box_size,
                "-background",
                "none",
                "-font",
                font,
                "-fill",
                "white",
                "-gravity",
                "center",
                format!("caption:{}", text),
                "-shade",
                shade_size,
                output,
            ],
        })
    }

    pub fn rescale(&self, input: &Path, percent: u32, output: &Path) -> Invocation {
        self.gm(args![
            "convert",
            input,
            "-resize",
            format!("{}%", percent),
            output,
        ])
    }

    /// Blend `watermark` into `canvas`, overwriting the canvas in place
    pub fn composite(&self, spec: &WatermarkSpec, watermark: &Path, canvas: &Path) -> Invocation {
        self.gm(args![
            "composite",
            "-dissolve",
            format!("{}%", DISSOLVE_PERCENT),
            "-geometry",
            format!("+{}+{}", spec.x_distance, spec.y_distance),
            "-gravity",
            spec.location,
            watermark,
            canvas,
            canvas,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WatermarkEntry;

    fn tools() -> Toolset {
        Toolset::new(&Config::default())
    }

    #[test]
    fn test_resize_args() {
        let inv = tools().resize(Path::new("/p/master/1.tif"), Path::new("/p/media/1.tif"), 1500);
        assert_eq!(inv.executable, PathBuf::from("/usr/bin/gm"));
        assert_eq!(
            inv.args,
            vec!["convert", "-auto-orient", "/p/master/1.tif", "-resize", "1500x1500>", "/p/media/1.tif"]
        );
    }

    #[test]
    fn test_strip_orientation_args() {
        let inv = tools().strip_orientation(Path::new("/p/media/1.tif"));
        assert_eq!(inv.executable, PathBuf::from("/usr/bin/exiftool"));
        assert_eq!(inv.args, vec!["-Orientation=", "/p/media/1.tif", "-overwrite_original"]);
    }

    #[test]
    fn test_identify_args() {
        let inv = tools().identify(Path::new("/p/media/1.tif"));
        assert_eq!(inv.args, vec!["identify", "-ping", "-format", "%w %h", "/p/media/1.tif"]);
    }

    #[test]
    fn test_render_text_args() {
        let spec = WatermarkSpec::from(&WatermarkEntry::text("Goobi.io"));
        let inv = tools().render_text(&spec, Path::new("/tmp/watermark_a.png")).unwrap();
        assert_eq!(inv.executable, PathBuf::from("/usr/bin/convert"));
        assert_eq!(
            inv.args,
            vec![
                "-size", "450x200", "-background", "none", "-font", "Open-Sans", "-fill", "white",
                "-gravity", "center", "caption:Goobi.io", "-shade", "240x40", "/tmp/watermark_a.png"
            ]
        );
    }

    #[test]
    fn test_render_text_skips_images() {
        let spec = WatermarkSpec::from(&WatermarkEntry::image("/wm/logo.png"));
        assert!(tools().render_text(&spec, Path::new("/tmp/x.png")).is_none());
    }

    #[test]
    fn test_rescale_args() {
        let inv = tools().rescale(Path::new("/wm/logo.png"), 40, Path::new("/tmp/logo_resized_a.png"));
        assert_eq!(inv.args, vec!["convert", "/wm/logo.png", "-resize", "40%", "/tmp/logo_resized_a.png"]);
    }

    #[test]
    fn test_composite_args() {
        let mut entry = WatermarkEntry::image("/wm/logo.png");
        entry.x_distance = 550;
        entry.y_distance = 400;
        let spec = WatermarkSpec::from(&entry);
        let inv = tools().composite(&spec, Path::new("/wm/logo.png"), Path::new("/p/media/1.tif"));
        assert_eq!(
            inv.args,
            vec![
                "composite", "-dissolve", "50%", "-geometry", "+550+400", "-gravity", "southeast",
                "/wm/logo.png", "/p/media/1.tif", "/p/media/1.tif"
            ]
        );
        assert!(inv.to_string().starts_with("/usr/bin/gm composite -dissolve 50%"));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_file_names_reach_the_tool_unchanged() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let input = Path::new(OsStr::from_bytes(b"/p/master/seite_\xe4.tif"));
        let output = Path::new(OsStr::from_bytes(b"/p/media/seite_\xe4.tif"));
        let inv = tools().resize(input, output, 1500);
        assert_eq!(inv.args[2].as_os_str(), input.as_os_str());
        assert_eq!(inv.args[5].as_os_str(), output.as_os_str());
    }
}
