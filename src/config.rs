//! Configuration types for document operations.
//!
//! Every operation takes a [`MassageConfig`]. It says which external
//! binaries to run and how long to wait for them and for downloads.
//! Build one with [`MassageConfig::builder()`] or use
//! [`MassageConfig::default()`], which finds `pdftk` and ImageMagick on PATH.

use crate::error::MassageError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Configuration shared by all operations.
///
/// # Example
/// ```rust
/// use massage::{ImageBackend, MassageConfig};
///
/// let config = MassageConfig::builder()
///     .image_backend(ImageBackend::GraphicsMagick)
///     .download_timeout_secs(10)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MassageConfig {
    /// pdftk binary. Default: `"pdftk"` (resolved via PATH).
    pub pdftk_path: PathBuf,

    /// Which image toolkit drives identify/convert. Default: ImageMagick.
    pub image_backend: ImageBackend,

    /// Override for the image toolkit binary.
    ///
    /// For ImageMagick 7 this replaces `magick`, for GraphicsMagick it
    /// replaces `gm`. With legacy ImageMagick it is the directory holding
    /// `convert` and `identify`.
    pub image_tool_path: Option<PathBuf>,

    /// Use the legacy ImageMagick 6 `convert`/`identify` binaries instead of
    /// `magick convert`/`magick identify`. Default: true, since IM6 is what
    /// most distributions still ship.
    pub legacy_imagemagick: bool,

    /// Download timeout for URL inputs in seconds. Default: 30.
    pub download_timeout_secs: u64,

    /// Largest response body accepted for URL inputs. Default: 50 MiB.
    pub max_download_bytes: u64,

    /// Per-subprocess timeout in seconds. Default: 120.
    pub tool_timeout_secs: u64,

    /// Rasterisation density for thumbnails of vector input. Default: 150.
    pub thumbnail_density: u32,

    /// Parent directory for temporary workspaces. `None` uses the system temp dir.
    pub temp_dir: Option<PathBuf>,
}

impl Default for MassageConfig {
    fn default() -> Self {
        Self {
            pdftk_path: PathBuf::from("pdftk"),
            image_backend: ImageBackend::default(),
            image_tool_path: None,
            legacy_imagemagick: true,
            download_timeout_secs: 30,
            max_download_bytes: 50 * 1024 * 1024,
            tool_timeout_secs: 120,
            thumbnail_density: 150,
            temp_dir: None,
        }
    }
}

impl MassageConfig {
    /// Create a new builder for `MassageConfig`.
    pub fn builder() -> MassageConfigBuilder {
        MassageConfigBuilder {
            config: Self::default(),
        }
    }

    /// Program and leading arguments for an image-toolkit subcommand.
    ///
    /// `ImageMagick` (legacy) → `convert ...` / `identify ...`
    /// `ImageMagick` (v7)     → `magick convert ...`
    /// `GraphicsMagick`       → `gm convert ...`
    pub fn image_command(&self, sub: ImageCommand) -> (PathBuf, Vec<String>) {
        let name = sub.as_str();
        match self.image_backend {
            ImageBackend::ImageMagick if self.legacy_imagemagick => {
                let program = match &self.image_tool_path {
                    Some(dir) => dir.join(name),
                    None => PathBuf::from(name),
                };
                (program, Vec::new())
            }
            ImageBackend::ImageMagick => {
                let program = self
                    .image_tool_path
                    .clone()
                    .unwrap_or_else(|| PathBuf::from("magick"));
                (program, vec![name.to_string()])
            }
            ImageBackend::GraphicsMagick => {
                let program = self
                    .image_tool_path
                    .clone()
                    .unwrap_or_else(|| PathBuf::from("gm"));
                (program, vec![name.to_string()])
            }
        }
    }
}

/// Builder for [`MassageConfig`].
#[derive(Debug)]
pub struct MassageConfigBuilder {
    config: MassageConfig,
}

impl MassageConfigBuilder {
    pub fn pdftk_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdftk_path = path.into();
        self
    }

    pub fn image_backend(mut self, backend: ImageBackend) -> Self {
        self.config.image_backend = backend;
        self
    }

    pub fn image_tool_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.image_tool_path = Some(path.into());
        self
    }

    pub fn legacy_imagemagick(mut self, v: bool) -> Self {
        self.config.legacy_imagemagick = v;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn max_download_bytes(mut self, bytes: u64) -> Self {
        self.config.max_download_bytes = bytes;
        self
    }

    pub fn tool_timeout_secs(mut self, secs: u64) -> Self {
        self.config.tool_timeout_secs = secs;
        self
    }

    pub fn thumbnail_density(mut self, dpi: u32) -> Self {
        self.config.thumbnail_density = dpi.clamp(36, 600);
        self
    }

    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.temp_dir = Some(dir.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<MassageConfig, MassageError> {
        let c = &self.config;
        if c.download_timeout_secs == 0 {
            return Err(MassageError::InvalidConfig(
                "Download timeout must be ≥ 1s".into(),
            ));
        }
        if c.tool_timeout_secs == 0 {
            return Err(MassageError::InvalidConfig(
                "Tool timeout must be ≥ 1s".into(),
            ));
        }
        if c.max_download_bytes == 0 {
            return Err(MassageError::InvalidConfig(
                "Maximum download size must be > 0".into(),
            ));
        }
        if let Some(ref dir) = c.temp_dir {
            if !dir.is_dir() {
                return Err(MassageError::InvalidConfig(format!(
                    "Temp directory '{}' does not exist",
                    dir.display()
                )));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Image toolkit used for identify/convert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageBackend {
    /// ImageMagick (default).
    #[default]
    ImageMagick,
    /// GraphicsMagick, invoked through the `gm` multiplexer.
    GraphicsMagick,
}

impl FromStr for ImageBackend {
    type Err = MassageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "imagemagick" | "im" | "magick" => Ok(Self::ImageMagick),
            "graphicsmagick" | "gm" => Ok(Self::GraphicsMagick),
            other => Err(MassageError::InvalidConfig(format!(
                "Unknown image backend '{other}' (expected imagemagick or graphicsmagick)"
            ))),
        }
    }
}

/// Image-toolkit subcommands this crate runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageCommand {
    Identify,
    Convert,
}

impl ImageCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageCommand::Identify => "identify",
            ImageCommand::Convert => "convert",
        }
    }
}

/// A PDF rotation, clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rotation {
    /// No-op (any multiple of 360).
    None,
    /// 90° clockwise.
    Quarter,
    /// 180°.
    Half,
    /// 270° clockwise (90° counter-clockwise).
    ThreeQuarter,
}

impl Rotation {
    /// Parse integer degrees. Negative values rotate counter-clockwise.
    pub fn from_degrees(degrees: i32) -> Result<Self, MassageError> {
        if degrees % 90 != 0 {
            return Err(MassageError::InvalidRotation { degrees });
        }
        Ok(match degrees.rem_euclid(360) {
            0 => Rotation::None,
            90 => Rotation::Quarter,
            180 => Rotation::Half,
            _ => Rotation::ThreeQuarter,
        })
    }

    pub fn degrees(self) -> u32 {
        match self {
            Rotation::None => 0,
            Rotation::Quarter => 90,
            Rotation::Half => 180,
            Rotation::ThreeQuarter => 270,
        }
    }

    /// pdftk's relative page-rotation keyword, if any rotation is needed.
    pub fn pdftk_keyword(self) -> Option<&'static str> {
        match self {
            Rotation::None => None,
            Rotation::Quarter => Some("right"),
            Rotation::Half => Some("down"),
            Rotation::ThreeQuarter => Some("left"),
        }
    }
}

impl TryFrom<i32> for Rotation {
    type Error = MassageError;

    fn try_from(degrees: i32) -> Result<Self, Self::Error> {
        Self::from_degrees(degrees)
    }
}

/// Pixel dimensions for a thumbnail, parsed from `"WIDTHxHEIGHT"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    pub fn new(width: u32, height: u32) -> Result<Self, MassageError> {
        if width == 0 || height == 0 {
            return Err(MassageError::InvalidGeometry {
                input: format!("{width}x{height}"),
            });
        }
        Ok(Self { width, height })
    }
}

impl FromStr for Geometry {
    type Err = MassageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MassageError::InvalidGeometry {
            input: s.to_string(),
        };
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(invalid)?;
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;
        Geometry::new(width, height).map_err(|_| invalid())
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
