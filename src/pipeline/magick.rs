//! ImageMagick / GraphicsMagick invocations: identify, image→PDF, thumbnails.
//!
//! Both toolkits accept the same `identify -format` and `convert` options
//! used here, so the only backend difference is how the program is named
//! (see [`MassageConfig::image_command`]).

use crate::config::{Geometry, ImageCommand, MassageConfig};
use crate::error::MassageError;
use crate::output::FileType;
use crate::pipeline::tool::{ToolCommand, Workspace};
use once_cell::sync::Lazy;
use regex::Regex;

/// One line per frame: `<magick> <width> <height>`.
const IDENTIFY_FORMAT: &str = "%m %w %h\n";

static IDENTIFY_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([A-Za-z0-9]+)\s+(\d+)\s+(\d+)\s*$").unwrap());

/// Facts about a raster image taken from `identify`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub file_type: FileType,
    pub width: u32,
    pub height: u32,
    pub frames: usize,
}

fn command(config: &MassageConfig, sub: ImageCommand) -> ToolCommand {
    let (program, leading) = config.image_command(sub);
    ToolCommand::new(program, config.tool_timeout_secs).args(leading)
}

/// `identify -format "%m %w %h\n" <in>`
pub fn identify_command(config: &MassageConfig, ws: &Workspace, input: &str) -> ToolCommand {
    command(config, ImageCommand::Identify)
        .args(["-format", IDENTIFY_FORMAT])
        .arg(ws.path(input))
}

/// `convert <in> -units PixelsPerInch -density <dpi> pdf:<out>`
pub fn image_to_pdf_command(
    config: &MassageConfig,
    ws: &Workspace,
    input: &str,
    dpi: u32,
    output: &str,
) -> ToolCommand {
    command(config, ImageCommand::Convert)
        .arg(ws.path(input))
        .args(["-units", "PixelsPerInch", "-density"])
        .arg(dpi.to_string())
        .arg(prefixed("pdf", &ws.path(output)))
}

/// `convert -density <d> <in>[0] -background white -flatten -resize WxH! -strip png:<out>`
pub fn thumbnail_command(
    config: &MassageConfig,
    ws: &Workspace,
    input: &str,
    geometry: Geometry,
    output: &str,
) -> ToolCommand {
    let mut first_frame = ws.path(input).into_os_string();
    first_frame.push("[0]");

    command(config, ImageCommand::Convert)
        .args(["-density".to_string(), config.thumbnail_density.to_string()])
        .arg(first_frame)
        .args(["-background", "white", "-flatten"])
        .args(["-resize".to_string(), format!("{geometry}!")])
        .arg("-strip")
        .arg(prefixed("png", &ws.path(output)))
}

/// Identify a workspace file.
pub async fn identify(
    config: &MassageConfig,
    ws: &Workspace,
    input: &str,
) -> Result<ImageInfo, MassageError> {
    let stdout = identify_command(config, ws, input).run().await?;
    parse_identify(&String::from_utf8_lossy(&stdout))
}

/// Convert a raster image to a PDF whose page size is pixels / `dpi` inches.
pub async fn image_to_pdf(
    config: &MassageConfig,
    ws: &Workspace,
    input: &str,
    dpi: u32,
    output: &str,
) -> Result<(), MassageError> {
    image_to_pdf_command(config, ws, input, dpi, output)
        .run()
        .await?;
    Ok(())
}

/// Render the first page/frame of `input` to a PNG of exactly `geometry`.
pub async fn thumbnail(
    config: &MassageConfig,
    ws: &Workspace,
    input: &str,
    geometry: Geometry,
    output: &str,
) -> Result<(), MassageError> {
    thumbnail_command(config, ws, input, geometry, output)
        .run()
        .await?;
    Ok(())
}

/// `png:/path/out.png`: force the encoder regardless of extension.
fn prefixed(format: &str, path: &std::path::Path) -> std::ffi::OsString {
    let mut s = std::ffi::OsString::from(format!("{format}:"));
    s.push(path);
    s
}

/// Parse `identify -format "%m %w %h\n"` output.
pub fn parse_identify(text: &str) -> Result<ImageInfo, MassageError> {
    let unexpected = |detail: String| MassageError::UnexpectedOutput {
        tool: "identify".into(),
        detail,
    };

    let frames: Vec<_> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| {
            IDENTIFY_LINE
                .captures(l)
                .ok_or_else(|| unexpected(format!("unparseable line {l:?}")))
        })
        .collect::<Result<_, _>>()?;

    let first = frames
        .first()
        .ok_or_else(|| unexpected("no frames reported".into()))?;

    let magick = &first[1];
    let file_type = FileType::from_magick(magick)
        .ok_or_else(|| MassageError::unsupported(magick, "PDF or PNG/JPEG/GIF/TIFF/BMP"))?;
    let width = first[2]
        .parse()
        .map_err(|_| unexpected(format!("bad width {:?}", &first[2])))?;
    let height = first[3]
        .parse()
        .map_err(|_| unexpected(format!("bad height {:?}", &first[3])))?;

    Ok(ImageInfo {
        file_type,
        width,
        height,
        frames: frames.len(),
    })
}

/// Workspace file name for an input of the given type.
pub fn input_name(stem: &str, file_type: FileType) -> String {
    format!("{stem}.{}", file_type.extension())
}
