//! Document operation entry points.
//!
//! Every operation follows the same shape: resolve the [`Source`] to bytes,
//! sniff the file type, copy the bytes into a fresh [`Workspace`], run one
//! external tool, read the result back. Nothing is shared between calls, so
//! operations can be run concurrently from any number of tasks.

use crate::config::{Geometry, MassageConfig, Rotation};
use crate::error::{MassageError, Result};
use crate::output::{FileMetadata, FileType};
use crate::pipeline::input::{self, Source};
use crate::pipeline::tool::{self, Workspace};
use crate::pipeline::{detect, magick, pdftk};
use reqwest::Url;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

const OUTPUT_PDF: &str = "output.pdf";
const OUTPUT_PNG: &str = "output.png";

fn workspace(config: &MassageConfig) -> Result<Workspace> {
    Workspace::new(config.temp_dir.as_deref())
}

/// Read the file type, size and page count of a document or image.
///
/// PDFs report their first page in inches; raster images report pixels.
///
/// # Errors
/// - [`MassageError::EmptyInput`] / [`MassageError::UnrecognizedFile`] for
///   buffers that are not a known file
/// - [`MassageError::UnsupportedFileType`] for e.g. Word documents
/// - tool errors if pdftk or identify reject the file
pub async fn get_metadata(
    source: impl Into<Source>,
    config: &MassageConfig,
) -> Result<FileMetadata> {
    let bytes = input::resolve(source.into(), config).await?;
    let file_type = detect::detect(&bytes)?;
    debug!("Detected {} ({} bytes)", file_type, bytes.len());

    let ws = workspace(config)?;
    let name = magick::input_name("input", file_type);
    ws.write(&name, &bytes).await?;

    let meta = if file_type == FileType::Pdf {
        let info = pdftk::info(config, &ws, &name).await?;
        let (width, length) = info
            .size_inches()
            .ok_or_else(|| MassageError::UnexpectedOutput {
                tool: "pdftk".into(),
                detail: "dump_data has no page media information".into(),
            })?;
        FileMetadata {
            file_type,
            width,
            length,
            num_pages: info.num_pages,
        }
    } else {
        let info = magick::identify(config, &ws, &name).await?;
        FileMetadata {
            file_type: info.file_type,
            width: f64::from(info.width),
            length: f64::from(info.height),
            num_pages: info.frames,
        }
    };

    info!(
        "Metadata: {} {}x{} {} page(s)",
        meta.file_type, meta.width, meta.length, meta.num_pages
    );
    Ok(meta)
}

/// Check that `input` is an absolute HTTP or HTTPS URL.
pub fn validate_url(input: &str) -> Result<Url> {
    input::validate_url(input)
}

/// Return buffer sources unchanged and download URL sources.
pub async fn get_buffer(source: impl Into<Source>, config: &MassageConfig) -> Result<Vec<u8>> {
    input::resolve(source.into(), config).await
}

/// Merge two PDFs, `first` followed by `second`.
pub async fn merge(
    first: impl Into<Source>,
    second: impl Into<Source>,
    config: &MassageConfig,
) -> Result<Vec<u8>> {
    merge_all([first.into(), second.into()], config).await
}

/// Merge any number of PDFs in order.
pub async fn merge_all<I, S>(sources: I, config: &MassageConfig) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = S>,
    S: Into<Source>,
{
    let start = Instant::now();
    let ws = workspace(config)?;
    let mut names = Vec::new();

    for (i, source) in sources.into_iter().enumerate() {
        let bytes = input::resolve(source.into(), config).await?;
        detect::require_pdf(&bytes)?;
        let name = format!("input_{i:04}.pdf");
        ws.write(&name, &bytes).await?;
        names.push(name);
    }
    if names.is_empty() {
        return Err(MassageError::NoInputs);
    }

    pdftk::cat(config, &ws, &names, OUTPUT_PDF).await?;
    let merged = ws.read(OUTPUT_PDF).await?;
    info!(
        "Merged {} PDFs → {} bytes in {}ms",
        names.len(),
        merged.len(),
        start.elapsed().as_millis()
    );
    Ok(merged)
}

/// Rotate every page of a PDF clockwise by `degrees`.
///
/// `degrees` must be a multiple of 90; negative values rotate
/// counter-clockwise. Multiples of 360 return the input unchanged.
pub async fn rotate_pdf(
    source: impl Into<Source>,
    degrees: i32,
    config: &MassageConfig,
) -> Result<Vec<u8>> {
    let rotation = Rotation::from_degrees(degrees)?;
    let bytes = input::resolve(source.into(), config).await?;
    detect::require_pdf(&bytes)?;

    if rotation == Rotation::None {
        debug!("Rotation by {}° is a no-op", degrees);
        return Ok(bytes);
    }

    let ws = workspace(config)?;
    ws.write("input.pdf", &bytes).await?;
    pdftk::rotate(config, &ws, "input.pdf", rotation, OUTPUT_PDF).await?;
    info!("Rotated PDF by {}°", rotation.degrees());
    ws.read(OUTPUT_PDF).await
}

/// Split a PDF into single-page PDFs, in page order.
pub async fn burst_pdf(source: impl Into<Source>, config: &MassageConfig) -> Result<Vec<Vec<u8>>> {
    let bytes = input::resolve(source.into(), config).await?;
    detect::require_pdf(&bytes)?;

    let ws = workspace(config)?;
    ws.write("input.pdf", &bytes).await?;
    let pages = pdftk::burst(config, &ws, "input.pdf").await?;
    if pages.is_empty() {
        return Err(MassageError::UnexpectedOutput {
            tool: "pdftk".into(),
            detail: "burst produced no pages".into(),
        });
    }
    info!("Burst PDF into {} pages", pages.len());
    Ok(pages)
}

/// Convert a raster image to a PDF sized at `dpi` pixels per inch.
///
/// A 1200×1800 image at 300 DPI becomes a 4×6 inch page.
pub async fn image_to_pdf(
    source: impl Into<Source>,
    dpi: u32,
    config: &MassageConfig,
) -> Result<Vec<u8>> {
    if dpi == 0 {
        return Err(MassageError::InvalidDpi { dpi });
    }
    let bytes = input::resolve(source.into(), config).await?;
    let file_type = detect::require_raster(&bytes)?;
    raster_to_pdf(&bytes, file_type, dpi, config).await
}

/// Like [`image_to_pdf`], but only accepts PNG input.
pub async fn png_to_pdf(
    source: impl Into<Source>,
    dpi: u32,
    config: &MassageConfig,
) -> Result<Vec<u8>> {
    if dpi == 0 {
        return Err(MassageError::InvalidDpi { dpi });
    }
    let bytes = input::resolve(source.into(), config).await?;
    match detect::detect(&bytes)? {
        FileType::Png => raster_to_pdf(&bytes, FileType::Png, dpi, config).await,
        other => Err(MassageError::unsupported(other, "PNG")),
    }
}

async fn raster_to_pdf(
    bytes: &[u8],
    file_type: FileType,
    dpi: u32,
    config: &MassageConfig,
) -> Result<Vec<u8>> {
    let ws = workspace(config)?;
    let name = magick::input_name("input", file_type);
    ws.write(&name, bytes).await?;
    magick::image_to_pdf(config, &ws, &name, dpi, OUTPUT_PDF).await?;
    info!("Converted {} to PDF at {} DPI", file_type, dpi);
    ws.read(OUTPUT_PDF).await
}

/// Render the first page or frame of a PDF or image as a PNG of exactly
/// `geometry` pixels.
pub async fn generate_thumbnail(
    source: impl Into<Source>,
    geometry: Geometry,
    config: &MassageConfig,
) -> Result<Vec<u8>> {
    let bytes = input::resolve(source.into(), config).await?;
    let file_type = detect::detect(&bytes)?;

    let ws = workspace(config)?;
    let name = magick::input_name("input", file_type);
    ws.write(&name, &bytes).await?;
    magick::thumbnail(config, &ws, &name, geometry, OUTPUT_PNG).await?;
    info!("Generated {} thumbnail from {}", geometry, file_type);
    ws.read(OUTPUT_PNG).await
}

/// A configured binary and whether it could be launched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolStatus {
    pub path: PathBuf,
    pub available: bool,
}

impl ToolStatus {
    async fn probe(path: PathBuf) -> Self {
        let available = tool::is_available(&path).await;
        Self { path, available }
    }
}

/// Whether each external tool can be launched.
#[derive(Debug, Clone, Serialize)]
pub struct ToolReport {
    pub pdftk: ToolStatus,
    pub identify: ToolStatus,
    pub convert: ToolStatus,
}

impl ToolReport {
    pub fn all_available(&self) -> bool {
        self.pdftk.available && self.identify.available && self.convert.available
    }
}

/// Probe the configured binaries.
pub async fn check_tools(config: &MassageConfig) -> ToolReport {
    use crate::config::ImageCommand;

    let (identify, _) = config.image_command(ImageCommand::Identify);
    let (convert, _) = config.image_command(ImageCommand::Convert);

    ToolReport {
        pdftk: ToolStatus::probe(config.pdftk_path.clone()).await,
        identify: ToolStatus::probe(identify).await,
        convert: ToolStatus::probe(convert).await,
    }
}
