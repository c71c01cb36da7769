//! File-type detection from magic bytes.
//!
//! Sniffing the buffer before spawning anything gives callers a precise
//! error for garbage or office documents instead of whatever ImageMagick
//! happens to print. Raster formats are recognised by `image::guess_format`,
//! which only looks at the leading signature. PDFs are recognised by the
//! `%PDF-` header, which readers accept anywhere in the first 1024 bytes.
//! Image signatures win, so a PNG whose text chunk mentions `%PDF-` is
//! still a PNG.

use crate::error::MassageError;
use crate::output::FileType;
use image::ImageFormat;

const PDF_MAGIC: &[u8] = b"%PDF-";
const PDF_HEADER_WINDOW: usize = 1024;
const SUPPORTED: &str = "PDF or PNG/JPEG/GIF/TIFF/BMP";

/// Signatures of formats we recognise but never accept.
const KNOWN_UNSUPPORTED: &[(&[u8], &str)] = &[
    (b"PK\x03\x04", "ZIP/OOXML (docx, xlsx, pptx)"),
    (b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1", "OLE2 (doc, xls, ppt)"),
    (b"{\\rtf", "RTF"),
    (b"RIFF", "RIFF (webp, avi, wav)"),
];

/// Detect the file type of `bytes`.
pub fn detect(bytes: &[u8]) -> Result<FileType, MassageError> {
    if bytes.is_empty() {
        return Err(MassageError::EmptyInput);
    }

    let image_format = image::guess_format(bytes).ok();
    if let Some(file_type) = image_format.and_then(raster_type) {
        return Ok(file_type);
    }

    let window = &bytes[..bytes.len().min(PDF_HEADER_WINDOW)];
    if window.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC) {
        return Ok(FileType::Pdf);
    }

    if let Some(format) = image_format {
        return Err(MassageError::unsupported(format!("{format:?}"), SUPPORTED));
    }

    for (magic, name) in KNOWN_UNSUPPORTED {
        if bytes.starts_with(magic) {
            return Err(MassageError::unsupported(*name, SUPPORTED));
        }
    }

    Err(MassageError::UnrecognizedFile {
        len: bytes.len(),
        magic: bytes.iter().take(8).copied().collect(),
    })
}

fn raster_type(format: ImageFormat) -> Option<FileType> {
    match format {
        ImageFormat::Png => Some(FileType::Png),
        ImageFormat::Jpeg => Some(FileType::Jpeg),
        ImageFormat::Gif => Some(FileType::Gif),
        ImageFormat::Tiff => Some(FileType::Tiff),
        ImageFormat::Bmp => Some(FileType::Bmp),
        _ => None,
    }
}

/// Detect and require a PDF.
pub fn require_pdf(bytes: &[u8]) -> Result<(), MassageError> {
    match detect(bytes)? {
        FileType::Pdf => Ok(()),
        other => Err(MassageError::unsupported(other, "PDF")),
    }
}

/// Detect and require a raster image.
pub fn require_raster(bytes: &[u8]) -> Result<FileType, MassageError> {
    match detect(bytes)? {
        FileType::Pdf => Err(MassageError::unsupported(FileType::Pdf, "a raster image")),
        other => Ok(other),
    }
}
