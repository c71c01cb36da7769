//! Result types returned by the document operations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// File formats the library recognises from magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileType {
    Pdf,
    Png,
    Jpeg,
    Gif,
    Tiff,
    Bmp,
}

impl FileType {
    /// Upper-case tag as reported to callers (`"PDF"`, `"PNG"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            FileType::Pdf => "PDF",
            FileType::Png => "PNG",
            FileType::Jpeg => "JPEG",
            FileType::Gif => "GIF",
            FileType::Tiff => "TIFF",
            FileType::Bmp => "BMP",
        }
    }

    /// File extension used for workspace files. ImageMagick picks its
    /// decoder from it, so it must match the content.
    pub fn extension(self) -> &'static str {
        match self {
            FileType::Pdf => "pdf",
            FileType::Png => "png",
            FileType::Jpeg => "jpg",
            FileType::Gif => "gif",
            FileType::Tiff => "tiff",
            FileType::Bmp => "bmp",
        }
    }

    pub fn is_raster(self) -> bool {
        !matches!(self, FileType::Pdf)
    }

    /// Map an identify `%m` magick name to a file type.
    pub fn from_magick(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "PDF" => Some(FileType::Pdf),
            "PNG" | "PNG8" | "PNG24" | "PNG32" => Some(FileType::Png),
            "JPEG" | "JPG" => Some(FileType::Jpeg),
            "GIF" | "GIF87" => Some(FileType::Gif),
            "TIFF" | "TIF" | "TIFF64" => Some(FileType::Tiff),
            "BMP" | "BMP2" | "BMP3" => Some(FileType::Bmp),
            _ => None,
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Basic facts about a document or image.
///
/// `width` and `length` are inches for PDFs (first page, points / 72) and
/// pixels for raster images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub file_type: FileType,
    pub width: f64,
    pub length: f64,
    pub num_pages: usize,
}
