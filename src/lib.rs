//! # massage
//!
//! Document utilities built on pdftk and ImageMagick/GraphicsMagick.
//!
//! The library does no PDF parsing or rasterisation of its own. Each
//! operation writes its input into a private temp directory, runs one
//! external tool, and reads the result back:
//!
//! | Operation | Tool |
//! |-----------|------|
//! | [`get_metadata`] | `pdftk dump_data` (PDF) / `identify` (images) |
//! | [`validate_url`], [`get_buffer`] | reqwest |
//! | [`merge`], [`merge_all`] | `pdftk cat` |
//! | [`rotate_pdf`] | `pdftk cat 1-end<dir>` |
//! | [`burst_pdf`] | `pdftk burst` |
//! | [`image_to_pdf`], [`png_to_pdf`] | `convert -density` |
//! | [`generate_thumbnail`] | `convert -resize WxH!` |
//!
//! Inputs are a [`Source`]: raw bytes or an HTTP/HTTPS URL that is
//! downloaded first. Every async function has a blocking twin in
//! [`blocking`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use massage::{get_metadata, rotate_pdf, MassageConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MassageConfig::default();
//!     let pdf = std::fs::read("4x6.pdf")?;
//!     let rotated = rotate_pdf(pdf, 90, &config).await?;
//!     let meta = get_metadata(rotated, &config).await?;
//!     println!("{} {}x{} in, {} page(s)", meta.file_type, meta.width, meta.length, meta.num_pages);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `massage` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod blocking;
pub mod config;
pub mod error;
pub mod ops;
pub mod output;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{Geometry, ImageBackend, MassageConfig, MassageConfigBuilder, Rotation};
pub use error::{MassageError, Result};
pub use ops::{
    burst_pdf, check_tools, generate_thumbnail, get_buffer, get_metadata, image_to_pdf, merge,
    merge_all, png_to_pdf, rotate_pdf, validate_url, ToolReport, ToolStatus,
};
pub use output::{FileMetadata, FileType};
pub use pipeline::input::Source;
