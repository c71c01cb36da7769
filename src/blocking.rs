//! Blocking wrappers around the async operations.
//!
//! Each function spins up a current-thread tokio runtime for the duration of
//! the call. Do not call these from inside an async context; use the async
//! functions in [`crate::ops`] there instead.

use crate::config::{Geometry, MassageConfig};
use crate::error::{MassageError, Result};
use crate::ops;
use crate::output::FileMetadata;
use crate::pipeline::input::Source;
use std::future::Future;

fn block_on<T>(fut: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| MassageError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(fut)
}

/// Synchronous [`ops::get_metadata`].
pub fn get_metadata_sync(
    source: impl Into<Source>,
    config: &MassageConfig,
) -> Result<FileMetadata> {
    block_on(ops::get_metadata(source, config))
}

/// Synchronous [`ops::get_buffer`].
pub fn get_buffer_sync(source: impl Into<Source>, config: &MassageConfig) -> Result<Vec<u8>> {
    block_on(ops::get_buffer(source, config))
}

/// Synchronous [`ops::merge`].
pub fn merge_sync(
    first: impl Into<Source>,
    second: impl Into<Source>,
    config: &MassageConfig,
) -> Result<Vec<u8>> {
    block_on(ops::merge(first, second, config))
}

/// Synchronous [`ops::merge_all`].
pub fn merge_all_sync<I, S>(sources: I, config: &MassageConfig) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = S>,
    S: Into<Source>,
{
    block_on(ops::merge_all(sources, config))
}

/// Synchronous [`ops::rotate_pdf`].
pub fn rotate_pdf_sync(
    source: impl Into<Source>,
    degrees: i32,
    config: &MassageConfig,
) -> Result<Vec<u8>> {
    block_on(ops::rotate_pdf(source, degrees, config))
}

/// Synchronous [`ops::burst_pdf`].
pub fn burst_pdf_sync(source: impl Into<Source>, config: &MassageConfig) -> Result<Vec<Vec<u8>>> {
    block_on(ops::burst_pdf(source, config))
}

/// Synchronous [`ops::image_to_pdf`].
pub fn image_to_pdf_sync(
    source: impl Into<Source>,
    dpi: u32,
    config: &MassageConfig,
) -> Result<Vec<u8>> {
    block_on(ops::image_to_pdf(source, dpi, config))
}

/// Synchronous [`ops::png_to_pdf`].
pub fn png_to_pdf_sync(
    source: impl Into<Source>,
    dpi: u32,
    config: &MassageConfig,
) -> Result<Vec<u8>> {
    block_on(ops::png_to_pdf(source, dpi, config))
}

/// Synchronous [`ops::generate_thumbnail`].
pub fn generate_thumbnail_sync(
    source: impl Into<Source>,
    geometry: Geometry,
    config: &MassageConfig,
) -> Result<Vec<u8>> {
    block_on(ops::generate_thumbnail(source, geometry, config))
}
