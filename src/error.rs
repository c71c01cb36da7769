//! Error types for the massage library.
//!
//! Every operation is a one-shot call into an external tool, so a single
//! fatal error type is enough: [`MassageError`]. Variants are grouped by
//! where the failure happened (input, download, tool, configuration) so
//! callers that care can match on them, while callers that don't can just
//! print the message.

use std::path::PathBuf;
use thiserror::Error;

/// Shorthand for results returned by this crate.
pub type Result<T> = std::result::Result<T, MassageError>;

/// All errors returned by the massage library.
#[derive(Debug, Error)]
pub enum MassageError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The input bytes do not start with any known file signature.
    #[error("Unrecognized file contents ({len} bytes)\nFirst bytes: {magic:02x?}")]
    UnrecognizedFile { len: usize, magic: Vec<u8> },

    /// The input was recognised but the operation does not accept it.
    #[error("Unsupported file type '{found}': expected {expected}")]
    UnsupportedFileType { found: String, expected: String },

    /// The input buffer was empty.
    #[error("Input buffer is empty")]
    EmptyInput,

    /// The string is not an absolute HTTP/HTTPS URL.
    #[error("Invalid URL '{input}': {reason}")]
    InvalidUrl { input: String, reason: String },

    /// Rotation must be a multiple of 90 degrees.
    #[error("Invalid rotation {degrees}°: must be a multiple of 90")]
    InvalidRotation { degrees: i32 },

    /// Thumbnail geometry could not be parsed.
    #[error("Invalid geometry '{input}': expected WIDTHxHEIGHT, e.g. 200x300")]
    InvalidGeometry { input: String },

    /// DPI must be strictly positive.
    #[error("Invalid DPI {dpi}: must be greater than zero")]
    InvalidDpi { dpi: u32 },

    /// An operation that needs at least one document got none.
    #[error("No input documents given")]
    NoInputs,

    // ── Download errors ───────────────────────────────────────────────────
    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    /// Response body exceeded the configured size limit.
    #[error("Download of '{url}' exceeded the {limit} byte limit")]
    DownloadTooLarge { url: String, limit: u64 },

    // ── Tool errors ───────────────────────────────────────────────────────
    /// The external binary is not installed or not on PATH.
    #[error("'{tool}' was not found on PATH.\nInstall it or point the configuration at the binary.")]
    ToolNotFound { tool: String },

    /// The external binary exited with a non-zero status.
    #[error("'{tool}' failed (exit code {code}): {stderr}")]
    ToolFailed {
        tool: String,
        code: String,
        stderr: String,
    },

    /// The external binary ran longer than the configured timeout.
    #[error("'{tool}' timed out after {secs}s")]
    ToolTimeout { tool: String, secs: u64 },

    /// The tool ran but its output could not be understood.
    #[error("Unexpected output from '{tool}': {detail}")]
    UnexpectedOutput { tool: String, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Reading or writing a file in the temporary workspace failed.
    #[error("Workspace I/O failed for '{path}': {source}")]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MassageError {
    pub(crate) fn workspace(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Workspace {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn unsupported(found: impl ToString, expected: impl Into<String>) -> Self {
        Self::UnsupportedFileType {
            found: found.to_string(),
            expected: expected.into(),
        }
    }
}
