//! Input resolution: turn a caller-supplied buffer or URL into bytes.
//!
//! Buffers pass through untouched. Strings must be absolute HTTP/HTTPS
//! URLs and are downloaded with a timeout and a size cap; a relative path
//! such as `test.pdf` or a bare host such as `www.example.com` is rejected
//! before any network traffic happens.

use crate::config::MassageConfig;
use crate::error::MassageError;
use reqwest::Url;
use std::time::Duration;
use tracing::{debug, info};

/// Input to every operation: raw file bytes or a URL to fetch them from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Bytes(Vec<u8>),
    Url(String),
}

impl From<Vec<u8>> for Source {
    fn from(bytes: Vec<u8>) -> Self {
        Source::Bytes(bytes)
    }
}

impl From<&[u8]> for Source {
    fn from(bytes: &[u8]) -> Self {
        Source::Bytes(bytes.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Source {
    fn from(bytes: &[u8; N]) -> Self {
        Source::Bytes(bytes.to_vec())
    }
}

impl From<&Vec<u8>> for Source {
    fn from(bytes: &Vec<u8>) -> Self {
        Source::Bytes(bytes.clone())
    }
}

impl From<String> for Source {
    fn from(url: String) -> Self {
        Source::Url(url)
    }
}

impl From<&str> for Source {
    fn from(url: &str) -> Self {
        Source::Url(url.to_string())
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Validate that `input` is an absolute HTTP or HTTPS URL with a host.
pub fn validate_url(input: &str) -> Result<Url, MassageError> {
    let invalid = |reason: &str| MassageError::InvalidUrl {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(input.trim()).map_err(|e| invalid(&e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(&format!("unsupported scheme '{other}'"))),
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host"));
    }
    Ok(url)
}

/// Resolve a source to bytes, downloading URLs.
pub async fn resolve(source: Source, config: &MassageConfig) -> Result<Vec<u8>, MassageError> {
    match source {
        Source::Bytes(bytes) => {
            debug!("Using in-memory buffer ({} bytes)", bytes.len());
            Ok(bytes)
        }
        Source::Url(url) => {
            let url = validate_url(&url)?;
            download(url, config).await
        }
    }
}

/// Download a URL into memory, enforcing the configured timeout and size cap.
async fn download(url: Url, config: &MassageConfig) -> Result<Vec<u8>, MassageError> {
    info!("Downloading: {}", url);
    let url_str = url.to_string();
    let timeout_secs = config.download_timeout_secs;
    let limit = config.max_download_bytes;

    let failed = |reason: String| MassageError::DownloadFailed {
        url: url_str.clone(),
        reason,
    };
    let map_reqwest = |e: reqwest::Error| {
        if e.is_timeout() {
            MassageError::DownloadTimeout {
                url: url_str.clone(),
                secs: timeout_secs,
            }
        } else {
            failed(e.to_string())
        }
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| failed(e.to_string()))?;

    let mut response = client.get(url.clone()).send().await.map_err(map_reqwest)?;

    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status())));
    }

    if let Some(len) = response.content_length() {
        if len > limit {
            return Err(MassageError::DownloadTooLarge {
                url: url_str.clone(),
                limit,
            });
        }
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(map_reqwest)? {
        if body.len() as u64 + chunk.len() as u64 > limit {
            return Err(MassageError::DownloadTooLarge {
                url: url_str.clone(),
                limit,
            });
        }
        body.extend_from_slice(&chunk);
    }

    info!("Downloaded {} bytes from {}", body.len(), url);
    Ok(body)
}
