//! pdftk invocations: page info, merge, rotate and burst.
//!
//! All PDF page manipulation is delegated to pdftk. Page geometry comes from
//! `dump_data`, which reports each page's media box and rotation without
//! rasterising anything.

use crate::config::{MassageConfig, Rotation};
use crate::error::MassageError;
use crate::pipeline::tool::{ToolCommand, Workspace};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Points per inch in PDF user space.
pub const POINTS_PER_INCH: f64 = 72.0;

static NUMBER_OF_PAGES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^NumberOfPages:\s*(\d+)\s*$").unwrap());

/// Prefix for burst output files; pdftk expands the printf pattern.
const BURST_PREFIX: &str = "page_";

/// Facts about a PDF taken from `pdftk dump_data`.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfInfo {
    pub num_pages: usize,
    /// Displayed size of the first page in points, rotation applied.
    pub first_page: Option<(f64, f64)>,
}

impl PdfInfo {
    /// First-page size in inches, rounded to two decimals.
    pub fn size_inches(&self) -> Option<(f64, f64)> {
        self.first_page.map(|(w, h)| (to_inches(w), to_inches(h)))
    }
}

fn to_inches(points: f64) -> f64 {
    (points / POINTS_PER_INCH * 100.0).round() / 100.0
}

fn pdftk(config: &MassageConfig, ws: &Workspace) -> ToolCommand {
    ToolCommand::new(&config.pdftk_path, config.tool_timeout_secs).current_dir(ws.root())
}

/// `pdftk <in> dump_data`
pub fn info_command(config: &MassageConfig, ws: &Workspace, input: &str) -> ToolCommand {
    pdftk(config, ws).arg(ws.path(input)).arg("dump_data")
}

/// `pdftk <in...> cat output <out>`
pub fn cat_command(
    config: &MassageConfig,
    ws: &Workspace,
    inputs: &[String],
    output: &str,
) -> ToolCommand {
    pdftk(config, ws)
        .args(inputs.iter().map(|n| ws.path(n)))
        .args(["cat", "output"])
        .arg(ws.path(output))
}

/// `pdftk <in> cat 1-end<dir> output <out>`
pub fn rotate_command(
    config: &MassageConfig,
    ws: &Workspace,
    input: &str,
    rotation: Rotation,
    output: &str,
) -> Result<ToolCommand, MassageError> {
    let Some(keyword) = rotation.pdftk_keyword() else {
        return Err(MassageError::Internal(
            "pdftk rotate called without a rotation".into(),
        ));
    };
    Ok(pdftk(config, ws)
        .arg(ws.path(input))
        .args(["cat".to_string(), format!("1-end{keyword}"), "output".to_string()])
        .arg(ws.path(output)))
}

/// `pdftk <in> burst output page_%06d.pdf`, run from the workspace so
/// `doc_data.txt` lands there too.
pub fn burst_command(config: &MassageConfig, ws: &Workspace, input: &str) -> ToolCommand {
    pdftk(config, ws)
        .arg(ws.path(input))
        .args(["burst", "output"])
        .arg(ws.path(&format!("{BURST_PREFIX}%06d.pdf")))
}

/// Run `dump_data` on a workspace file and parse the result.
pub async fn info(
    config: &MassageConfig,
    ws: &Workspace,
    input: &str,
) -> Result<PdfInfo, MassageError> {
    let stdout = info_command(config, ws, input).run().await?;
    parse_dump_data(&String::from_utf8_lossy(&stdout))
}

/// Concatenate workspace files in order into `output`.
pub async fn cat(
    config: &MassageConfig,
    ws: &Workspace,
    inputs: &[String],
    output: &str,
) -> Result<(), MassageError> {
    debug!("pdftk cat {} inputs", inputs.len());
    cat_command(config, ws, inputs, output).run().await?;
    Ok(())
}

/// Rotate every page of `input` into `output`.
pub async fn rotate(
    config: &MassageConfig,
    ws: &Workspace,
    input: &str,
    rotation: Rotation,
    output: &str,
) -> Result<(), MassageError> {
    rotate_command(config, ws, input, rotation, output)?
        .run()
        .await?;
    Ok(())
}

/// Split `input` into one file per page; returns the pages in order.
pub async fn burst(
    config: &MassageConfig,
    ws: &Workspace,
    input: &str,
) -> Result<Vec<Vec<u8>>, MassageError> {
    burst_command(config, ws, input).run().await?;
    ws.read_matching(BURST_PREFIX, ".pdf").await
}

/// Parse the subset of `dump_data` output we need.
pub fn parse_dump_data(text: &str) -> Result<PdfInfo, MassageError> {
    let num_pages = NUMBER_OF_PAGES
        .captures(text)
        .and_then(|c| c[1].parse::<usize>().ok())
        .ok_or_else(|| MassageError::UnexpectedOutput {
            tool: "pdftk".into(),
            detail: "dump_data has no NumberOfPages".into(),
        })?;

    Ok(PdfInfo {
        num_pages,
        first_page: first_page_media(text),
    })
}

/// Size of the first `PageMediaBegin` block, with its rotation applied.
fn first_page_media(text: &str) -> Option<(f64, f64)> {
    let block: Vec<&str> = text
        .lines()
        .skip_while(|l| l.trim() != "PageMediaBegin")
        .skip(1)
        .take_while(|l| l.trim() != "PageMediaBegin")
        .collect();
    if block.is_empty() {
        return None;
    }

    let field = |key: &str| {
        block
            .iter()
            .find_map(|l| l.strip_prefix(key).and_then(|r| r.strip_prefix(':')))
            .map(str::trim)
    };

    // Rect is plain floats; Dimensions may carry thousands separators.
    let (w, h) = field("PageMediaRect")
        .and_then(|r| {
            let v: Vec<f64> = r.split_whitespace().filter_map(|n| n.parse().ok()).collect();
            (v.len() == 4).then(|| ((v[2] - v[0]).abs(), (v[3] - v[1]).abs()))
        })
        .or_else(|| {
            field("PageMediaDimensions").and_then(|d| {
                let v: Vec<f64> = d
                    .split_whitespace()
                    .filter_map(|n| n.replace(',', "").parse().ok())
                    .collect();
                (v.len() == 2).then(|| (v[0], v[1]))
            })
        })?;

    let rotation: i32 = field("PageMediaRotation")
        .and_then(|r| r.parse().ok())
        .unwrap_or(0);
    if rotation.rem_euclid(180) == 90 {
        Some((h, w))
    } else {
        Some((w, h))
    }
}
