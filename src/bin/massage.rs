//! CLI binary for massage.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `MassageConfig`, reads inputs from disk or URLs, and writes results.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use massage::{
    burst_pdf, check_tools, generate_thumbnail, get_buffer, get_metadata, image_to_pdf, merge_all,
    png_to_pdf, rotate_pdf, validate_url, Geometry, ImageBackend, MassageConfig, Source,
};
use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Metadata of a local file or URL
  massage meta 4x6.pdf
  massage meta --json https://example.com/doc.pdf

  # Merge, rotate, burst
  massage merge a.pdf b.pdf -o merged.pdf
  massage rotate 4x6.pdf 90 -o rotated.pdf
  massage burst multi.pdf -d pages/

  # Images
  massage image-to-pdf photo.png --dpi 300 -o photo.pdf
  massage thumbnail 4x6.pdf 200x300 -o thumb.png

  # Check that pdftk and ImageMagick can be found
  massage doctor

ENVIRONMENT VARIABLES:
  MASSAGE_PDFTK           Path to the pdftk binary
  MASSAGE_BACKEND         imagemagick (default) or graphicsmagick
  MASSAGE_IMAGE_TOOL      magick/gm binary, or directory holding convert/identify
  RUST_LOG                Overrides --verbose/--quiet log filtering
"#;

/// Document utilities over pdftk and ImageMagick.
#[derive(Parser, Debug)]
#[command(
    name = "massage",
    version,
    about = "Document utilities over pdftk and ImageMagick",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// pdftk binary.
    #[arg(long, global = true, env = "MASSAGE_PDFTK", default_value = "pdftk")]
    pdftk: PathBuf,

    /// Image toolkit: imagemagick or graphicsmagick.
    #[arg(long, global = true, env = "MASSAGE_BACKEND", default_value = "imagemagick")]
    backend: String,

    /// Image toolkit binary (magick/gm) or directory holding convert/identify.
    #[arg(long, global = true, env = "MASSAGE_IMAGE_TOOL")]
    image_tool: Option<PathBuf>,

    /// Use ImageMagick 7 (`magick convert`) instead of `convert`/`identify`.
    #[arg(long, global = true, env = "MASSAGE_IM7")]
    im7: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, global = true, env = "MASSAGE_DOWNLOAD_TIMEOUT", default_value_t = 30)]
    download_timeout: u64,

    /// Per-tool timeout in seconds.
    #[arg(long, global = true, env = "MASSAGE_TOOL_TIMEOUT", default_value_t = 120)]
    tool_timeout: u64,

    /// Parent directory for temporary workspaces.
    #[arg(long, global = true, env = "MASSAGE_TEMP_DIR")]
    temp_dir: Option<PathBuf>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "MASSAGE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "MASSAGE_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print file type, size and page count.
    Meta {
        /// Local file or HTTP/HTTPS URL.
        input: String,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Check that a string is an absolute HTTP/HTTPS URL.
    ValidateUrl { url: String },
    /// Download a URL (or copy a file) to the output path.
    Fetch {
        input: String,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Merge PDFs in order.
    Merge {
        #[arg(required = true, num_args = 1..)]
        inputs: Vec<String>,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Rotate every page clockwise by a multiple of 90 degrees.
    Rotate {
        input: String,
        #[arg(allow_negative_numbers = true)]
        degrees: i32,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Split a PDF into one file per page.
    Burst {
        input: String,
        /// Output directory (created if missing).
        #[arg(short = 'd', long)]
        out_dir: PathBuf,
    },
    /// Convert a raster image to PDF.
    ImageToPdf {
        input: String,
        #[arg(long, default_value_t = 300)]
        dpi: u32,
        /// Only accept PNG input.
        #[arg(long)]
        png_only: bool,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Render the first page/frame as a PNG thumbnail.
    Thumbnail {
        input: String,
        /// WIDTHxHEIGHT, e.g. 200x300.
        geometry: Geometry,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Report whether pdftk and the image toolkit can be launched.
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;
    let quiet = cli.quiet;

    match cli.command {
        Command::Meta { input, json } => {
            let source = read_source(&input).await?;
            let meta = with_spinner(quiet, "Reading metadata", get_metadata(source, &config))
            .await
            .context("Failed to read metadata")?;

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
                );
            } else {
                println!("File:    {}", input);
                println!("Type:    {}", meta.file_type);
                println!("Width:   {}", meta.width);
                println!("Length:  {}", meta.length);
                println!("Pages:   {}", meta.num_pages);
            }
        }
        Command::ValidateUrl { url } => {
            let parsed = validate_url(&url).context("Invalid URL")?;
            if !quiet {
                eprintln!("{} {}", green("✔"), parsed);
            }
        }
        Command::Fetch { input, output } => {
            let source = read_source(&input).await?;
            let bytes = with_spinner(quiet, "Downloading", get_buffer(source, &config))
            .await
            .context("Download failed")?;
            write_output(&output, &bytes, quiet).await?;
        }
        Command::Merge { inputs, output } => {
            let mut sources = Vec::with_capacity(inputs.len());
            for input in &inputs {
                sources.push(read_source(input).await?);
            }
            let merged = with_spinner(quiet, "Merging", merge_all(sources, &config))
            .await
            .context("Merge failed")?;
            write_output(&output, &merged, quiet).await?;
        }
        Command::Rotate {
            input,
            degrees,
            output,
        } => {
            let source = read_source(&input).await?;
            let rotated = with_spinner(quiet, "Rotating", rotate_pdf(source, degrees, &config))
            .await
            .context("Rotate failed")?;
            write_output(&output, &rotated, quiet).await?;
        }
        Command::Burst { input, out_dir } => {
            let source = read_source(&input).await?;
            let pages = with_spinner(quiet, "Bursting", burst_pdf(source, &config))
            .await
            .context("Burst failed")?;

            tokio::fs::create_dir_all(&out_dir)
                .await
                .with_context(|| format!("Failed to create {}", out_dir.display()))?;
            for (i, page) in pages.iter().enumerate() {
                let path = out_dir.join(format!("page_{:04}.pdf", i + 1));
                write_output(&path, page, true).await?;
            }
            if !quiet {
                eprintln!(
                    "{} {} pages  →  {}",
                    green("✔"),
                    pages.len(),
                    bold(&out_dir.display().to_string())
                );
            }
        }
        Command::ImageToPdf {
            input,
            dpi,
            png_only,
            output,
        } => {
            let source = read_source(&input).await?;
            let pdf = with_spinner(quiet, "Converting", async {
                if png_only {
                    png_to_pdf(source, dpi, &config).await
                } else {
                    image_to_pdf(source, dpi, &config).await
                }
            })
            .await
            .context("Conversion failed")?;
            write_output(&output, &pdf, quiet).await?;
        }
        Command::Thumbnail {
            input,
            geometry,
            output,
        } => {
            let source = read_source(&input).await?;
            let png = with_spinner(
                quiet,
                "Rendering thumbnail",
                generate_thumbnail(source, geometry, &config),
            )
            .await
            .context("Thumbnail generation failed")?;
            write_output(&output, &png, quiet).await?;
        }
        Command::Doctor => {
            let report = check_tools(&config).await;
            for (label, status) in [
                ("pdftk", &report.pdftk),
                ("identify", &report.identify),
                ("convert", &report.convert),
            ] {
                println!(
                    "{} {:<9} {}",
                    if status.available { green("✓") } else { red("✗") },
                    label,
                    status.path.display()
                );
            }
            if !report.all_available() {
                anyhow::bail!("Some tools are missing");
            }
        }
    }

    Ok(())
}

/// Map CLI args to `MassageConfig`.
fn build_config(cli: &Cli) -> Result<MassageConfig> {
    let backend: ImageBackend = cli.backend.parse().context("Invalid --backend")?;

    let mut builder = MassageConfig::builder()
        .pdftk_path(&cli.pdftk)
        .image_backend(backend)
        .legacy_imagemagick(!cli.im7)
        .download_timeout_secs(cli.download_timeout)
        .tool_timeout_secs(cli.tool_timeout);

    if let Some(ref tool) = cli.image_tool {
        builder = builder.image_tool_path(tool);
    }
    if let Some(ref dir) = cli.temp_dir {
        builder = builder.temp_dir(dir);
    }

    builder.build().context("Invalid configuration")
}

/// URLs are passed through to the library; anything else is read from disk.
async fn read_source(input: &str) -> Result<Source> {
    if massage::pipeline::input::is_url(input) {
        return Ok(Source::Url(input.to_string()));
    }
    let bytes = tokio::fs::read(input)
        .await
        .with_context(|| format!("Failed to read {input}"))?;
    Ok(Source::Bytes(bytes))
}

/// Write `bytes` to `path`, or to stdout when `path` is `-`.
async fn write_output(path: &Path, bytes: &[u8], quiet: bool) -> Result<()> {
    if path == Path::new("-") {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(bytes)
            .context("Failed to write to stdout")?;
        return Ok(());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    if !quiet {
        eprintln!(
            "{} {} bytes  →  {}",
            green("✔"),
            bytes.len(),
            bold(&path.display().to_string())
        );
    }
    Ok(())
}

/// Run `fut` under a spinner unless `quiet`.
async fn with_spinner<T>(
    quiet: bool,
    label: &str,
    fut: impl Future<Output = massage::Result<T>>,
) -> massage::Result<T> {
    if quiet {
        return fut.await;
    }

    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix(label.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));

    let result = fut.await;
    bar.finish_and_clear();
    result
}
