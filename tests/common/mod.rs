//! Fixture builders shared by the integration tests.
//!
//! PDFs are synthesised here instead of checked in so each test states the
//! page sizes it relies on.

#![allow(dead_code)]

use image::{ImageFormat, Rgb, RgbImage};
use massage::MassageConfig;
use std::io::Cursor;

/// A PDF with one empty page per `(width_pt, height_pt)` entry.
pub fn pdf_with_pages(pages: &[(u32, u32)]) -> Vec<u8> {
    let mut objects: Vec<String> = Vec::new();
    let page_ids: Vec<usize> = (0..pages.len()).map(|i| 3 + i * 2).collect();

    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
    let kids = page_ids
        .iter()
        .map(|id| format!("{id} 0 R"))
        .collect::<Vec<_>>()
        .join(" ");
    objects.push(format!(
        "<< /Type /Pages /Kids [{kids}] /Count {} >>",
        pages.len()
    ));
    for (i, (w, h)) in pages.iter().enumerate() {
        let content_id = page_ids[i] + 1;
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {w} {h}] /Resources << >> /Contents {content_id} 0 R >>"
        ));
        objects.push("<< /Length 0 >>\nstream\n\nendstream".to_string());
    }

    let mut out = b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
    }

    let xref_at = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for off in &offsets {
        out.extend_from_slice(format!("{off:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
            objects.len() + 1
        )
        .as_bytes(),
    );
    out
}

/// 6×4 inch landscape page (432×288 pt).
pub fn pdf_4x6() -> Vec<u8> {
    pdf_with_pages(&[(432, 288)])
}

/// Two 6×4 inch pages.
pub fn pdf_4x6_twice() -> Vec<u8> {
    pdf_with_pages(&[(432, 288), (432, 288)])
}

/// A solid-colour PNG of the given size.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([200, 30, 30]));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("png encode");
    buf
}

/// A solid-colour JPEG of the given size.
pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([30, 30, 200]));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
        .expect("jpeg encode");
    buf
}

/// Default config, or `None` (with a SKIP line) when the tools are missing.
pub async fn config_if_tools_present() -> Option<MassageConfig> {
    let config = MassageConfig::default();
    let report = massage::check_tools(&config).await;
    if report.all_available() {
        Some(config)
    } else {
        println!("SKIP — pdftk and ImageMagick are required: {report:?}");
        None
    }
}

/// Default config, or `None` (with a SKIP line) when pdftk is missing.
/// For tests that never touch ImageMagick.
pub async fn config_if_pdftk_present() -> Option<MassageConfig> {
    let config = MassageConfig::default();
    let report = massage::check_tools(&config).await;
    if report.pdftk.available {
        Some(config)
    } else {
        println!("SKIP — pdftk is required: {:?}", report.pdftk);
        None
    }
}

/// True when ImageMagick cannot handle PDFs on this host: either its
/// security policy forbids the coder (the Debian default) or Ghostscript is
/// not installed.
pub fn pdf_coder_unavailable<T>(result: &massage::Result<T>) -> bool {
    match result {
        Err(massage::MassageError::ToolFailed { stderr, .. }) => {
            let blocked = ["not authorized", "security policy", "delegate", "gs:"]
                .iter()
                .any(|needle| stderr.contains(needle));
            if blocked {
                println!("SKIP — ImageMagick has no usable PDF coder: {stderr}");
            }
            blocked
        }
        _ => false,
    }
}

/// Skip the test unless pdftk and ImageMagick are installed.
macro_rules! tools_or_skip {
    () => {{
        match common::config_if_tools_present().await {
            Some(c) => c,
            None => return,
        }
    }};
}

/// Skip the test unless pdftk is installed.
macro_rules! pdftk_or_skip {
    () => {{
        match common::config_if_pdftk_present().await {
            Some(c) => c,
            None => return,
        }
    }};
}
