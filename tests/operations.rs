//! Integration tests for the document operations.
//!
//! Tests that shell out print a SKIP line unless the tools they use are on
//! PATH: `pdftk` for PDF metadata, merge, rotate and burst, plus ImageMagick
//! for image metadata, conversion and thumbnails. The download tests hit the network and are gated
//! behind `E2E_ENABLED`:
//!
//!   E2E_ENABLED=1 cargo test --test operations -- --nocapture

#[macro_use]
mod common;

use massage::blocking;
use massage::{
    burst_pdf, generate_thumbnail, get_buffer, get_metadata, image_to_pdf, merge, merge_all,
    png_to_pdf, rotate_pdf, validate_url, FileMetadata, FileType, Geometry, MassageConfig,
    MassageError,
};

fn meta(file_type: FileType, width: f64, length: f64, num_pages: usize) -> FileMetadata {
    FileMetadata {
        file_type,
        width,
        length,
        num_pages,
    }
}

// ── getMetaData ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn metadata_of_pdf_buffer() {
    let config = pdftk_or_skip!();
    let m = get_metadata(common::pdf_4x6(), &config).await.unwrap();
    assert_eq!(m, meta(FileType::Pdf, 6.0, 4.0, 1));
}

#[tokio::test]
async fn metadata_of_letter_pdf() {
    let config = pdftk_or_skip!();
    let pdf = common::pdf_with_pages(&[(612, 792), (612, 792), (612, 792)]);
    let m = get_metadata(pdf, &config).await.unwrap();
    assert_eq!(m, meta(FileType::Pdf, 8.5, 11.0, 3));
}

#[tokio::test]
async fn metadata_of_png_is_in_pixels() {
    let config = tools_or_skip!();
    let m = get_metadata(common::png(120, 80), &config).await.unwrap();
    assert_eq!(m, meta(FileType::Png, 120.0, 80.0, 1));
}

#[tokio::test]
async fn metadata_of_jpeg() {
    let config = tools_or_skip!();
    let m = get_metadata(common::jpeg(64, 32), &config).await.unwrap();
    assert_eq!(m.file_type, FileType::Jpeg);
    assert_eq!((m.width, m.length), (64.0, 32.0));
}

#[tokio::test]
async fn metadata_fails_for_invalid_buffer() {
    let err = get_metadata(vec![0u8; 10], &MassageConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, MassageError::UnrecognizedFile { .. }));
}

#[tokio::test]
async fn metadata_fails_for_docx() {
    // Local file header of a zip archive, which is what a .docx is.
    let mut docx = b"PK\x03\x04\x14\x00\x06\x00".to_vec();
    docx.extend_from_slice(b"[Content_Types].xml");
    let err = get_metadata(docx, &MassageConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, MassageError::UnsupportedFileType { .. }));
}

#[tokio::test]
async fn metadata_fails_for_truncated_pdf() {
    let config = pdftk_or_skip!();
    let mut pdf = common::pdf_4x6();
    pdf.truncate(20);
    assert!(get_metadata(pdf, &config).await.is_err());
}

// ── validateUrl ──────────────────────────────────────────────────────────────

#[test]
fn validate_url_with_protocol() {
    assert!(validate_url("https://www.lob.com").is_ok());
}

#[test]
fn validate_url_without_protocol() {
    assert!(matches!(
        validate_url("www.lob.com"),
        Err(MassageError::InvalidUrl { .. })
    ));
}

#[test]
fn validate_url_with_pdf_bytes() {
    let pdf = common::pdf_4x6();
    let as_text = String::from_utf8_lossy(&pdf);
    assert!(validate_url(&as_text).is_err());
}

// ── getBuffer ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_buffer_returns_buffer_unmodified() {
    let pdf = common::pdf_4x6();
    let out = get_buffer(pdf.clone(), &MassageConfig::default())
        .await
        .unwrap();
    assert_eq!(out, pdf);
}

#[tokio::test]
async fn get_buffer_rejects_invalid_url() {
    let err = get_buffer("test.pdf", &MassageConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, MassageError::InvalidUrl { .. }));
}

#[tokio::test]
async fn get_buffer_downloads_url() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP — set E2E_ENABLED=1 to run network tests");
        return;
    }
    let bytes = get_buffer("https://www.lob.com/", &MassageConfig::default())
        .await
        .expect("download should succeed");
    assert!(!bytes.is_empty());
}

#[tokio::test]
async fn get_buffer_fails_for_unknown_host() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP — set E2E_ENABLED=1 to run network tests");
        return;
    }
    let err = get_buffer("https://www.loasdfas.invalid", &MassageConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MassageError::DownloadFailed { .. } | MassageError::DownloadTimeout { .. }
    ));
}

// ── merge ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn merge_sums_page_counts() {
    let config = pdftk_or_skip!();
    let a = common::pdf_4x6();
    let b = common::pdf_4x6_twice();

    let merged = merge(a.clone(), b.clone(), &config).await.unwrap();

    let (ma, mb, mm) = tokio::try_join!(
        get_metadata(a, &config),
        get_metadata(b, &config),
        get_metadata(merged, &config),
    )
    .unwrap();
    assert_eq!(ma.num_pages + mb.num_pages, mm.num_pages);
    assert_eq!(mm.num_pages, 3);
}

#[tokio::test]
async fn merge_all_keeps_order() {
    let config = pdftk_or_skip!();
    let letter = common::pdf_with_pages(&[(612, 792)]);
    let merged = merge_all(vec![letter, common::pdf_4x6()], &config)
        .await
        .unwrap();
    let m = get_metadata(merged, &config).await.unwrap();
    assert_eq!(m, meta(FileType::Pdf, 8.5, 11.0, 2));
}

// ── rotatePdf ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn rotate_swaps_width_and_length() {
    let config = pdftk_or_skip!();
    let rotated = rotate_pdf(common::pdf_4x6(), 90, &config).await.unwrap();
    let m = get_metadata(rotated, &config).await.unwrap();
    assert_eq!(m, meta(FileType::Pdf, 4.0, 6.0, 1));
}

#[tokio::test]
async fn rotate_180_keeps_orientation() {
    let config = pdftk_or_skip!();
    let rotated = rotate_pdf(common::pdf_4x6(), 180, &config).await.unwrap();
    let m = get_metadata(rotated, &config).await.unwrap();
    assert_eq!(m, meta(FileType::Pdf, 6.0, 4.0, 1));
}

#[tokio::test]
async fn rotate_fails_for_invalid_buffer() {
    assert!(rotate_pdf(vec![0u8; 10], 90, &MassageConfig::default())
        .await
        .is_err());
}

#[tokio::test]
async fn rotate_fails_for_invalid_degrees() {
    let err = rotate_pdf(common::pdf_4x6(), 33, &MassageConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, MassageError::InvalidRotation { degrees: 33 }));
}

// ── burstPdf ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn burst_splits_pages() {
    let config = pdftk_or_skip!();
    let pages = burst_pdf(common::pdf_4x6_twice(), &config).await.unwrap();
    assert_eq!(pages.len(), 2);
    for page in pages {
        let m = get_metadata(page, &config).await.unwrap();
        assert_eq!(m.num_pages, 1);
    }
}

#[tokio::test]
async fn burst_preserves_page_order() {
    let config = pdftk_or_skip!();
    let pdf = common::pdf_with_pages(&[(612, 792), (432, 288), (288, 432)]);
    let pages = burst_pdf(pdf, &config).await.unwrap();
    let mut sizes = Vec::new();
    for page in pages {
        let m = get_metadata(page, &config).await.unwrap();
        sizes.push((m.width, m.length));
    }
    assert_eq!(sizes, vec![(8.5, 11.0), (6.0, 4.0), (4.0, 6.0)]);
}

// ── pngToPdf / imageToPdf ────────────────────────────────────────────────────

#[tokio::test]
async fn png_to_pdf_uses_dpi_for_page_size() {
    let config = tools_or_skip!();
    let result = png_to_pdf(common::png(1200, 1800), 300, &config).await;
    if common::pdf_coder_unavailable(&result) {
        return;
    }
    let m = get_metadata(result.unwrap(), &config).await.unwrap();
    assert_eq!(m, meta(FileType::Pdf, 4.0, 6.0, 1));
}

#[tokio::test]
async fn image_to_pdf_accepts_jpeg() {
    let config = tools_or_skip!();
    let result = image_to_pdf(common::jpeg(300, 150), 150, &config).await;
    if common::pdf_coder_unavailable(&result) {
        return;
    }
    let m = get_metadata(result.unwrap(), &config).await.unwrap();
    assert_eq!(m, meta(FileType::Pdf, 2.0, 1.0, 1));
}

#[tokio::test]
async fn png_to_pdf_rejects_pdf_input() {
    let err = png_to_pdf(common::pdf_4x6(), 300, &MassageConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, MassageError::UnsupportedFileType { .. }));
}

// ── generateThumbnail ────────────────────────────────────────────────────────

#[tokio::test]
async fn thumbnail_of_pdf_has_requested_size() {
    let config = tools_or_skip!();
    let geometry: Geometry = "200x300".parse().unwrap();
    let result = generate_thumbnail(common::pdf_4x6(), geometry, &config).await;
    if common::pdf_coder_unavailable(&result) {
        return;
    }
    let thumb = result.unwrap();

    let decoded = image::load_from_memory(&thumb).expect("thumbnail is a valid image");
    assert_eq!((decoded.width(), decoded.height()), (200, 300));

    let m = get_metadata(thumb, &config).await.unwrap();
    assert_eq!(m, meta(FileType::Png, 200.0, 300.0, 1));
}

#[tokio::test]
async fn thumbnail_of_png() {
    let config = tools_or_skip!();
    let geometry = Geometry::new(50, 25).unwrap();
    let thumb = generate_thumbnail(common::png(400, 400), geometry, &config)
        .await
        .unwrap();
    let decoded = image::load_from_memory(&thumb).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (50, 25));
}

// ── blocking API ─────────────────────────────────────────────────────────────

#[test]
fn blocking_metadata_matches_async() {
    let config = match tokio_test::block_on(common::config_if_pdftk_present()) {
        Some(c) => c,
        None => return,
    };
    let m = blocking::get_metadata_sync(common::pdf_4x6(), &config).unwrap();
    assert_eq!(m, meta(FileType::Pdf, 6.0, 4.0, 1));

    let pages = blocking::burst_pdf_sync(common::pdf_4x6_twice(), &config).unwrap();
    assert_eq!(pages.len(), 2);
}

#[test]
fn blocking_rotate_rejects_bad_degrees() {
    let err =
        blocking::rotate_pdf_sync(common::pdf_4x6(), 45, &MassageConfig::default()).unwrap_err();
    assert!(matches!(err, MassageError::InvalidRotation { degrees: 45 }));
}
