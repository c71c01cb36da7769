//! Building blocks shared by the document operations.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ detect ──▶ tool::Workspace ──▶ pdftk / magick ──▶ bytes
//! (URL/bytes) (magic)    (temp files)        (subprocess)
//! ```
//!
//! 1. [`input`]  — pass buffers through, validate and download URLs
//! 2. [`detect`] — sniff magic bytes so bad input fails before any spawn
//! 3. [`tool`]   — temp workspace plus a timed, kill-on-drop subprocess runner
//! 4. [`pdftk`]  — page info, merge, rotate, burst
//! 5. [`magick`] — identify, image→PDF, thumbnails

pub mod detect;
pub mod input;
pub mod magick;
pub mod pdftk;
pub mod tool;
