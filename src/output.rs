//! CLI output formatting for the `scan` and `check` commands.
//!
//! Each entry is shown by position and name, with what the gallery would
//! display for it on an indented context line.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Images (3)
//! 001 a.jpg
//!     Shows: thumbnails/a.jpg
//! 002 b.png
//!     Shows: original
//! ```
//!
//! ## Check
//!
//! ```text
//! 001 a.jpg
//!     640x480 image/jpeg, 12.50 KB
//! 002 broken.png
//!     Error: Not a decodable image: /srv/gallery/broken.png
//!
//! 2 images, 1 not decodable
//! ```
//!
//! # Architecture
//!
//! `format_*` functions return `Vec<String>` for testability; `print_*`
//! wrappers write to stdout.

use crate::error::GalleryError;
use crate::metadata::format_kib;
use crate::thumbnail::Selection;
use crate::types::{ImageEntry, ImageMetadata};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn entry_header(index: usize, entry: &ImageEntry) -> String {
    format!("{} {}", format_index(index), entry.name())
}

/// Path relative to the gallery root for display, or as-is if outside it.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

// ============================================================================
// Scan
// ============================================================================

pub fn format_scan_output(
    entries: &[ImageEntry],
    selections: &[Selection],
    root: &Path,
) -> Vec<String> {
    let mut lines = vec![format!("Images ({})", entries.len())];
    for (i, (entry, selection)) in entries.iter().zip(selections).enumerate() {
        lines.push(entry_header(i + 1, entry));
        let shows = match selection {
            Selection::Thumbnail(path) => display_path(path, root),
            Selection::Original(_) => "original".to_string(),
        };
        lines.push(format!("    Shows: {shows}"));
    }
    lines
}

pub fn print_scan_output(entries: &[ImageEntry], selections: &[Selection], root: &Path) {
    for line in format_scan_output(entries, selections, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// One checked entry: its metadata, or why it could not be read.
pub type CheckResult = (ImageEntry, Result<ImageMetadata, GalleryError>);

pub fn format_check_output(results: &[CheckResult]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut failed = 0;
    for (i, (entry, result)) in results.iter().enumerate() {
        lines.push(entry_header(i + 1, entry));
        match result {
            Ok(meta) => lines.push(format!(
                "    {}x{} {}, {}",
                meta.width_px,
                meta.height_px,
                meta.mime_type,
                format_kib(meta.byte_size)
            )),
            Err(e) => {
                failed += 1;
                lines.push(format!("    Error: {e}"));
            }
        }
    }
    lines.push(String::new());
    let noun = if results.len() == 1 { "image" } else { "images" };
    lines.push(format!("{} {noun}, {failed} not decodable", results.len()));
    lines
}

/// Print the check report; returns the number of entries that failed.
pub fn print_check_output(results: &[CheckResult]) -> usize {
    for line in format_check_output(results) {
        println!("{}", line);
    }
    results.iter().filter(|(_, r)| r.is_err()).count()
}
