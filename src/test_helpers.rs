//! Shared test utilities for the folio test suite.
//!
//! Galleries are built in temp directories from real (tiny) encoded images
//! so that header sniffing in [`crate::metadata`] sees genuine bytes.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let gallery = setup_gallery();
//! let entries = crate::index::list(gallery.path(), "thumbnails").unwrap();
//! assert_eq!(names(&entries), vec!["a.jpg", "b.png", "c.gif"]);
//! ```

use crate::types::ImageEntry;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =========================================================================
// Fixture setup
// =========================================================================

/// A gallery with three images, a text file and a thumbnail for `a.jpg`.
///
/// ```text
/// a.jpg        (jpeg, 8x6)
/// b.png        (png, 5x4)
/// c.gif        (gif, 3x3)
/// notes.txt
/// thumbnails/
///     a.jpg    (jpeg, 2x2)
/// ```
pub fn setup_gallery() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_image(tmp.path(), "a.jpg", 8, 6, ImageFormat::Jpeg);
    write_image(tmp.path(), "b.png", 5, 4, ImageFormat::Png);
    write_image(tmp.path(), "c.gif", 3, 3, ImageFormat::Gif);
    std::fs::write(tmp.path().join("notes.txt"), "not an image").unwrap();

    let thumbs = tmp.path().join("thumbnails");
    std::fs::create_dir(&thumbs).unwrap();
    write_image(&thumbs, "a.jpg", 2, 2, ImageFormat::Jpeg);
    tmp
}

/// Encode a solid-colour image of the given size and format at `dir/name`.
///
/// The format is independent of the name so tests can lie about extensions.
pub fn write_image(dir: &Path, name: &str, width: u32, height: u32, format: ImageFormat) -> PathBuf {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 80, 40])));
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, format).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, bytes.into_inner()).unwrap();
    path
}

/// PNG-encoded image at `dir/name`, whatever the extension says.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    write_image(dir, name, width, height, ImageFormat::Png)
}

pub fn write_svg(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

// =========================================================================
// Entry helpers
// =========================================================================

/// Build an in-memory index from names. Panics on unrecognized extensions.
pub fn entries(names: &[&str]) -> Vec<ImageEntry> {
    names
        .iter()
        .map(|n| ImageEntry::from_name(n).unwrap_or_else(|| panic!("'{n}' is not an image name")))
        .collect()
}

/// Entry names in index order.
pub fn names(entries: &[ImageEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.name()).collect()
}
