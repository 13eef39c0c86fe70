//! Thumbnail-or-original selection.
//!
//! Thumbnails are produced by something else and dropped into the reserved
//! subdirectory under the same file name as the original. This module only
//! checks whether one is present; it never generates, resizes or caches.

use crate::types::ImageEntry;
use std::path::{Path, PathBuf};

/// What to show for an entry in the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Thumbnail(PathBuf),
    Original(PathBuf),
}

impl Selection {
    pub fn path(&self) -> &Path {
        match self {
            Selection::Thumbnail(p) | Selection::Original(p) => p,
        }
    }

    pub fn is_thumbnail(&self) -> bool {
        matches!(self, Selection::Thumbnail(_))
    }

    /// URL the listing should use for this selection.
    pub fn url(&self, entry: &ImageEntry) -> String {
        let encoded = urlencoding::encode(entry.name());
        match self {
            Selection::Thumbnail(_) => format!("/thumbnails/{encoded}"),
            Selection::Original(_) => format!("/images/{encoded}"),
        }
    }
}

/// Prefer `thumbnail_dir/<name>` when it is a file, else the original in
/// `gallery_root`.
pub fn select(entry: &ImageEntry, thumbnail_dir: &Path, gallery_root: &Path) -> Selection {
    let thumb = entry.path_in(thumbnail_dir);
    if thumb.is_file() {
        Selection::Thumbnail(thumb)
    } else {
        Selection::Original(entry.path_in(gallery_root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn entry(name: &str) -> ImageEntry {
        ImageEntry::from_name(name).unwrap()
    }

    #[test]
    fn thumbnail_preferred_when_present() {
        let tmp = TempDir::new().unwrap();
        let thumbs = tmp.path().join("thumbnails");
        fs::create_dir(&thumbs).unwrap();
        fs::write(tmp.path().join("a.jpg"), "orig").unwrap();
        fs::write(thumbs.join("a.jpg"), "thumb").unwrap();

        let selection = select(&entry("a.jpg"), &thumbs, tmp.path());
        assert_eq!(selection, Selection::Thumbnail(thumbs.join("a.jpg")));
        assert!(selection.is_thumbnail());
        assert_eq!(selection.url(&entry("a.jpg")), "/thumbnails/a.jpg");
    }

    #[test]
    fn original_when_thumbnail_missing() {
        let tmp = TempDir::new().unwrap();
        let thumbs = tmp.path().join("thumbnails");
        fs::write(tmp.path().join("b.png"), "orig").unwrap();

        let selection = select(&entry("b.png"), &thumbs, tmp.path());
        assert_eq!(selection.path(), tmp.path().join("b.png"));
        assert!(!selection.is_thumbnail());
        assert_eq!(selection.url(&entry("b.png")), "/images/b.png");
    }

    #[test]
    fn directory_named_like_entry_is_not_a_thumbnail() {
        let tmp = TempDir::new().unwrap();
        let thumbs = tmp.path().join("thumbnails");
        fs::create_dir_all(thumbs.join("c.gif")).unwrap();

        let selection = select(&entry("c.gif"), &thumbs, tmp.path());
        assert!(!selection.is_thumbnail());
    }

    #[test]
    fn url_is_percent_encoded() {
        let e = entry("my photo #1.jpg");
        let selection = Selection::Original(PathBuf::from("/x"));
        assert_eq!(selection.url(&e), "/images/my%20photo%20%231.jpg");
    }
}
