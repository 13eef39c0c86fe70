//! Directory scanning: which children of the gallery root are images.
//!
//! The index is rebuilt from the filesystem on every request; nothing is
//! cached. A single scan is the snapshot that both "where is the current
//! image" and "who are its neighbours" are answered from.
//!
//! ## Rules
//!
//! - Direct children only, no recursion.
//! - The reserved thumbnail subdirectory is never an entry.
//! - Only regular files (symlinks are followed) whose lowercased extension
//!   is in [`IMAGE_EXTENSIONS`](crate::types::IMAGE_EXTENSIONS).
//! - Names that are not valid UTF-8 are skipped; they cannot round-trip
//!   through a query string.
//! - Entries are sorted by name so two scans of an unchanged directory
//!   always agree on order.
//!
//! A file listed here may be gone by the time it is used. Callers skip such
//! files instead of failing.

use crate::error::GalleryError;
use crate::types::ImageEntry;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Scan `directory` and return its images in stable order.
pub fn list(directory: &Path, thumbnail_dir: &str) -> Result<Vec<ImageEntry>, GalleryError> {
    let mut entries: Vec<ImageEntry> = fs::read_dir(directory)?
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let file_name = e.file_name();
            let Some(name) = file_name.to_str() else {
                debug!(name = ?file_name, "skipping non UTF-8 file name");
                return None;
            };
            if name == thumbnail_dir {
                return None;
            }
            let entry = ImageEntry::from_name(name)?;
            e.path().is_file().then_some(entry)
        })
        .collect();

    entries.sort_by(|a, b| a.name().cmp(b.name()));
    debug!(dir = %directory.display(), count = entries.len(), "indexed gallery");
    Ok(entries)
}

/// Look up an entry by exact name.
pub fn find<'a>(entries: &'a [ImageEntry], name: &str) -> Option<&'a ImageEntry> {
    entries.iter().find(|e| e.name() == name)
}
