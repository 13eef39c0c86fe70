//! Shared types passed between the gallery components.
//!
//! Everything here is derived fresh from the filesystem on each request and
//! dropped once the response is produced. Nothing is cached or persisted.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Extensions (lowercased) that mark a directory child as a gallery image.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp", "svg"];

/// One image file inside the gallery root, identified by its file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageEntry {
    name: String,
    extension: String,
}

impl ImageEntry {
    /// Build an entry from a bare file name.
    ///
    /// Returns `None` when the name carries a directory component or its
    /// lowercased extension is not in [`IMAGE_EXTENSIONS`].
    pub fn from_name(name: &str) -> Option<Self> {
        if name.is_empty() || name.contains(['/', '\\']) {
            return None;
        }
        let extension = recognized_extension(name)?;
        Some(Self {
            name: name.to_string(),
            extension,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Path of this entry's original file inside `dir`.
    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(&self.name)
    }
}

/// Lowercased extension of `name` if it is a recognized image extension.
///
/// The extension is everything after the last dot: `archive.tar.png` is a
/// png, and so is a bare `.png`.
pub fn recognized_extension(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// A user-supplied file name that has been reduced to a bare name and
/// anchored inside the gallery root.
///
/// Only [`crate::resolve::resolve`] constructs these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub requested_name: String,
    pub safe_name: String,
    pub absolute_path: PathBuf,
}

/// Previous/next neighbours of an entry under wraparound navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbors {
    pub previous: String,
    pub next: String,
}

/// Display metadata for a single image.
///
/// Dimensions and MIME type come from the file's own header bytes; the byte
/// size comes from the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageMetadata {
    pub width_px: u32,
    pub height_px: u32,
    pub byte_size: u64,
    pub mime_type: String,
}
