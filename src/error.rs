//! Error taxonomy for gallery operations.
//!
//! User-input failures ([`GalleryError::InvalidPath`], [`GalleryError::NotFound`],
//! [`GalleryError::NotAnImage`]) are recovered at the HTTP boundary by
//! redirecting to the listing. Archive failures are reported to the client.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Invalid image path: {0:?}")]
    InvalidPath(String),
    #[error("Image not found: {0}")]
    NotFound(String),
    #[error("Not a decodable image: {0}")]
    NotAnImage(PathBuf),
    #[error("Archive creation failed: {0}")]
    ArchiveCreationFailed(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GalleryError {
    /// Whether this error was caused by a bad or stale user-supplied name.
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            GalleryError::InvalidPath(_) | GalleryError::NotFound(_) | GalleryError::NotAnImage(_)
        )
    }

    /// Short stable label, used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            GalleryError::InvalidPath(_) => "invalid_path",
            GalleryError::NotFound(_) => "not_found",
            GalleryError::NotAnImage(_) => "not_an_image",
            GalleryError::ArchiveCreationFailed(_) => "archive_creation_failed",
            GalleryError::Io(_) => "io",
        }
    }
}
