//! Previous/next navigation over an index snapshot.
//!
//! Navigation wraps: the entry before the first is the last, the entry
//! after the last is the first. A single-entry index is its own neighbour
//! on both sides.
//!
//! The current name must be present in the same snapshot the neighbours are
//! taken from. A name that is not there (renamed or deleted between page
//! render and click) is a [`GalleryError::NotFound`], never a guess.

use crate::error::GalleryError;
use crate::types::{ImageEntry, Neighbors};

pub fn neighbors(entries: &[ImageEntry], current: &str) -> Result<Neighbors, GalleryError> {
    let index = entries
        .iter()
        .position(|e| e.name() == current)
        .ok_or_else(|| GalleryError::NotFound(current.to_string()))?;

    let len = entries.len();
    let previous = &entries[(index + len - 1) % len];
    let next = &entries[(index + 1) % len];

    Ok(Neighbors {
        previous: previous.name().to_string(),
        next: next.name().to_string(),
    })
}
