//! # Folio
//!
//! A filesystem-backed image gallery server. Point it at a directory and it
//! lists the images in it, shows each one with previous/next navigation, and
//! offers single-image and all-images downloads.
//!
//! The directory is the only data source. Every request re-reads it, so
//! adding, renaming or deleting files shows up on the next page load with no
//! restart and no cache to invalidate.
//!
//! # Request Flow
//!
//! ```text
//! ?image=NAME ─► resolve ─► index ─► metadata ─► navigation ─► render
//!                  │          │          │
//!                  └──────────┴──────────┴─► any failure: redirect to /gallery
//! ```
//!
//! A name is only acted on once it has been reduced to a bare file name
//! anchored in the gallery root, found in a fresh listing, and read back as a
//! real image. Navigation is computed over that same listing.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`resolve`] | Reduce a user-supplied name to a direct child of the gallery root |
//! | [`index`] | List the images in the gallery root, sorted by name |
//! | [`navigation`] | Wraparound previous/next over a listing |
//! | [`thumbnail`] | Pick the thumbnail for an entry, or fall back to the original |
//! | [`metadata`] | Dimensions, size and MIME type from the file's header bytes |
//! | [`archive`] | Build the all-images zip as a self-deleting temp file |
//! | [`config`] | `folio.toml` loading, merging and validation |
//! | [`render`] | Gallery and detail pages (Maud) |
//! | [`server`] | axum router and handlers |
//! | [`types`] | Shared data model (`ImageEntry`, `ResolvedPath`, ...) |
//! | [`error`] | `GalleryError` |
//! | [`output`] | CLI output for `scan` and `check` |
//!
//! # Design Decisions
//!
//! ## Only Bare Names Reach the Filesystem
//!
//! Requested names are cut down to their last path segment before they are
//! joined to the root, and the joined path must still be a direct child of
//! the root. `../../etc/passwd` becomes `passwd` in the root, which is then
//! not in the listing. Traversal is impossible rather than detected.
//!
//! ## Header Bytes, Not Extensions
//!
//! The extension decides what gets listed. Whether a listed file is actually
//! an image, and which kind, is decided by its contents.
//!
//! ## Archives Clean Up After Themselves
//!
//! The bulk download is built into a `tempfile` temp path that is owned by
//! the response body. However the response ends (complete, client gone, or
//! build failure) the file is removed when its owner drops.

pub mod archive;
pub mod config;
pub mod error;
pub mod index;
pub mod metadata;
pub mod navigation;
pub mod output;
pub mod render;
pub mod resolve;
pub mod server;
pub mod thumbnail;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
