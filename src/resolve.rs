//! Untrusted file name → safe path inside the gallery root.
//!
//! The `image` query parameter is the only attacker-controlled input the
//! gallery accepts. [`resolve`] is the single place it is turned into a
//! filesystem path:
//!
//! 1. Keep only the final path segment (`a/b/../../etc/passwd` → `passwd`).
//!    Both `/` and `\` count as separators, and trailing separators are
//!    ignored the way `basename` ignores them.
//! 2. Reject empty names, `.`, `..` and names containing NUL.
//! 3. Join onto the gallery root and check, lexically, that the result is a
//!    direct child of the root.
//!
//! Existence and "is it really an image" are left to the caller
//! ([`crate::metadata::read`] and the index).

use crate::error::GalleryError;
use crate::types::ResolvedPath;
use std::path::{Component, Path, PathBuf};

/// Strip directory components from `raw`, keeping the final segment.
pub fn base_name(raw: &str) -> &str {
    let trimmed = raw.trim_end_matches(['/', '\\']);
    match trimmed.rfind(['/', '\\']) {
        Some(pos) => &trimmed[pos + 1..],
        None => trimmed,
    }
}

pub fn resolve(raw_name: &str, gallery_root: &Path) -> Result<ResolvedPath, GalleryError> {
    let safe_name = base_name(raw_name);

    if safe_name.is_empty() || safe_name == "." || safe_name == ".." || safe_name.contains('\0')
    {
        return Err(GalleryError::InvalidPath(raw_name.to_string()));
    }

    let root = absolute_root(gallery_root)?;
    let absolute_path = root.join(safe_name);

    if !is_direct_child(&root, &absolute_path) {
        return Err(GalleryError::InvalidPath(raw_name.to_string()));
    }

    Ok(ResolvedPath {
        requested_name: raw_name.to_string(),
        safe_name: safe_name.to_string(),
        absolute_path,
    })
}

fn absolute_root(root: &Path) -> Result<PathBuf, GalleryError> {
    if root.is_absolute() {
        Ok(root.to_path_buf())
    } else {
        Ok(std::path::absolute(root)?)
    }
}

/// `candidate` is `root` plus exactly one normal component.
fn is_direct_child(root: &Path, candidate: &Path) -> bool {
    let Ok(rest) = candidate.strip_prefix(root) else {
        return false;
    };
    let mut components = rest.components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
