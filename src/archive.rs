//! Bulk download: every indexed image in one zip archive.
//!
//! The archive is written to a uniquely named temporary file
//! (`images_<date>_<time>_<random>.zip`) in the configured work directory.
//! [`ArchiveJob`] owns that file as a [`TempPath`]: dropping the job, or
//! whatever the path was handed to, deletes it. That covers a completed
//! download, a client that disconnects halfway, and a build that fails
//! partway through.
//!
//! Members that disappear between indexing and archiving are skipped with a
//! warning. Only failures of the archive container itself abort the job.

use crate::error::GalleryError;
use crate::types::ImageEntry;
use chrono::{DateTime, Datelike, Local, Timelike};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io;
use std::path::Path;
use tempfile::TempPath;
use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// How members are stored in the archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    Stored,
    #[default]
    Deflated,
}

impl From<Compression> for CompressionMethod {
    fn from(c: Compression) -> Self {
        match c {
            Compression::Stored => CompressionMethod::Stored,
            Compression::Deflated => CompressionMethod::Deflated,
        }
    }
}

/// A finished archive on disk, deleted when dropped.
#[derive(Debug)]
pub struct ArchiveJob {
    path: TempPath,
    download_name: String,
    members: Vec<String>,
    byte_size: u64,
}

impl ArchiveJob {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name offered to the client, e.g. `images_2024-05-01_13-45-10.zip`.
    pub fn download_name(&self) -> &str {
        &self.download_name
    }

    /// Names of the images actually written, in archive order.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    /// Release the temp file guard so it can outlive the job (for example,
    /// inside a response body). The file is removed when the guard drops.
    pub fn into_temp_path(self) -> TempPath {
        self.path
    }
}

/// Client-facing archive name for a given instant.
pub fn download_name(now: &DateTime<Local>) -> String {
    format!("images_{}.zip", now.format("%Y-%m-%d_%H-%M-%S"))
}

pub fn build(
    entries: &[ImageEntry],
    source_dir: &Path,
    work_dir: &Path,
    compression: Compression,
    now: DateTime<Local>,
) -> Result<ArchiveJob, GalleryError> {
    let download_name = download_name(&now);
    let stem = download_name.trim_end_matches(".zip");

    let temp = tempfile::Builder::new()
        .prefix(&format!("{stem}_"))
        .suffix(".zip")
        .tempfile_in(work_dir)
        .map_err(|e| {
            GalleryError::ArchiveCreationFailed(format!(
                "cannot create archive in {}: {e}",
                work_dir.display()
            ))
        })?;
    let (file, path) = temp.into_parts();
    debug!(path = %path.display(), "archive created");

    let mut writer = ZipWriter::new(file);
    let mut members = Vec::with_capacity(entries.len());

    for entry in entries {
        let source = entry.path_in(source_dir);
        match add_member(&mut writer, entry, &source, compression) {
            Ok(true) => members.push(entry.name().to_string()),
            Ok(false) => {}
            Err(e) => return Err(archive_failed(e)),
        }
    }

    writer.finish().map_err(archive_failed)?;
    let byte_size = fs::metadata(&path)?.len();

    info!(
        name = %download_name,
        members = members.len(),
        skipped = entries.len() - members.len(),
        bytes = byte_size,
        "archive built"
    );

    Ok(ArchiveJob {
        path,
        download_name,
        members,
        byte_size,
    })
}

/// Copy one image into the archive.
///
/// `Ok(false)` means the member was skipped because the source could not
/// be read; `Err` means the archive itself is unusable.
fn add_member(
    writer: &mut ZipWriter<File>,
    entry: &ImageEntry,
    source: &Path,
    compression: Compression,
) -> zip::result::ZipResult<bool> {
    let mut file = match File::open(source) {
        Ok(f) => f,
        Err(e) => {
            warn!(member = entry.name(), error = %e, "skipping archive member");
            return Ok(false);
        }
    };
    let meta = match file.metadata() {
        Ok(m) if m.is_file() => m,
        _ => {
            warn!(member = entry.name(), "skipping archive member: not a regular file");
            return Ok(false);
        }
    };

    let mut options = SimpleFileOptions::default()
        .compression_method(compression.into())
        .large_file(meta.len() >= u32::MAX as u64);
    if let Some(mtime) = meta.modified().ok().and_then(zip_timestamp) {
        options = options.last_modified_time(mtime);
    }

    writer.start_file(entry.name(), options)?;
    if let Err(e) = io::copy(&mut file, writer) {
        warn!(member = entry.name(), error = %e, "read failed mid-copy, dropping member");
        writer.abort_file()?;
        return Ok(false);
    }
    Ok(true)
}

fn zip_timestamp(time: std::time::SystemTime) -> Option<zip::DateTime> {
    let local: DateTime<Local> = time.into();
    zip::DateTime::from_date_and_time(
        u16::try_from(local.year()).ok()?,
        local.month() as u8,
        local.day() as u8,
        local.hour() as u8,
        local.minute() as u8,
        local.second() as u8,
    )
    .ok()
}

fn archive_failed(e: impl std::fmt::Display) -> GalleryError {
    GalleryError::ArchiveCreationFailed(e.to_string())
}
