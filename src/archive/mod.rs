//! Zip archive creation for the versioned staging directory.
//!
//! The archive holds a single top-level directory named after the artifact,
//! mirroring `zip -r <name>.zip <name>` run from the project root.

use crate::error::{ErrorExt, ReleaseError, Result};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Component, Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Files at or above this size need zip64 headers
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// Summary of a written archive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveSummary {
    /// Entries written, the top-level directory included
    pub entries: usize,
    /// Size of the finished archive in bytes
    pub size_bytes: u64,
}

/// Zip `source_dir` into `archive_path`, nesting everything under `top_level/`.
///
/// An existing archive at `archive_path` is truncated. Runs on the blocking pool.
pub async fn write_zip(source_dir: &Path, archive_path: &Path, top_level: &str) -> Result<ArchiveSummary> {
    let source_dir = source_dir.to_path_buf();
    let archive_path = archive_path.to_path_buf();
    let top_level = top_level.to_string();

    tokio::task::spawn_blocking(move || write_zip_blocking(&source_dir, &archive_path, &top_level))
        .await?
}

fn write_zip_blocking(source_dir: &Path, archive_path: &Path, top_level: &str) -> Result<ArchiveSummary> {
    log::info!(
        "Archiving {} into {}",
        source_dir.display(),
        archive_path.display()
    );

    let file = File::create(archive_path).fs_context("creating archive", archive_path)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let base = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut entries = 0;
    for entry in walkdir::WalkDir::new(source_dir)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry?;
        let rel_path = entry.path().strip_prefix(source_dir)?;
        let name = entry_name(top_level, rel_path)?;
        let metadata = entry.metadata()?;
        let options = with_permissions(base, &metadata);

        if metadata.is_dir() {
            zip.add_directory(format!("{name}/"), options)?;
        } else {
            let options = options.large_file(metadata.len() >= ZIP64_THRESHOLD);
            zip.start_file(name.clone(), options)?;
            let mut src = File::open(entry.path()).fs_context("reading file", entry.path())?;
            io::copy(&mut src, &mut zip).fs_context("compressing file", entry.path())?;
            log::debug!("Added {name}");
        }
        entries += 1;
    }

    let mut writer = zip.finish()?;
    io::Write::flush(&mut writer).fs_context("writing archive", archive_path)?;
    drop(writer);

    let size_bytes = std::fs::metadata(archive_path)
        .fs_context("inspecting archive", archive_path)?
        .len();

    Ok(ArchiveSummary { entries, size_bytes })
}

/// `top_level/a/b` with `/` separators regardless of platform
fn entry_name(top_level: &str, rel_path: &Path) -> Result<String> {
    let mut name = top_level.to_string();
    for component in rel_path.components() {
        if let Component::Normal(part) = component {
            let part = part.to_str().ok_or_else(|| ReleaseError::UnsupportedPath {
                path: rel_path.to_path_buf(),
            })?;
            name.push('/');
            name.push_str(part);
        }
    }
    Ok(name)
}

#[cfg(unix)]
fn with_permissions(options: SimpleFileOptions, metadata: &std::fs::Metadata) -> SimpleFileOptions {
    use std::os::unix::fs::PermissionsExt;
    options.unix_permissions(metadata.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn with_permissions(options: SimpleFileOptions, _metadata: &std::fs::Metadata) -> SimpleFileOptions {
    options
}

/// Archive written to the project root, deleted on drop unless handed off.
///
/// Keeps a failed run from leaving a partial zip behind.
#[derive(Debug)]
#[must_use = "the archive is deleted when the guard is dropped"]
pub struct PendingArchive {
    path: PathBuf,
    armed: bool,
}

impl PendingArchive {
    /// Track `path` for removal
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            armed: true,
        }
    }

    /// Path of the pending archive
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stop tracking; the caller now owns the file
    pub fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingArchive {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => log::debug!("Removed partial archive {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Could not remove {}: {}", self.path.display(), e),
        }
    }
}
