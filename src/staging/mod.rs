//! Staging directory lifecycle.
//!
//! The staging directory is wiped and refilled on every run, then temporarily
//! renamed to the versioned name while the archive is written.

use crate::error::Result;
use crate::manifest::{SourceEntry, SourceKind};
use crate::utils::fs;
use std::path::{Path, PathBuf};

/// Summary of a populated staging directory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StagingSummary {
    /// Top-level sources copied
    pub sources: usize,
    /// Files, directories and symlinks written below the staging root
    pub entries: usize,
}

/// Delete and recreate the staging directory.
pub async fn reset(staging_dir: &Path) -> Result<()> {
    log::info!("Resetting staging directory {}", staging_dir.display());
    fs::reset_dir(staging_dir).await
}

/// Copy every resolved source into `staging_dir` under its manifest name.
pub async fn populate(staging_dir: &Path, sources: &[SourceEntry]) -> Result<StagingSummary> {
    let mut summary = StagingSummary::default();

    for source in sources {
        let dest = staging_dir.join(&source.name);
        match source.kind {
            SourceKind::Directory => {
                let copied = fs::copy_dir(&source.path, &dest).await?;
                log::debug!("Staged {}/ ({} entries)", source.name, copied);
                summary.entries += copied + 1;
            }
            SourceKind::File => {
                fs::copy_file(&source.path, &dest).await?;
                log::debug!("Staged {}", source.name);
                summary.entries += 1;
            }
        }
        summary.sources += 1;
    }

    Ok(summary)
}

/// Staging directory renamed to its versioned name.
///
/// Dropping the guard without calling [`VersionedStaging::restore`] renames the
/// directory back on a best-effort basis, so a failed run still leaves only the
/// staging name on disk.
#[derive(Debug)]
#[must_use = "the directory is renamed back when the guard is restored or dropped"]
pub struct VersionedStaging {
    staging_dir: PathBuf,
    versioned_dir: PathBuf,
    restored: bool,
}

impl VersionedStaging {
    /// Rename `staging_dir` to `versioned_dir`.
    ///
    /// A leftover `versioned_dir` from an earlier aborted run is removed first.
    pub async fn enter(staging_dir: &Path, versioned_dir: &Path) -> Result<Self> {
        if versioned_dir.exists() {
            log::warn!(
                "Removing leftover {} from an earlier run",
                versioned_dir.display()
            );
            fs::remove_dir_all(versioned_dir).await?;
        }

        fs::rename_dir(staging_dir, versioned_dir).await?;

        Ok(Self {
            staging_dir: staging_dir.to_path_buf(),
            versioned_dir: versioned_dir.to_path_buf(),
            restored: false,
        })
    }

    /// Path the staging content currently lives at
    pub fn path(&self) -> &Path {
        &self.versioned_dir
    }

    /// Rename the versioned directory back to the staging name.
    pub async fn restore(mut self) -> Result<PathBuf> {
        fs::rename_dir(&self.versioned_dir, &self.staging_dir).await?;
        self.restored = true;
        Ok(self.staging_dir.clone())
    }
}

impl Drop for VersionedStaging {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        if let Err(e) = std::fs::rename(&self.versioned_dir, &self.staging_dir) {
            log::warn!(
                "Could not rename {} back to {}: {}",
                self.versioned_dir.display(),
                self.staging_dir.display(),
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as std_fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_populate_copies_dirs_and_files() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        std_fs::create_dir_all(root.join("hack/sub")).unwrap();
        std_fs::write(root.join("hack/sub/a.txt"), "a").unwrap();
        std_fs::write(root.join("Makefile"), "all:").unwrap();

        let sources = vec![
            SourceEntry {
                kind: SourceKind::Directory,
                name: "hack".to_string(),
                path: root.join("hack"),
            },
            SourceEntry {
                kind: SourceKind::File,
                name: "Makefile".to_string(),
                path: root.join("Makefile"),
            },
        ];

        let staging = root.join("output");
        reset(&staging).await.unwrap();
        let summary = populate(&staging, &sources).await.unwrap();

        assert_eq!(summary.sources, 2);
        assert_eq!(summary.entries, 4);
        assert!(staging.join("hack/sub/a.txt").is_file());
        assert!(staging.join("Makefile").is_file());
    }

    #[tokio::test]
    async fn test_restore_renames_back() {
        let tmp = TempDir::new().unwrap();
        let staging = tmp.path().join("output");
        let versioned = tmp.path().join("codeformer_v1.0");
        std_fs::create_dir(&staging).unwrap();

        let guard = VersionedStaging::enter(&staging, &versioned).await.unwrap();
        assert!(versioned.is_dir());
        assert!(!staging.exists());

        guard.restore().await.unwrap();
        assert!(staging.is_dir());
        assert!(!versioned.exists());
    }

    #[tokio::test]
    async fn test_drop_renames_back() {
        let tmp = TempDir::new().unwrap();
        let staging = tmp.path().join("output");
        let versioned = tmp.path().join("codeformer_v1.0");
        std_fs::create_dir(&staging).unwrap();

        {
            let _guard = VersionedStaging::enter(&staging, &versioned).await.unwrap();
        }

        assert!(staging.is_dir());
        assert!(!versioned.exists());
    }

    #[tokio::test]
    async fn test_enter_replaces_leftover() {
        let tmp = TempDir::new().unwrap();
        let staging = tmp.path().join("output");
        let versioned = tmp.path().join("codeformer_v1.0");
        std_fs::create_dir(&staging).unwrap();
        std_fs::write(staging.join("fresh.txt"), "").unwrap();
        std_fs::create_dir(&versioned).unwrap();
        std_fs::write(versioned.join("stale.txt"), "").unwrap();

        let guard = VersionedStaging::enter(&staging, &versioned).await.unwrap();
        assert!(guard.path().join("fresh.txt").exists());
        assert!(!guard.path().join("stale.txt").exists());
        guard.restore().await.unwrap();
    }
}
