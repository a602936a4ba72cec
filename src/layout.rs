//! Paths produced by a packaging run.

use crate::version::ReleaseVersion;
use std::path::{Path, PathBuf};

/// Name of the staging directory, kept on disk after each run
pub const STAGING_DIR_NAME: &str = "output";

/// Name of the directory that receives finished archives
pub const RELEASE_DIR_NAME: &str = "release";

/// Prefix of the versioned directory and archive names
pub const ARTIFACT_PREFIX: &str = "codeformer_v";

/// Lock file guarding the staging lifecycle
pub const LOCK_FILE_NAME: &str = ".codeformer_release.lock";

/// Every path a run reads or writes, derived from the root and the version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseLayout {
    /// Project root
    pub root: PathBuf,
    /// `<root>/output`
    pub staging_dir: PathBuf,
    /// `<root>/codeformer_v<version>`
    pub versioned_dir: PathBuf,
    /// `<root>/codeformer_v<version>.zip`
    pub root_archive: PathBuf,
    /// `<root>/release`
    pub release_dir: PathBuf,
    /// `<root>/release/codeformer_v<version>.zip`
    pub release_archive: PathBuf,
    /// `<root>/.codeformer_release.lock`
    pub lock_file: PathBuf,
    artifact_name: String,
}

impl ReleaseLayout {
    /// Compute the layout for `version` under `root`
    pub fn new(root: &Path, version: &ReleaseVersion) -> Self {
        let artifact_name = format!("{ARTIFACT_PREFIX}{version}");
        let archive_name = format!("{artifact_name}.zip");
        let release_dir = root.join(RELEASE_DIR_NAME);

        Self {
            root: root.to_path_buf(),
            staging_dir: root.join(STAGING_DIR_NAME),
            versioned_dir: root.join(&artifact_name),
            root_archive: root.join(&archive_name),
            release_archive: release_dir.join(&archive_name),
            release_dir,
            lock_file: root.join(LOCK_FILE_NAME),
            artifact_name,
        }
    }

    /// `codeformer_v<version>`: top-level directory name inside the archive
    pub fn artifact_name(&self) -> &str {
        &self.artifact_name
    }
}
