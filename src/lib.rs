//! # CodeFormer Release
//!
//! Release packaging for the CodeFormer project tree.
//!
//! A run stages a fixed set of project paths into `output/`, archives them as
//! `codeformer_v<version>.zip` with a single top-level `codeformer_v<version>/`
//! directory, and moves the archive into `release/`.
//!
//! ## Features
//!
//! - **Validated versions**: the version string is checked against an allow-list
//!   before any path is built from it
//! - **Explicit project root**: given on the command line or found above the
//!   executable, never taken from the working directory
//! - **All-or-nothing**: missing sources fail before anything is touched, and a
//!   failed run leaves no partial archive behind
//! - **Exclusive runs**: an advisory lock serializes runs on the same tree
//!
//! ## Usage
//!
//! ```bash
//! codeformer_release 1.0.2
//! codeformer_release 1.0.2 --project-root /path/to/CodeFormer
//! codeformer_release 1.0.2 --dry-run
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Core modules
pub mod archive;
pub mod cli;
pub mod error;
pub mod layout;
pub mod lock;
pub mod manifest;
pub mod packager;
pub mod project;
pub mod staging;
pub mod utils;
pub mod version;

// Re-export main types for public API
pub use cli::Args;
pub use error::{ReleaseError, Result};
pub use layout::ReleaseLayout;
pub use manifest::ReleaseManifest;
pub use packager::{PackagePlan, package, plan};
pub use project::ProjectRoot;
pub use version::ReleaseVersion;

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for packaging runs
#[derive(Debug, Clone)]
pub struct PackageConfig {
    /// Project root every path is resolved against
    pub project_root: PathBuf,
    /// Paths that make up the release
    pub manifest: ReleaseManifest,
    /// How long to wait for a concurrent run to finish
    pub lock_timeout: Duration,
}

impl PackageConfig {
    /// Default CodeFormer configuration rooted at `project_root`
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            manifest: ReleaseManifest::codeformer(),
            lock_timeout: lock::DEFAULT_LOCK_TIMEOUT,
        }
    }
}

/// Result of a packaging run
#[derive(Debug, Clone)]
pub struct PackageReport {
    /// Packaged version
    pub version: ReleaseVersion,
    /// Final artifact, `release/codeformer_v<version>.zip`
    pub release_archive: PathBuf,
    /// Staging directory left on disk, `output/`
    pub staging_dir: PathBuf,
    /// Top-level sources copied
    pub sources_staged: usize,
    /// Entries in the archive
    pub archive_entries: usize,
    /// Archive size in bytes
    pub archive_size_bytes: u64,
}
