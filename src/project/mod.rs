//! Project root resolution.
//!
//! The root is either given explicitly or found by walking up from the running
//! executable. The process working directory is never consulted.

use crate::error::{ReleaseError, Result};
use crate::manifest::ReleaseManifest;
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

/// Where the project root came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootOrigin {
    /// `--project-root`
    Explicit,
    /// Found above the executable
    Executable,
}

/// Canonical project root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRoot {
    path: PathBuf,
    origin: RootOrigin,
}

impl ProjectRoot {
    /// Use `path` as the project root; it must be an existing directory.
    pub fn explicit(path: &Path) -> Result<Self> {
        let absolute = path
            .absolutize()
            .map_err(|e| ReleaseError::InvalidProjectRoot {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
            .to_path_buf();

        if !absolute.is_dir() {
            return Err(ReleaseError::InvalidProjectRoot {
                path: absolute,
                reason: "not a directory".to_string(),
            });
        }

        let path = absolute
            .canonicalize()
            .map_err(|e| ReleaseError::InvalidProjectRoot {
                path: absolute.clone(),
                reason: format!("failed to canonicalize: {e}"),
            })?;

        Ok(Self {
            path,
            origin: RootOrigin::Explicit,
        })
    }

    /// Nearest ancestor of the running executable that looks like a project root.
    pub fn from_executable() -> Result<Self> {
        let exe = std::env::current_exe()?;
        let exe = exe.canonicalize().unwrap_or(exe);
        Self::search_upwards(&exe)
    }

    /// Nearest ancestor of `start` (inclusive) that looks like a project root.
    pub fn search_upwards(start: &Path) -> Result<Self> {
        start
            .ancestors()
            .find(|dir| ReleaseManifest::looks_like_root(dir))
            .map(|dir| Self {
                path: dir.to_path_buf(),
                origin: RootOrigin::Executable,
            })
            .ok_or_else(|| ReleaseError::ProjectRootNotFound {
                searched_from: start.to_path_buf(),
            })
    }

    /// Explicit root when given, otherwise search from the executable
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::explicit(path),
            None => Self::from_executable(),
        }
    }

    /// Root directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// How the root was found
    pub fn origin(&self) -> RootOrigin {
        self.origin
    }
}
