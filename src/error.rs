//! Error types for codeformer_release operations.
//!
//! Every failure aborts the run; this module gives each one an actionable
//! message and recovery suggestions for the terminal.

use std::io;
use std::path::{self, PathBuf};
use thiserror::Error;

/// Result type alias for codeformer_release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all packaging operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ReleaseError {
    /// Version string rejected before any path was built from it
    #[error("Invalid version '{version}': {reason}")]
    InvalidVersion {
        /// Version string as given
        version: String,
        /// Reason for the rejection
        reason: String,
    },

    /// No ancestor of the executable looks like the project root
    #[error("Could not find the project root above {searched_from}")]
    ProjectRootNotFound {
        /// Path the upward search started from
        searched_from: PathBuf,
    },

    /// Explicit project root is unusable
    #[error("Invalid project root {path}: {reason}")]
    InvalidProjectRoot {
        /// Path given on the command line
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// A listed source path does not exist
    #[error("Release source {path} does not exist")]
    MissingSource {
        /// Expected source path
        path: PathBuf,
    },

    /// A listed source path exists but is not the expected kind
    #[error("Release source {path} is not a {expected}")]
    WrongSourceKind {
        /// Offending path
        path: PathBuf,
        /// "directory" or "file"
        expected: &'static str,
    },

    /// A source pattern matched nothing
    #[error("No files match '{pattern}' in {root}")]
    NoPatternMatches {
        /// Glob pattern
        pattern: String,
        /// Directory the pattern was evaluated in
        root: PathBuf,
    },

    /// File system error with path context.
    ///
    /// Created by [`ErrorExt::fs_context`].
    #[error("{context} {path}: {error}")]
    Fs {
        /// Operation, e.g. "copying file"
        context: &'static str,
        /// Path that was being accessed
        path: PathBuf,
        /// The underlying I/O error
        error: io::Error,
    },

    /// Packaging lock could not be taken
    #[error("Failed to lock {path}: {reason}")]
    Lock {
        /// Lock file path
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// Path that cannot be written as a zip entry name
    #[error("Cannot store {path} in the archive: file name is not valid UTF-8")]
    UnsupportedPath {
        /// Offending path
        path: PathBuf,
    },

    /// Zip archive errors
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error walking a directory tree
    #[error("{0}")]
    Walk(#[from] walkdir::Error),

    /// Invalid glob pattern
    #[error("{0}")]
    Pattern(#[from] glob::PatternError),

    /// Path prefix stripping error
    #[error("{0}")]
    StripPrefix(#[from] path::StripPrefixError),

    /// Blocking task failed to complete
    #[error("Background task failed: {0}")]
    Task(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::InvalidVersion { .. } => vec![
                "Use only letters, digits, '.' and '-', starting with a letter or digit".to_string(),
                "Example: codeformer_release 1.0.2".to_string(),
            ],
            ReleaseError::ProjectRootNotFound { .. } => vec![
                "Pass the project directory explicitly: --project-root <PATH>".to_string(),
                "The project root must contain basicsr/ and a Makefile".to_string(),
            ],
            ReleaseError::MissingSource { path } | ReleaseError::WrongSourceKind { path, .. } => {
                vec![
                    format!("Restore {} from version control", path.display()),
                    "Check that --project-root points at the CodeFormer checkout".to_string(),
                ]
            }
            ReleaseError::NoPatternMatches { root, .. } => vec![format!(
                "Add at least one Python entry point to {}",
                root.display()
            )],
            ReleaseError::Lock { path, .. } => vec![
                "Wait for the other packaging run to finish".to_string(),
                format!(
                    "If no other run is active, remove the stale lock: rm {}",
                    path.display()
                ),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Whether the run failed before touching the filesystem
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            ReleaseError::InvalidVersion { .. }
                | ReleaseError::ProjectRootNotFound { .. }
                | ReleaseError::InvalidProjectRoot { .. }
                | ReleaseError::MissingSource { .. }
                | ReleaseError::WrongSourceKind { .. }
                | ReleaseError::NoPatternMatches { .. }
                | ReleaseError::Pattern(_)
        )
    }
}

/// Extension trait for filesystem operations with automatic path context.
///
/// ```no_run
/// # use codeformer_release::error::{ErrorExt, Result};
/// # use std::path::Path;
/// fn create_release_dir(path: &Path) -> Result<()> {
///     std::fs::create_dir_all(path).fs_context("creating release directory", path)?;
///     Ok(())
/// }
/// ```
pub trait ErrorExt<T> {
    /// Add filesystem context to an I/O error.
    ///
    /// The `context` should be a present-tense verb phrase describing the operation,
    /// e.g. "reading file", "creating directory".
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| ReleaseError::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

impl From<tokio::task::JoinError> for ReleaseError {
    fn from(error: tokio::task::JoinError) -> Self {
        ReleaseError::Task(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_context_keeps_path() {
        let err = Err::<(), _>(io::Error::new(io::ErrorKind::NotFound, "gone"))
            .fs_context("copying file", "/tmp/x")
            .unwrap_err();
        assert_eq!(err.to_string(), "copying file /tmp/x: gone");
    }

    #[test]
    fn test_preflight_classification() {
        let missing = ReleaseError::MissingSource {
            path: PathBuf::from("hack"),
        };
        assert!(missing.is_preflight());

        let lock = ReleaseError::Lock {
            path: PathBuf::from(".codeformer_release.lock"),
            reason: "held".to_string(),
        };
        assert!(!lock.is_preflight());
        assert_eq!(lock.recovery_suggestions().len(), 2);
    }
}
