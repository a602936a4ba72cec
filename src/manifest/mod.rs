//! The fixed set of project paths that make up a release.
//!
//! Resolution against a project root is the pre-flight check: it touches
//! nothing, and any absent source fails the run before staging starts.

use crate::error::{ErrorExt, ReleaseError, Result};
use glob::{MatchOptions, Pattern};
use std::io;
use std::path::{Path, PathBuf};

/// Directories copied recursively into every release
pub const RELEASE_DIRECTORIES: &[&str] = &["hack", "basicsr", "facelib", "options", "scripts"];

/// Single files copied into every release
pub const RELEASE_FILES: &[&str] = &["Makefile"];

/// Patterns matched against regular files in the project root
pub const RELEASE_PATTERNS: &[&str] = &["*.py"];

/// Kind of a resolved release source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Copied recursively
    Directory,
    /// Copied as-is
    File,
}

/// A release source that exists on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Directory or file
    pub kind: SourceKind,
    /// Name relative to the project root (and to the staging directory)
    pub name: String,
    /// Absolute source path
    pub path: PathBuf,
}

/// Lists what goes into a release
#[derive(Debug, Clone)]
pub struct ReleaseManifest {
    directories: Vec<String>,
    files: Vec<String>,
    patterns: Vec<String>,
}

impl ReleaseManifest {
    /// The CodeFormer payload: five directories, the Makefile and root `*.py` files
    pub fn codeformer() -> Self {
        Self::new(RELEASE_DIRECTORIES, RELEASE_FILES, RELEASE_PATTERNS)
    }

    /// Build a manifest from explicit lists
    pub fn new(directories: &[&str], files: &[&str], patterns: &[&str]) -> Self {
        Self {
            directories: directories.iter().map(|s| s.to_string()).collect(),
            files: files.iter().map(|s| s.to_string()).collect(),
            patterns: patterns.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Resolve every listed source under `root`.
    ///
    /// Entries come back in manifest order; pattern matches are sorted by name
    /// and skip anything already listed explicitly.
    pub fn resolve(&self, root: &Path) -> Result<Vec<SourceEntry>> {
        let mut entries = Vec::new();

        for name in &self.directories {
            let path = root.join(name);
            require_kind(&path, SourceKind::Directory)?;
            entries.push(SourceEntry {
                kind: SourceKind::Directory,
                name: name.clone(),
                path,
            });
        }

        for name in &self.files {
            let path = root.join(name);
            require_kind(&path, SourceKind::File)?;
            entries.push(SourceEntry {
                kind: SourceKind::File,
                name: name.clone(),
                path,
            });
        }

        for pattern in &self.patterns {
            let matches = match_root_files(root, pattern)?;
            if matches.is_empty() {
                return Err(ReleaseError::NoPatternMatches {
                    pattern: pattern.clone(),
                    root: root.to_path_buf(),
                });
            }
            for name in matches {
                if entries.iter().any(|e| e.name == name) {
                    continue;
                }
                entries.push(SourceEntry {
                    kind: SourceKind::File,
                    path: root.join(&name),
                    name,
                });
            }
        }

        log::debug!("Resolved {} release sources under {}", entries.len(), root.display());
        Ok(entries)
    }

    /// Whether `dir` carries the markers of a project root
    pub fn looks_like_root(dir: &Path) -> bool {
        dir.join("basicsr").is_dir() && dir.join("Makefile").is_file()
    }
}

fn require_kind(path: &Path, expected: SourceKind) -> Result<()> {
    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ReleaseError::MissingSource {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(e).fs_context("inspecting release source", path),
    };

    match expected {
        SourceKind::Directory if !metadata.is_dir() => Err(ReleaseError::WrongSourceKind {
            path: path.to_path_buf(),
            expected: "directory",
        }),
        SourceKind::File if !metadata.is_file() => Err(ReleaseError::WrongSourceKind {
            path: path.to_path_buf(),
            expected: "file",
        }),
        _ => Ok(()),
    }
}

/// Names of regular files directly in `root` matching `pattern`, shell style
/// (a leading dot must be matched literally).
fn match_root_files(root: &Path, pattern: &str) -> Result<Vec<String>> {
    let pattern = Pattern::new(pattern)?;
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };

    let mut names = Vec::new();
    for entry in std::fs::read_dir(root).fs_context("listing project root", root)? {
        let entry = entry.fs_context("listing project root", root)?;
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if !pattern.matches_with(&name, options) {
            continue;
        }
        let path = entry.path();
        if path.is_file() {
            names.push(name);
        } else {
            log::debug!("Skipping non-file match {}", path.display());
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        for d in RELEASE_DIRECTORIES {
            fs::create_dir(dir.path().join(d)).unwrap();
        }
        fs::write(dir.path().join("Makefile"), "all:\n").unwrap();
        fs::write(dir.path().join("inference.py"), "").unwrap();
        fs::write(dir.path().join("app.py"), "").unwrap();
        dir
    }

    #[test]
    fn test_resolve_in_manifest_order() {
        let dir = project();
        let entries = ReleaseManifest::codeformer().resolve(dir.path()).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            ["hack", "basicsr", "facelib", "options", "scripts", "Makefile", "app.py", "inference.py"]
        );
        assert_eq!(entries[0].kind, SourceKind::Directory);
        assert_eq!(entries[5].kind, SourceKind::File);
    }

    #[test]
    fn test_missing_directory_is_error() {
        let dir = project();
        fs::remove_dir(dir.path().join("facelib")).unwrap();
        let err = ReleaseManifest::codeformer().resolve(dir.path()).unwrap_err();
        assert!(matches!(err, ReleaseError::MissingSource { path } if path.ends_with("facelib")));
    }

    #[test]
    fn test_file_where_directory_expected() {
        let dir = project();
        fs::remove_dir(dir.path().join("hack")).unwrap();
        fs::write(dir.path().join("hack"), "").unwrap();
        let err = ReleaseManifest::codeformer().resolve(dir.path()).unwrap_err();
        assert!(matches!(err, ReleaseError::WrongSourceKind { expected: "directory", .. }));
    }

    #[test]
    fn test_no_python_files_is_error() {
        let dir = project();
        fs::remove_file(dir.path().join("inference.py")).unwrap();
        fs::remove_file(dir.path().join("app.py")).unwrap();
        let err = ReleaseManifest::codeformer().resolve(dir.path()).unwrap_err();
        assert!(matches!(err, ReleaseError::NoPatternMatches { .. }));
    }

    #[test]
    fn test_pattern_skips_hidden_and_nested() {
        let dir = project();
        fs::write(dir.path().join(".secret.py"), "").unwrap();
        fs::create_dir(dir.path().join("pkg.py")).unwrap();
        fs::write(dir.path().join("basicsr/train.py"), "").unwrap();
        let entries = ReleaseManifest::codeformer().resolve(dir.path()).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert!(!names.contains(&".secret.py"));
        assert!(!names.contains(&"pkg.py"));
        assert!(!names.contains(&"train.py"));
    }

    #[test]
    fn test_looks_like_root() {
        let dir = project();
        assert!(ReleaseManifest::looks_like_root(dir.path()));
        assert!(!ReleaseManifest::looks_like_root(&dir.path().join("hack")));
    }
}
