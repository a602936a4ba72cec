//! File system utilities for staging and releasing.
//!
//! Every helper annotates I/O failures with the operation and the path.

use crate::error::{ErrorExt, ReleaseError, Result};
use std::io;
use std::path::Path;
use tokio::fs;

/// Removes the directory and its contents if it exists.
pub async fn remove_dir_all(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).fs_context("removing directory", path),
    }
}

/// Removes a file if it exists.
pub async fn remove_file(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).fs_context("removing file", path),
    }
}

/// Deletes `path` if present and recreates it empty.
pub async fn reset_dir(path: &Path) -> Result<()> {
    remove_dir_all(path).await?;
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Creates all of the directories of the specified path.
pub async fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Makes a symbolic link to a directory.
#[cfg(unix)]
fn symlink_dir(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

/// Makes a symbolic link to a directory.
#[cfg(windows)]
fn symlink_dir(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(src, dst)
}

/// Makes a symbolic link to a file.
#[cfg(unix)]
fn symlink_file(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

/// Makes a symbolic link to a file.
#[cfg(windows)]
fn symlink_file(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(src, dst)
}

/// Copies a regular file from one path to another, creating any parent
/// directories of the destination path as necessary.
///
/// Fails if the source path is a directory or doesn't exist.
pub async fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if !from.exists() {
        return Err(ReleaseError::MissingSource {
            path: from.to_path_buf(),
        });
    }
    if !from.is_file() {
        return Err(ReleaseError::WrongSourceKind {
            path: from.to_path_buf(),
            expected: "file",
        });
    }
    if let Some(dest_dir) = to.parent() {
        create_dir_all(dest_dir).await?;
    }
    fs::copy(from, to).await.fs_context("copying file", from)?;
    Ok(())
}

/// Recursively copies a directory from one path to another, creating any
/// parent directories of the destination path as necessary.
///
/// Preserves symlinks. Returns the number of entries copied below `from`.
pub async fn copy_dir(from: &Path, to: &Path) -> Result<usize> {
    if !from.exists() {
        return Err(ReleaseError::MissingSource {
            path: from.to_path_buf(),
        });
    }
    if !from.is_dir() {
        return Err(ReleaseError::WrongSourceKind {
            path: from.to_path_buf(),
            expected: "directory",
        });
    }
    if let Some(parent) = to.parent() {
        create_dir_all(parent).await?;
    }

    let mut copied = 0;
    for entry in walkdir::WalkDir::new(from).sort_by_file_name() {
        let entry = entry?;
        debug_assert!(entry.path().starts_with(from));
        let rel_path = entry.path().strip_prefix(from)?;
        let dest_path = to.join(rel_path);

        if entry.file_type().is_symlink() {
            let target = fs::read_link(entry.path())
                .await
                .fs_context("reading symlink", entry.path())?;
            if entry.path().is_dir() {
                symlink_dir(&target, &dest_path).fs_context("creating symlink", &dest_path)?;
            } else {
                symlink_file(&target, &dest_path).fs_context("creating symlink", &dest_path)?;
            }
        } else if entry.file_type().is_dir() {
            create_dir_all(&dest_path).await?;
        } else {
            fs::copy(entry.path(), &dest_path)
                .await
                .fs_context("copying file", entry.path())?;
        }

        if entry.depth() > 0 {
            copied += 1;
        }
    }

    Ok(copied)
}

/// Renames a directory. Fails if `to` already exists as a non-empty directory.
pub async fn rename_dir(from: &Path, to: &Path) -> Result<()> {
    fs::rename(from, to).await.fs_context("renaming directory", from)
}

/// Moves a file into place, replacing whatever file is already at `to`.
pub async fn move_file(from: &Path, to: &Path) -> Result<()> {
    if cfg!(windows) {
        remove_file(to).await?;
    }
    fs::rename(from, to).await.fs_context("moving file", from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as std_fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_reset_dir_clears_contents() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("output");
        std_fs::create_dir_all(dir.join("stale/nested")).unwrap();
        std_fs::write(dir.join("stale/old.txt"), "old").unwrap();

        reset_dir(&dir).await.unwrap();

        assert!(dir.is_dir());
        assert_eq!(std_fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_copy_dir_preserves_structure() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("basicsr");
        std_fs::create_dir_all(src.join("archs")).unwrap();
        std_fs::write(src.join("__init__.py"), "x").unwrap();
        std_fs::write(src.join("archs/arch.py"), "y").unwrap();

        let dst = tmp.path().join("output/basicsr");
        let copied = copy_dir(&src, &dst).await.unwrap();

        assert_eq!(copied, 3);
        assert_eq!(std_fs::read_to_string(dst.join("archs/arch.py")).unwrap(), "y");
        assert_eq!(std_fs::read_to_string(dst.join("__init__.py")).unwrap(), "x");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_copy_dir_keeps_symlinks() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("scripts");
        std_fs::create_dir_all(&src).unwrap();
        std_fs::write(src.join("run.sh"), "echo").unwrap();
        std::os::unix::fs::symlink("run.sh", src.join("latest.sh")).unwrap();

        let dst = tmp.path().join("copy");
        copy_dir(&src, &dst).await.unwrap();

        let meta = std_fs::symlink_metadata(dst.join("latest.sh")).unwrap();
        assert!(meta.file_type().is_symlink());
    }

    #[tokio::test]
    async fn test_copy_file_rejects_directory() {
        let tmp = TempDir::new().unwrap();
        let err = copy_file(tmp.path(), &tmp.path().join("x")).await.unwrap_err();
        assert!(matches!(err, ReleaseError::WrongSourceKind { .. }));
    }

    #[tokio::test]
    async fn test_move_file_replaces_existing() {
        let tmp = TempDir::new().unwrap();
        let from = tmp.path().join("a.zip");
        let to = tmp.path().join("b.zip");
        std_fs::write(&from, "new").unwrap();
        std_fs::write(&to, "old").unwrap();

        move_file(&from, &to).await.unwrap();

        assert!(!from.exists());
        assert_eq!(std_fs::read_to_string(&to).unwrap(), "new");
    }
}
