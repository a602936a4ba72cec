//! Exclusive lock around the staging lifecycle.
//!
//! Two runs against the same project root would race on `output/` and on the
//! archive name. The lock file is held with an advisory `flock` for the whole
//! run and carries the holder's pid for diagnostics.

use crate::error::{ReleaseError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Default time to wait for another run to release the lock
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_millis(5000);

const RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// Metadata written into the lock file by its holder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// Process ID of the holder
    pub pid: u32,
    /// RFC 3339 timestamp of acquisition
    pub acquired_at: String,
}

#[cfg(unix)]
type LockHandle = nix::fcntl::Flock<fs::File>;

#[cfg(not(unix))]
type LockHandle = fs::File;

/// Held packaging lock; released when dropped
pub struct PackageLock {
    path: PathBuf,
    /// Must stay open for the lock to remain held.
    _handle: LockHandle,
}

impl std::fmt::Debug for PackageLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackageLock").field("path", &self.path).finish()
    }
}

impl PackageLock {
    /// Acquire the lock at `path`, retrying until `timeout` elapses.
    pub async fn acquire(path: &Path, timeout: Duration) -> Result<Self> {
        let start = Instant::now();

        loop {
            if let Some(lock) = Self::try_acquire(path)? {
                log::debug!("Acquired packaging lock {}", path.display());
                return Ok(lock);
            }

            if start.elapsed() >= timeout {
                let holder = Self::read_info(path)
                    .map(|info| format!("held by pid {} since {}", info.pid, info.acquired_at))
                    .unwrap_or_else(|| "held by another process".to_string());
                return Err(ReleaseError::Lock {
                    path: path.to_path_buf(),
                    reason: format!("timed out after {}ms, {}", timeout.as_millis(), holder),
                });
            }

            log::debug!("Packaging lock busy, waiting...");
            tokio::time::sleep(RETRY_INTERVAL).await;
        }
    }

    /// Lock file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read holder metadata from a lock file, if any
    pub fn read_info(path: &Path) -> Option<LockInfo> {
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    #[cfg(unix)]
    fn try_acquire(path: &Path) -> Result<Option<Self>> {
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| lock_error(path, format!("failed to open lock file: {e}")))?;

        Self::lock_opened(path, file)
    }

    /// Lock an already opened lock file.
    ///
    /// The holder unlinks the file on release, so a handle opened before that
    /// can lock an orphaned inode. The lock only counts if `path` still names
    /// the locked file.
    #[cfg(unix)]
    fn lock_opened(path: &Path, file: fs::File) -> Result<Option<Self>> {
        use nix::errno::Errno;
        use nix::fcntl::{Flock, FlockArg};
        use std::os::unix::fs::MetadataExt;

        let handle = match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(handle) => handle,
            Err((_, e)) if e == Errno::EWOULDBLOCK => return Ok(None),
            Err((_, e)) => return Err(lock_error(path, format!("flock error: {e}"))),
        };

        let locked = handle
            .metadata()
            .map_err(|e| lock_error(path, format!("failed to stat lock file: {e}")))?;
        match fs::metadata(path) {
            Ok(current) if current.dev() == locked.dev() && current.ino() == locked.ino() => {
                Ok(Some(Self::hold(path, handle)?))
            }
            Ok(_) => {
                log::debug!("Lock file {} was replaced, retrying", path.display());
                Ok(None)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("Lock file {} was removed, retrying", path.display());
                Ok(None)
            }
            Err(e) => Err(lock_error(path, format!("failed to stat lock file: {e}"))),
        }
    }

    #[cfg(not(unix))]
    fn try_acquire(path: &Path) -> Result<Option<Self>> {
        match fs::OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => Ok(Some(Self::hold(path, file)?)),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(None),
            Err(e) => Err(lock_error(path, format!("failed to create lock file: {e}"))),
        }
    }

    fn hold(path: &Path, mut handle: LockHandle) -> Result<Self> {
        let info = LockInfo {
            pid: std::process::id(),
            acquired_at: chrono::Utc::now().to_rfc3339(),
        };
        let data = serde_json::to_string(&info)
            .map_err(|e| lock_error(path, format!("failed to serialize lock data: {e}")))?;

        write_info(&mut handle, &data)
            .map_err(|e| lock_error(path, format!("failed to write lock file: {e}")))?;

        Ok(Self {
            path: path.to_path_buf(),
            _handle: handle,
        })
    }
}

impl Drop for PackageLock {
    fn drop(&mut self) {
        // Unlink while the lock is still held; the handle closes afterwards.
        let _ = fs::remove_file(&self.path);
    }
}

fn write_info(file: &mut fs::File, data: &str) -> std::io::Result<()> {
    file.set_len(0)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()
}

fn lock_error(path: &Path, reason: String) -> ReleaseError {
    ReleaseError::Lock {
        path: path.to_path_buf(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_acquire_writes_info_and_cleans_up() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".codeformer_release.lock");

        let lock = PackageLock::acquire(&path, DEFAULT_LOCK_TIMEOUT).await.unwrap();
        let info = PackageLock::read_info(lock.path()).unwrap();
        assert_eq!(info.pid, std::process::id());

        drop(lock);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_second_acquire_times_out() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".codeformer_release.lock");

        let _held = PackageLock::acquire(&path, DEFAULT_LOCK_TIMEOUT).await.unwrap();
        let err = PackageLock::acquire(&path, Duration::from_millis(250))
            .await
            .unwrap_err();
        assert!(matches!(err, ReleaseError::Lock { .. }));
        assert!(err.to_string().contains("timed out"));
    }

    #[cfg(unix)]
    fn open_lock_file(path: &Path) -> fs::File {
        fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .unwrap()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_handle_opened_before_release_cannot_share_lock() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".codeformer_release.lock");

        let first = PackageLock::acquire(&path, DEFAULT_LOCK_TIMEOUT).await.unwrap();
        let stale = open_lock_file(&path);
        drop(first);

        let current = PackageLock::acquire(&path, DEFAULT_LOCK_TIMEOUT).await.unwrap();
        assert!(PackageLock::lock_opened(&path, stale).unwrap().is_none());

        assert!(PackageLock::try_acquire(&path).unwrap().is_none());
        drop(current);
        assert!(PackageLock::try_acquire(&path).unwrap().is_some());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_handle_on_removed_file_is_not_a_lock() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".codeformer_release.lock");

        let first = PackageLock::acquire(&path, DEFAULT_LOCK_TIMEOUT).await.unwrap();
        let stale = open_lock_file(&path);
        drop(first);

        assert!(!path.exists());
        assert!(PackageLock::lock_opened(&path, stale).unwrap().is_none());
    }
}
