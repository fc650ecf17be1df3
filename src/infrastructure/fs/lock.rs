//! Cross-process advisory file lock
//!
//! Serializes cache population of one (asset, version) between threads and
//! processes sharing a cache directory. The lock file itself is never
//! removed: deleting it while another process waits would let two holders
//! lock different inodes.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;
use thiserror::Error;
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
pub enum LockError {
    #[error("timed out after {timeout:?} waiting for lock {}", .path.display())]
    Timeout { path: PathBuf, timeout: Duration },

    #[error("failed to lock {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Held exclusive lock, released on drop
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Block until the lock is acquired or `timeout` elapses
    pub fn acquire(path: &Path, timeout: Duration) -> Result<Self, LockError> {
        let io_err = |source| LockError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
            .map_err(io_err)?;

        let contended = fs2::lock_contended_error().kind();
        let deadline = Instant::now() + timeout;
        let mut waited = false;
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => {
                    if waited {
                        debug!(path = %path.display(), "acquired lock after waiting");
                    }
                    return Ok(Self {
                        file,
                        path: path.to_path_buf(),
                    });
                }
                Err(err) if err.kind() == contended || err.kind() == io::ErrorKind::WouldBlock => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(LockError::Timeout {
                            path: path.to_path_buf(),
                            timeout,
                        });
                    }
                    if !waited {
                        debug!(path = %path.display(), "lock held elsewhere, waiting");
                        waited = true;
                    }
                    thread::sleep(POLL_INTERVAL.min(deadline - now));
                }
                Err(err) => return Err(io_err(err)),
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
