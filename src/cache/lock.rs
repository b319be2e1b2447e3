//! Per-cache-directory install lock
//!
//! Two bundler processes opening different components at the same time may both
//! need to install into the same cache. Installs are serialized by an advisory
//! lock on a file in the cache root. The operating system drops the lock when its
//! holder exits, so a killed invocation never blocks the next one.

use std::path::Path;

use fslock::LockFile;
use log::{debug, info};

use crate::error::{Result, cache};

/// Held for the duration of one install batch
pub struct InstallLock {
    lock: LockFile,
}

impl InstallLock {
    /// Block until the lock at `path` is acquired
    pub fn acquire(path: &Path) -> Result<Self> {
        if let Some(held) = Self::try_acquire(path)? {
            return Ok(held);
        }

        info!("Waiting for another install into the same cache to finish");
        let mut lock = Self::open(path)?;
        lock.lock().map_err(|e| cache::lock_failed(path, e))?;
        debug!("acquired install lock {} after waiting", path.display());
        Ok(Self { lock })
    }

    /// Take the lock at `path` only if nobody holds it
    pub fn try_acquire(path: &Path) -> Result<Option<Self>> {
        let mut lock = Self::open(path)?;
        let acquired = lock.try_lock().map_err(|e| cache::lock_failed(path, e))?;
        if !acquired {
            return Ok(None);
        }
        debug!("acquired install lock {}", path.display());
        Ok(Some(Self { lock }))
    }

    fn open(path: &Path) -> Result<LockFile> {
        LockFile::open(path)
            .map_err(|e| cache::lock_failed(path, format!("failed to open lock file: {e}")))
    }
}

impl Drop for InstallLock {
    fn drop(&mut self) {
        // The file stays; removing it would let a waiter lock an unlinked inode
        if !self.lock.owns_lock() {
            return;
        }
        if let Err(e) = self.lock.unlock() {
            debug!("could not release install lock: {e}");
        }
    }
}
