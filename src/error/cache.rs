//! Cache errors

use std::path::Path;

use super::TerrariumError;

/// Creates a cache setup failed error
pub fn setup_failed(path: &Path, reason: impl std::fmt::Display) -> TerrariumError {
    TerrariumError::CacheSetupFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Creates a cache lock failed error
pub fn lock_failed(path: &Path, reason: impl std::fmt::Display) -> TerrariumError {
    TerrariumError::CacheLockFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}
