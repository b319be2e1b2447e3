//! Base directory for scratch files (discovery metafiles, style corpora).
//!
//! Scratch directories must never land inside the user's project or the shared
//! cache, even when `TMPDIR` is set to a relative path.

use std::env;
use std::path::PathBuf;

/// Absolute directory under which scratch directories are created.
pub fn temp_dir_base() -> PathBuf {
    let t = env::temp_dir();
    if t.is_absolute() {
        return t;
    }

    #[cfg(windows)]
    {
        env::var("TEMP")
            .or_else(|_| env::var("TMP"))
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Windows\\Temp"))
    }
    #[cfg(not(windows))]
    {
        PathBuf::from("/tmp")
    }
}
