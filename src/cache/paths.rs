//! Cache path utilities and constants
//!
//! ```text
//! ~/.terrarium/
//! ├── package.json          manifest, written once
//! ├── .install.lock         present while an install runs
//! └── node_modules/
//!     ├── .bin/
//!     ├── react/
//!     └── @scope/pkg/
//! ```

use std::path::PathBuf;

use crate::error::{Result, TerrariumError};

/// Environment variable overriding the cache location
pub const CACHE_DIR_ENV: &str = "TERRARIUM_CACHE_DIR";

/// Default cache directory name under the user's home directory
const CACHE_DIR: &str = ".terrarium";

/// Manifest file that makes the cache directory an npm project
pub const MANIFEST_FILE: &str = "package.json";

/// Directory npm installs packages into
pub const NODE_MODULES_DIR: &str = "node_modules";

/// Directory npm links package executables into
pub const BIN_DIR: &str = ".bin";

/// Lock file serializing installs into one cache directory
pub const INSTALL_LOCK_FILE: &str = ".install.lock";

/// Resolve the cache directory: an explicit override wins, else `~/.terrarium`.
pub fn resolve_cache_dir(override_dir: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = override_dir.filter(|d| !d.as_os_str().is_empty()) {
        return Ok(dir);
    }

    let home = dirs::home_dir().ok_or(TerrariumError::CacheDirUnknown)?;
    Ok(home.join(CACHE_DIR))
}
