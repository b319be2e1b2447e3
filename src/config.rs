//! Bundler configuration
//!
//! Everything a run needs to know about its environment is resolved once, at the
//! CLI boundary, and passed down explicitly.

use std::path::PathBuf;
use std::time::Duration;

/// Bound on a single package-manager call
pub const DEFAULT_INSTALL_TIMEOUT: Duration = Duration::from_secs(120);

/// Package manager used when none is configured
pub const DEFAULT_PACKAGE_MANAGER: &str = if cfg!(windows) { "npm.cmd" } else { "npm" };

#[derive(Debug, Clone)]
pub struct BundlerConfig {
    /// Shared dependency cache
    pub cache_dir: PathBuf,
    /// Whether the utility-style stage runs (and its engine is part of the baseline)
    pub styles: bool,
    /// Package manager executable
    pub package_manager: PathBuf,
    pub install_timeout: Duration,
}

impl BundlerConfig {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            styles: true,
            package_manager: PathBuf::from(DEFAULT_PACKAGE_MANAGER),
            install_timeout: DEFAULT_INSTALL_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_styles(mut self, styles: bool) -> Self {
        self.styles = styles;
        self
    }

    #[must_use]
    pub fn with_package_manager(mut self, program: impl Into<PathBuf>) -> Self {
        self.package_manager = program.into();
        self
    }

    #[must_use]
    pub fn with_install_timeout(mut self, timeout: Duration) -> Self {
        self.install_timeout = timeout;
        self
    }
}
