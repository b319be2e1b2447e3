//! Dependency cache for Terrarium
//!
//! One long-lived directory, shared by every bundler invocation, holds an npm
//! project whose `node_modules` is the package store all components resolve from.
//! A package counts as installed when its directory exists; the manifest contents
//! are never consulted.

pub mod lock;
pub mod paths;

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Serialize;

pub use lock::InstallLock;
pub use paths::{CACHE_DIR_ENV, resolve_cache_dir};

use crate::error::{Result, cache};
use crate::package::PackageName;

/// Package whose absence means the toolchain has never been installed here
const FIRST_RUN_SENTINEL: &str = "react";

#[derive(Serialize)]
struct Manifest {
    name: &'static str,
    private: bool,
}

const MANIFEST: Manifest = Manifest {
    name: "terrarium-cache",
    private: true,
};

/// Handle on a cache directory
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn node_modules(&self) -> PathBuf {
        self.root.join(paths::NODE_MODULES_DIR)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(paths::MANIFEST_FILE)
    }

    /// Path of an executable linked by an installed package
    pub fn bin_path(&self, name: &str) -> PathBuf {
        let dir = self.node_modules().join(paths::BIN_DIR);
        if cfg!(windows) {
            dir.join(format!("{name}.cmd"))
        } else {
            dir.join(name)
        }
    }

    /// Create the cache directory and its manifest if they do not exist yet.
    ///
    /// Safe to call on every run; an existing manifest is never rewritten.
    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| cache::setup_failed(&self.root, e))?;

        let manifest = self.manifest_path();
        if manifest.exists() {
            return Ok(());
        }

        let json = serde_json::to_string_pretty(&MANIFEST)?;
        fs::write(&manifest, json).map_err(|e| cache::setup_failed(&manifest, e))?;
        debug!("created cache manifest {}", manifest.display());
        Ok(())
    }

    /// Directory a package is (or would be) installed into
    pub fn package_dir(&self, name: &PackageName) -> PathBuf {
        name.segments()
            .fold(self.node_modules(), |dir, segment| dir.join(segment))
    }

    /// Whether the package an import specifier refers to is present.
    ///
    /// Sub-paths and version qualifiers are ignored: `@scope/pkg@2/x` checks `@scope/pkg`.
    pub fn is_installed(&self, specifier: &str) -> bool {
        PackageName::from_specifier(specifier).is_some_and(|name| self.has_package(&name))
    }

    pub fn has_package(&self, name: &PackageName) -> bool {
        self.package_dir(name).is_dir()
    }

    /// True until the rendering framework has been installed once
    pub fn needs_install(&self) -> bool {
        !self.is_installed(FIRST_RUN_SENTINEL)
    }

    /// Take the exclusive install lock for this cache directory
    pub fn lock_installs(&self) -> Result<InstallLock> {
        InstallLock::acquire(&self.lock_path())
    }

    pub fn lock_path(&self) -> PathBuf {
        self.root.join(paths::INSTALL_LOCK_FILE)
    }
}
