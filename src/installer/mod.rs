//! Dependency installation into the shared cache
//!
//! Installs happen in two batches per run: the toolchain baseline before discovery,
//! and the discovered missing packages after it. Each batch:
//! - drops names the cache already has, and names already requested this run
//! - skips the package manager entirely when nothing is left
//! - holds the cache's install lock while the package manager runs
//! - fails as a whole if the package manager fails

pub mod npm;

use std::collections::BTreeSet;

use log::{debug, info};

pub use npm::PackageManager;

use crate::cache::CacheStore;
use crate::config::BundlerConfig;
use crate::discovery::MissingSet;
use crate::error::Result;
use crate::package::PackageName;

/// Compiler engine driven by discovery and finalize
pub const COMPILER_ENGINE: &str = "esbuild";

/// Rendering framework the harness mounts with
pub const RENDER_FRAMEWORK: &[&str] = &["react", "react-dom"];

/// Utility-style generator, pinned to the major version whose CLI we drive
pub const STYLE_ENGINE: &str = "tailwindcss@3";

/// Baseline package specifiers every run needs
pub fn base_packages(styles: bool) -> Vec<&'static str> {
    let mut packages = vec![COMPILER_ENGINE];
    packages.extend_from_slice(RENDER_FRAMEWORK);
    if styles {
        packages.push(STYLE_ENGINE);
    }
    packages
}

/// Installs batches of packages into one cache, at most once per name per run
#[derive(Debug)]
pub struct DependencyInstaller<'a> {
    cache: &'a CacheStore,
    package_manager: PackageManager,
    requested: BTreeSet<PackageName>,
    invocations: usize,
}

impl<'a> DependencyInstaller<'a> {
    pub fn new(cache: &'a CacheStore, package_manager: PackageManager) -> Self {
        Self {
            cache,
            package_manager,
            requested: BTreeSet::new(),
            invocations: 0,
        }
    }

    pub fn from_config(cache: &'a CacheStore, config: &BundlerConfig) -> Self {
        Self::new(
            cache,
            PackageManager::new(&config.package_manager, config.install_timeout),
        )
    }

    /// Number of package-manager calls made so far
    pub fn invocations(&self) -> usize {
        self.invocations
    }

    /// Install whatever part of the toolchain baseline is missing
    pub fn install_base(&mut self, styles: bool) -> Result<Vec<PackageName>> {
        let specifiers: Vec<String> = base_packages(styles)
            .into_iter()
            .map(str::to_string)
            .collect();
        self.install_batch(&specifiers)
    }

    /// Install the packages discovery found missing
    pub fn install_missing(&mut self, missing: &MissingSet) -> Result<Vec<PackageName>> {
        let specifiers: Vec<String> = missing.iter().map(ToString::to_string).collect();
        self.install_batch(&specifiers)
    }

    /// Install `specifiers` in one package-manager call; returns the names installed.
    pub fn install_batch(&mut self, specifiers: &[String]) -> Result<Vec<PackageName>> {
        let mut pending = self.pending(specifiers);
        if pending.is_empty() {
            debug!("nothing to install for {specifiers:?}");
            return Ok(Vec::new());
        }

        let _lock = self.cache.lock_installs()?;

        // Another process may have installed some of them while we waited
        pending.retain(|(_, name)| !self.cache.has_package(name));
        if pending.is_empty() {
            debug!("packages were installed by another process");
            return Ok(Vec::new());
        }

        let (batch, names): (Vec<String>, Vec<PackageName>) = pending.into_iter().unzip();
        self.requested.extend(names.iter().cloned());

        info!("Installing: {}", batch.join(" "));
        self.invocations += 1;
        self.package_manager.install(self.cache.root(), &batch)?;

        Ok(names)
    }

    /// Specifiers still needing an install, paired with their package names
    fn pending(&self, specifiers: &[String]) -> Vec<(String, PackageName)> {
        let mut seen = BTreeSet::new();
        specifiers
            .iter()
            .filter_map(|spec| PackageName::from_specifier(spec).map(|name| (spec.clone(), name)))
            .filter(|(_, name)| {
                !self.requested.contains(name)
                    && !self.cache.has_package(name)
                    && seen.insert(name.clone())
            })
            .collect()
    }
}
