//! Common test utilities for terrarium-bundler integration tests

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Environment variables that would leak the developer's setup into a test run
const ISOLATED_ENV: &[&str] = &[
    "TERRARIUM_CACHE_DIR",
    "TERRARIUM_NO_STYLES",
    "TERRARIUM_NPM",
    "RUST_LOG",
];

/// A scratch directory holding component files and a private cache
pub struct TestWorkspace {
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to workspace root
    pub path: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Cache directory private to this workspace
    pub fn cache_dir(&self) -> PathBuf {
        self.path.join("cache")
    }

    /// Write a file in workspace
    pub fn write_file(&self, path: &str, content: &str) -> PathBuf {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    /// Copy a component from `tests/fixtures` into the workspace
    #[allow(dead_code)]
    pub fn copy_fixture(&self, name: &str) -> PathBuf {
        let source = fixture_path(name);
        let content = std::fs::read_to_string(&source).expect("Failed to read fixture");
        self.write_file(name, &content)
    }

    /// Mark `names` as installed in the workspace cache
    #[allow(dead_code)]
    pub fn seed_packages(&self, names: &[&str]) {
        for name in names {
            std::fs::create_dir_all(self.cache_dir().join("node_modules").join(name))
                .expect("Failed to seed package");
        }
    }

    /// Bundler command pointed at this workspace's cache
    pub fn terrarium_cmd(&self) -> Command {
        let mut cmd = terrarium_cmd();
        cmd.arg("--cache-dir").arg(self.cache_dir());
        cmd
    }

    /// Write an executable script into the workspace
    #[cfg(unix)]
    #[allow(dead_code)]
    pub fn write_executable(&self, name: &str, script: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.write_file(name, script);
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to make script executable");
        path
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Bundler command with a clean environment
#[allow(deprecated)]
pub fn terrarium_cmd() -> Command {
    let mut cmd = Command::cargo_bin("terrarium-bundler").expect("binary is built");
    for var in ISOLATED_ENV {
        cmd.env_remove(var);
    }
    cmd
}

/// Path of a fixture component under `tests/fixtures`
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Parse stdout as the JSON failure envelope
#[allow(dead_code)]
pub fn parse_envelope(stdout: &[u8]) -> serde_json::Value {
    serde_json::from_slice(stdout).expect("stdout is a JSON envelope")
}
