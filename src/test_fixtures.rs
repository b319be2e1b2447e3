//! Test fixtures shared by the unit tests.
//!
//! Most tests need a scratch cache directory, some pre-installed packages, and a
//! stand-in for npm or esbuild that behaves predictably offline.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_fixtures::{create_temp_dir, seed_packages, fake_npm};
//!
//! let temp = create_temp_dir();
//! seed_packages(temp.path(), &["react", "@scope/ui"]);
//! let npm = fake_npm(temp.path());
//! ```

#![allow(clippy::expect_used)]

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Name of the log the fake npm appends its arguments to, one line per call
pub const NPM_LOG: &str = "npm-invocations.log";

/// Create a temp directory in the system temp location.
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn create_temp_dir() -> TempDir {
    TempDir::new_in(crate::temp::temp_dir_base()).expect("Failed to create temp directory")
}

/// Create files under `base` from (relative path, content) pairs.
///
/// # Panics
///
/// Panics if any file cannot be created.
pub fn create_test_files(base: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let full_path = base.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&full_path, content).expect("Failed to write test file");
    }
}

/// Mark packages as installed in the cache rooted at `cache_root`.
///
/// # Panics
///
/// Panics if a package directory cannot be created.
pub fn seed_packages(cache_root: &Path, names: &[&str]) {
    for name in names {
        std::fs::create_dir_all(cache_root.join("node_modules").join(name))
            .expect("Failed to create package directory");
    }
}

/// Write an executable script into `dir`.
///
/// # Panics
///
/// Panics if the script cannot be written or made executable.
#[cfg(unix)]
pub fn write_executable(dir: &Path, name: &str, script: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, script).expect("Failed to write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to make script executable");
    path
}

/// A stand-in for `npm install --prefix <dir> ... <names>` that creates
/// `node_modules/<name>` for every name and logs each call to [`NPM_LOG`].
#[cfg(unix)]
pub fn fake_npm(dir: &Path) -> PathBuf {
    let script = format!(
        r#"#!/bin/sh
prefix=""
names=""
while [ $# -gt 0 ]; do
  case "$1" in
    install) ;;
    --prefix) shift; prefix="$1" ;;
    -*) ;;
    *) names="$names $1" ;;
  esac
  shift
done
echo "$names" >> "{log}"
for name in $names; do
  dir=$(echo "$name" | sed -E 's/^(@?[^@]+)@.*$/\1/')
  mkdir -p "$prefix/node_modules/$dir"
done
"#,
        log = dir.join(NPM_LOG).display()
    );
    write_executable(dir, "fake-npm", &script)
}

/// A stand-in for npm that prints `output` to stderr and exits 1.
#[cfg(unix)]
pub fn failing_npm(dir: &Path, output: &str) -> PathBuf {
    let script = format!(
        "#!/bin/sh\necho \"$*\" >> \"{log}\"\ncat >&2 <<'EOF'\n{output}\nEOF\nexit 1\n",
        log = dir.join(NPM_LOG).display()
    );
    write_executable(dir, "failing-npm", &script)
}

/// Lines the fake npm logged, one per invocation.
#[must_use]
pub fn npm_invocations(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join(NPM_LOG))
        .map(|log| log.lines().map(|l| l.trim().to_string()).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_temp_dir() {
        let temp = create_temp_dir();
        assert!(temp.path().exists());
    }

    #[test]
    fn test_create_test_files() {
        let temp = create_temp_dir();
        create_test_files(temp.path(), &[("src/app.tsx", "export default 1;")]);
        assert!(temp.path().join("src/app.tsx").is_file());
    }

    #[test]
    fn test_seed_packages_scoped() {
        let temp = create_temp_dir();
        seed_packages(temp.path(), &["@scope/ui"]);
        assert!(temp.path().join("node_modules/@scope/ui").is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_fake_npm_installs_and_logs() {
        let temp = create_temp_dir();
        let npm = fake_npm(temp.path());
        let status = std::process::Command::new(&npm)
            .args(["install", "--prefix"])
            .arg(temp.path())
            .args(["--no-audit", "zod", "@scope/ui", "tailwindcss@3"])
            .status()
            .expect("fake npm runs");
        assert!(status.success());
        assert!(temp.path().join("node_modules/zod").is_dir());
        assert!(temp.path().join("node_modules/@scope/ui").is_dir());
        assert!(temp.path().join("node_modules/tailwindcss").is_dir());
        assert_eq!(npm_invocations(temp.path()), vec!["zod @scope/ui tailwindcss@3"]);
    }
}
