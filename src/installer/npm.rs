//! npm subprocess calls and interpretation of their failures

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use log::debug;

use crate::error::classify::{NETWORK_MARKERS, contains_any};
use crate::error::{Result, TerrariumError, install};
use crate::package::PackageName;
use crate::process;
use crate::progress::InstallSpinner;

/// Output fragments npm prints when a requested package does not exist
const NOT_IN_REGISTRY_MARKERS: &[&str] = &[
    "E404",
    "404 Not Found",
    "is not in this registry",
    "is not in the npm registry",
    "ETARGET",
    "No matching version found",
];

/// Lines of package-manager output kept in error messages
const OUTPUT_TAIL_LINES: usize = 20;

/// A package manager that installs into a prefix directory
#[derive(Debug, Clone)]
pub struct PackageManager {
    program: PathBuf,
    timeout: Duration,
}

impl PackageManager {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Install `specifiers` into `prefix` in one call
    pub fn install(&self, prefix: &Path, specifiers: &[String]) -> Result<()> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("install")
            .arg("--prefix")
            .arg(prefix)
            .args(["--no-audit", "--no-fund", "--loglevel=error"])
            .args(specifiers);
        debug!("running {cmd:?}");

        let spinner = InstallSpinner::start(specifiers);
        let output = match process::run_with_timeout(cmd, None, self.timeout) {
            Ok(output) => output,
            Err(e) => {
                spinner.abandon();
                return Err(install::unavailable(self.program.display().to_string(), e));
            }
        };

        if output.success() {
            spinner.finish();
            return Ok(());
        }
        spinner.abandon();

        if output.timed_out() {
            return Err(install::timed_out(specifiers, self.timeout.as_secs()));
        }
        Err(interpret_failure(specifiers, &output.combined()))
    }
}

/// Turn a failed install's captured output into a typed error
pub fn interpret_failure(specifiers: &[String], output: &str) -> TerrariumError {
    let tail = tail_lines(output, OUTPUT_TAIL_LINES);

    if contains_any(output, NETWORK_MARKERS) {
        return install::network_failed(specifiers, tail);
    }

    if contains_any(output, NOT_IN_REGISTRY_MARKERS) {
        let package = offending_package(specifiers, output)
            .unwrap_or_else(|| specifiers.join(", "));
        return install::not_in_registry(package, tail);
    }

    install::failed(specifiers, tail)
}

/// The requested package named in `output`, preferring the longest match
/// so `react-dom` wins over `react`.
fn offending_package(specifiers: &[String], output: &str) -> Option<String> {
    specifiers
        .iter()
        .filter_map(|spec| PackageName::from_specifier(spec))
        .filter(|name| {
            output.contains(name.as_str()) || output.contains(&name.as_str().replace('/', "%2f"))
        })
        .max_by_key(|name| name.as_str().len())
        .map(|name| name.to_string())
}

fn tail_lines(output: &str, count: usize) -> String {
    let lines: Vec<&str> = output.lines().collect();
    let start = lines.len().saturating_sub(count);
    lines[start..].join("\n")
}
