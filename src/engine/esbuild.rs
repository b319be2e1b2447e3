//! esbuild driven as a subprocess from the cache's `node_modules`

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use log::debug;

use super::{CompileStage, CompilerEngine, ImportRecord, diagnostic, metafile};
use crate::cache::CacheStore;
use crate::error::{Result, TerrariumError, compile};
use crate::process::{self, CapturedOutput};

/// Upper bound for a single engine run
const ENGINE_TIMEOUT: Duration = Duration::from_secs(120);

/// Name of the entry module fed over stdin, as shown in diagnostics
const STDIN_SOURCEFILE: &str = "terrarium-entry.tsx";

/// Flags shared by both engine modes
const COMMON_ARGS: &[&str] = &[
    "--bundle",
    "--platform=browser",
    "--jsx=automatic",
    "--jsx-import-source=react",
    "--loader:.js=jsx",
    "--log-level=error",
    "--log-limit=0",
    "--color=false",
];

#[derive(Debug, Clone)]
pub struct Esbuild {
    binary: PathBuf,
    node_modules: PathBuf,
    timeout: Duration,
}

impl Esbuild {
    pub fn new(binary: impl Into<PathBuf>, node_modules: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            node_modules: node_modules.into(),
            timeout: ENGINE_TIMEOUT,
        }
    }

    /// Locate the esbuild installed into `cache`
    pub fn from_cache(cache: &CacheStore) -> Result<Self> {
        let candidates = [
            cache.bin_path("esbuild"),
            cache.node_modules().join("esbuild").join("bin").join("esbuild"),
        ];
        let binary = candidates
            .iter()
            .find(|p| p.is_file())
            .ok_or_else(|| TerrariumError::EngineUnavailable {
                path: candidates[0].display().to_string(),
            })?;
        Ok(Self::new(binary.clone(), cache.node_modules()))
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(COMMON_ARGS).env("NODE_PATH", &self.node_modules);
        cmd
    }

    fn run(&self, stage: CompileStage, cmd: Command, input: Option<Vec<u8>>) -> Result<CapturedOutput> {
        debug!("running esbuild for {stage}: {cmd:?}");
        let output = process::run_with_timeout(cmd, input, self.timeout)
            .map_err(|e| compile::engine_failed(stage, format!("failed to start esbuild: {e}")))?;

        if output.timed_out() {
            return Err(compile::engine_failed(
                stage,
                format!("esbuild timed out after {}s", self.timeout.as_secs()),
            ));
        }
        if !output.success() {
            let diagnostics = diagnostic::parse_diagnostics(&output.stderr);
            if diagnostics.is_empty() {
                return Err(compile::engine_failed(stage, output.combined()));
            }
            return Err(compile::failed(stage, diagnostics));
        }
        Ok(output)
    }
}

impl CompilerEngine for Esbuild {
    fn scan_imports(&self, entry: &Path, externals: &[String]) -> Result<Vec<ImportRecord>> {
        let scratch = tempfile::Builder::new()
            .prefix("terrarium-discovery-")
            .tempdir_in(crate::temp::temp_dir_base())?;
        let metafile_path = scratch.path().join("meta.json");

        let mut cmd = self.command();
        cmd.arg(entry)
            .arg("--format=esm")
            .arg(format!("--outdir={}", scratch.path().join("out").display()))
            .arg(format!("--metafile={}", metafile_path.display()))
            .args(externals.iter().map(|spec| format!("--external:{spec}")));

        self.run(CompileStage::Discovery, cmd, None)?;

        let json = std::fs::read_to_string(&metafile_path)?;
        metafile::parse_imports(&json)
    }

    fn bundle_source(&self, source: &str, resolve_dir: &Path) -> Result<String> {
        let mut cmd = self.command();
        cmd.arg("--format=iife")
            .arg("--loader=tsx")
            .arg(format!("--sourcefile={STDIN_SOURCEFILE}"))
            .current_dir(resolve_dir);

        let output = self.run(
            CompileStage::Finalize,
            cmd,
            Some(source.as_bytes().to_vec()),
        )?;
        Ok(output.stdout)
    }
}
