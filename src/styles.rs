//! Utility-style synthesis
//!
//! Runs the Tailwind CLI over the finished script so class names used anywhere in
//! the bundle get matching CSS, then prepends a snippet that installs that CSS into
//! the host page. The stage is best-effort: its result is a [`StyleOutcome`], and
//! every outcome other than [`StyleOutcome::Generated`] leaves the script untouched.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use log::{debug, warn};

use crate::cache::CacheStore;
use crate::error::{Result, TerrariumError};
use crate::process;

/// Id of the `<style>` element the injected snippet owns
pub const STYLE_ELEMENT_ID: &str = "terrarium-styles";

/// Stylesheet fed to the generator: reset plus utilities, no components layer
const INPUT_CSS: &str = "@tailwind base;\n@tailwind utilities;\n";

const STYLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Result of one style-synthesis attempt
#[derive(Debug)]
pub enum StyleOutcome {
    /// CSS was generated for the script
    Generated(String),
    /// The generator ran but produced nothing
    Empty,
    /// The generator could not run or failed; absorbed, never surfaced
    Failed(TerrariumError),
}

impl StyleOutcome {
    pub fn is_generated(&self) -> bool {
        matches!(self, Self::Generated(_))
    }

    /// The script to deliver: styled when CSS was generated, otherwise `script` unchanged.
    pub fn apply(self, script: String) -> String {
        match self {
            Self::Generated(css) => inject(&css, &script),
            Self::Empty => {
                warn!("Style generation produced no CSS; continuing without styles");
                script
            }
            Self::Failed(err) => {
                warn!("{err}; continuing without styles");
                script
            }
        }
    }
}

/// Drives the Tailwind CLI installed in the cache
#[derive(Debug, Clone)]
pub struct StyleSynthesizer {
    binary: PathBuf,
    timeout: Duration,
}

impl StyleSynthesizer {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout: STYLE_TIMEOUT,
        }
    }

    pub fn from_cache(cache: &CacheStore) -> Self {
        Self::new(cache.bin_path("tailwindcss"))
    }

    /// Generate CSS for the class names found in `script`.
    pub fn synthesize(&self, script: &str) -> StyleOutcome {
        match self.generate(script) {
            Ok(css) if css.trim().is_empty() => StyleOutcome::Empty,
            Ok(css) => StyleOutcome::Generated(css),
            Err(err) => StyleOutcome::Failed(err),
        }
    }

    fn generate(&self, script: &str) -> Result<String> {
        if !self.binary.is_file() {
            return Err(failure(format!(
                "style generator not found at {}",
                self.binary.display()
            )));
        }

        let scratch = tempfile::Builder::new()
            .prefix("terrarium-styles-")
            .tempdir_in(crate::temp::temp_dir_base())?;
        let input = write_scratch(scratch.path(), "input.css", INPUT_CSS)?;
        let corpus = write_scratch(scratch.path(), "corpus.js", script)?;

        let mut cmd = Command::new(&self.binary);
        cmd.arg("--input")
            .arg(&input)
            .arg("--content")
            .arg(&corpus)
            .current_dir(scratch.path());
        debug!("running {cmd:?}");

        let output = process::run_with_timeout(cmd, None, self.timeout)
            .map_err(|e| failure(format!("failed to start {}: {e}", self.binary.display())))?;

        if output.timed_out() {
            return Err(failure(format!(
                "timed out after {}s",
                self.timeout.as_secs()
            )));
        }
        if !output.success() {
            return Err(failure(output.combined()));
        }
        Ok(output.stdout)
    }
}

/// Prepend the style-installing snippet for `css` to `script`
pub fn inject(css: &str, script: &str) -> String {
    let id = js_literal(STYLE_ELEMENT_ID);
    format!(
        "(() => {{\n  \
           const previous = document.getElementById({id});\n  \
           if (previous) previous.remove();\n  \
           const style = document.createElement('style');\n  \
           style.id = {id};\n  \
           style.textContent = {css};\n  \
           document.head.appendChild(style);\n\
         }})();\n{script}",
        css = js_literal(css),
    )
}

fn js_literal(text: &str) -> String {
    // Keep a literal `</style>` or `</script>` from ending an enclosing HTML element
    serde_json::to_string(text)
        .map(|quoted| quoted.replace("</", "<\\/"))
        .unwrap_or_else(|_| "''".to_string())
}

fn write_scratch(dir: &Path, name: &str, contents: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, contents)?;
    Ok(path)
}

fn failure(reason: impl Into<String>) -> TerrariumError {
    TerrariumError::StyleGenerationFailed {
        reason: reason.into(),
    }
}
