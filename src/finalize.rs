//! Finalize pass: bundle the harness into the deliverable script

use std::path::Path;

use log::debug;

use crate::engine::{CompileStage, CompilerEngine};
use crate::error::{Result, compile};
use crate::harness::build_harness;

/// Bundle the mount harness for `entry` into one self-executing script.
///
/// Imports resolve relative to the entry's directory. Any engine diagnostic is a
/// hard failure, and so is an empty artifact.
pub fn finalize(engine: &dyn CompilerEngine, entry: &Path) -> Result<String> {
    let harness = build_harness(entry);
    let resolve_dir = entry.parent().unwrap_or_else(|| Path::new("."));

    let script = engine.bundle_source(&harness, resolve_dir)?;
    if script.trim().is_empty() {
        return Err(compile::empty_output(CompileStage::Finalize));
    }

    debug!("finalize produced {} bytes", script.len());
    Ok(script)
}
