//! Compiler engine errors

use super::TerrariumError;
use crate::engine::{CompileStage, Diagnostic};

/// Creates a compile failure from the engine's diagnostics
pub fn failed(stage: CompileStage, diagnostics: Vec<Diagnostic>) -> TerrariumError {
    let message = match diagnostics.as_slice() {
        [] => format!("{stage} failed"),
        [only] => format!("Build failed with 1 error: {only}"),
        [first, rest @ ..] => format!(
            "Build failed with {} errors: {first} (and {} more)",
            rest.len() + 1,
            rest.len()
        ),
    };
    TerrariumError::CompileFailed {
        stage,
        message,
        diagnostics,
    }
}

/// Creates an error for an engine run that produced no usable diagnostics
pub fn engine_failed(stage: CompileStage, reason: impl Into<String>) -> TerrariumError {
    TerrariumError::EngineFailed {
        stage,
        reason: reason.into(),
    }
}

/// Creates an error for an engine run that succeeded without emitting anything
pub fn empty_output(stage: CompileStage) -> TerrariumError {
    TerrariumError::EmptyOutput { stage }
}
