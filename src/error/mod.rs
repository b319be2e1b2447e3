//! Error types and handling for Terrarium
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`cache`]: Cache directory errors
//! - [`install`]: Package manager errors
//! - [`compile`]: Compiler engine errors
//! - [`classify`]: Mapping of any error onto the closed envelope taxonomy

pub mod cache;
pub mod classify;
pub mod compile;
pub mod install;

pub use classify::{ErrorEnvelope, ErrorKind};

use miette::Diagnostic;
use thiserror::Error;

use crate::engine::{CompileStage, Diagnostic as EngineDiagnostic};

/// Main error type for Terrarium operations
#[derive(Error, Diagnostic, Debug)]
pub enum TerrariumError {
    // Input errors
    #[error("File not found: {path}")]
    #[diagnostic(
        code(terrarium::input::not_found),
        help("Pass the path of an existing component file")
    )]
    EntryNotFound { path: String },

    // Cache errors
    #[error("Failed to prepare cache directory {path}: {reason}")]
    #[diagnostic(
        code(terrarium::cache::setup_failed),
        help("Set TERRARIUM_CACHE_DIR to a writable location")
    )]
    CacheSetupFailed { path: String, reason: String },

    #[error("Failed to lock cache directory {path}: {reason}")]
    #[diagnostic(code(terrarium::cache::lock_failed))]
    CacheLockFailed { path: String, reason: String },

    #[error("Could not determine cache directory")]
    #[diagnostic(
        code(terrarium::cache::no_home),
        help("Set TERRARIUM_CACHE_DIR to choose a cache location")
    )]
    CacheDirUnknown,

    // Install errors
    #[error("Failed to run package manager '{program}': {reason}")]
    #[diagnostic(
        code(terrarium::install::spawn_failed),
        help("Make sure Node.js and npm are installed and on PATH")
    )]
    PackageManagerUnavailable { program: String, reason: String },

    #[error("Network error while installing {packages}: {output}")]
    #[diagnostic(
        code(terrarium::install::network),
        help("Check your internet connection and npm registry settings")
    )]
    InstallNetworkFailed { packages: String, output: String },

    #[error("Could not resolve \"{package}\": package not found in the registry")]
    #[diagnostic(
        code(terrarium::install::not_in_registry),
        help("Check the import for typos")
    )]
    PackageNotInRegistry { package: String, output: String },

    #[error("npm install failed for {packages}: {output}")]
    #[diagnostic(code(terrarium::install::failed))]
    InstallFailed { packages: String, output: String },

    #[error("Installing {packages} timed out after {seconds}s")]
    #[diagnostic(code(terrarium::install::timed_out))]
    InstallTimedOut { packages: String, seconds: u64 },

    // Compile errors
    #[error("Compiler not available at {path}")]
    #[diagnostic(
        code(terrarium::compile::engine_missing),
        help("Remove the cache directory to force a fresh toolchain install")
    )]
    EngineUnavailable { path: String },

    #[error("{message}")]
    #[diagnostic(code(terrarium::compile::failed))]
    CompileFailed {
        stage: CompileStage,
        message: String,
        diagnostics: Vec<EngineDiagnostic>,
    },

    #[error("Compiler failed during {stage}: {reason}")]
    #[diagnostic(code(terrarium::compile::engine_failed))]
    EngineFailed { stage: CompileStage, reason: String },

    #[error("{stage} produced no output")]
    #[diagnostic(code(terrarium::compile::empty_output))]
    EmptyOutput { stage: CompileStage },

    #[error("Failed to read compiler metafile: {reason}")]
    #[diagnostic(code(terrarium::compile::metafile))]
    MetafileParseFailed { reason: String },

    // Style errors (absorbed by the style stage, never surfaced)
    #[error("Style generation failed: {reason}")]
    #[diagnostic(code(terrarium::styles::failed))]
    StyleGenerationFailed { reason: String },

    // Watch errors
    #[error("Failed to watch {path}: {reason}")]
    #[diagnostic(code(terrarium::watch::failed))]
    WatchFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(terrarium::fs::io_error))]
    IoError { message: String },
}

impl TerrariumError {
    /// Envelope type decided by the layer that raised the error, if any.
    pub fn explicit_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::InstallNetworkFailed { .. } | Self::InstallTimedOut { .. } => {
                Some(ErrorKind::Network)
            }
            Self::PackageNotInRegistry { .. } => Some(ErrorKind::Resolve),
            Self::EmptyOutput { .. } => Some(ErrorKind::Build),
            _ => None,
        }
    }

    /// Engine invocation the error came from, for compile failures.
    pub fn stage(&self) -> Option<CompileStage> {
        match self {
            Self::CompileFailed { stage, .. }
            | Self::EngineFailed { stage, .. }
            | Self::EmptyOutput { stage } => Some(*stage),
            _ => None,
        }
    }

    /// Output captured from a failed package-manager call.
    pub fn package_manager_output(&self) -> Option<&str> {
        match self {
            Self::InstallNetworkFailed { output, .. }
            | Self::PackageNotInRegistry { output, .. }
            | Self::InstallFailed { output, .. } => Some(output),
            _ => None,
        }
    }

    /// Compiler diagnostics carried by this error.
    pub fn diagnostics(&self) -> &[EngineDiagnostic] {
        match self {
            Self::CompileFailed { diagnostics, .. } => diagnostics,
            _ => &[],
        }
    }
}

impl From<std::io::Error> for TerrariumError {
    fn from(err: std::io::Error) -> Self {
        TerrariumError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for TerrariumError {
    fn from(err: serde_json::Error) -> Self {
        TerrariumError::MetafileParseFailed {
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, TerrariumError>;
