//! Compiler engine boundary
//!
//! The bundler never parses or compiles source itself. It drives an engine in two
//! modes: a detect-only scan that reports the import graph, and a final bundle of an
//! in-memory entry module into one self-executing script.

pub mod diagnostic;
pub mod esbuild;
pub mod metafile;

use std::fmt;
use std::path::Path;

pub use diagnostic::{Diagnostic, Location};
pub use esbuild::Esbuild;

use crate::error::Result;

/// Which engine invocation a failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileStage {
    Discovery,
    Finalize,
}

impl fmt::Display for CompileStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Discovery => "dependency discovery",
            Self::Finalize => "bundling",
        })
    }
}

/// One import edge reported by a detect-only scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    /// File containing the import
    pub importer: String,
    /// Specifier as written in source
    pub specifier: String,
    /// Import kind as reported by the engine (`import-statement`, `require-call`, ...)
    pub kind: String,
    /// Left out of the bundle instead of resolved
    pub external: bool,
}

/// A compiler that can scan imports and bundle an in-memory entry
pub trait CompilerEngine {
    /// Compile `entry` and report every import edge of the graph it reaches.
    ///
    /// Specifiers in `externals` (and their sub-paths) are left unresolved; every
    /// other import resolves normally, including those inside installed packages.
    /// Must not write into the project or the cache.
    fn scan_imports(&self, entry: &Path, externals: &[String]) -> Result<Vec<ImportRecord>>;

    /// Bundle `source` into a single browser IIFE, resolving imports from `resolve_dir`.
    fn bundle_source(&self, source: &str, resolve_dir: &Path) -> Result<String>;
}
