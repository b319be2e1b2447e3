//! The bundling pipeline
//!
//! One invocation walks a fixed sequence of states:
//!
//! ```text
//! Init -> CacheReady -> BaseInstalled -> Discovered -> MissingInstalled
//!      -> Finalized -> (Styled | Unstyled) -> Done
//! ```
//!
//! Any stage may fail, which moves the pipeline to the terminal `Failed` state and
//! turns the error into an [`ErrorEnvelope`]. A run produces exactly one
//! [`BuildResult`].

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::cache::CacheStore;
use crate::config::BundlerConfig;
use crate::discovery::discover_missing;
use crate::engine::{CompilerEngine, Esbuild};
use crate::error::{ErrorEnvelope, ErrorKind, Result, TerrariumError};
use crate::finalize::finalize;
use crate::installer::DependencyInstaller;
use crate::styles::StyleSynthesizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Init,
    CacheReady,
    BaseInstalled,
    Discovered,
    MissingInstalled,
    Finalized,
    Styled,
    Unstyled,
    Done,
    Failed(ErrorKind),
}

/// Outcome of one invocation: a script or a classified failure, never both
#[derive(Debug, Clone, PartialEq)]
pub enum BuildResult {
    Success(String),
    Failure(ErrorEnvelope),
}

impl BuildResult {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Success(_) => 0,
            Self::Failure(_) => 1,
        }
    }

    pub fn from_error(err: &TerrariumError) -> Self {
        Self::Failure(ErrorEnvelope::from(err))
    }
}

/// Bundle `entry` with the esbuild installed in the configured cache.
pub fn bundle(config: &BundlerConfig, entry: &Path) -> BuildResult {
    Pipeline::new(config).run(entry, Esbuild::from_cache)
}

#[derive(Debug)]
pub struct Pipeline<'c> {
    config: &'c BundlerConfig,
    state: PipelineState,
}

impl<'c> Pipeline<'c> {
    pub fn new(config: &'c BundlerConfig) -> Self {
        Self {
            config,
            state: PipelineState::Init,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Run every stage for `entry`; `make_engine` builds the compiler engine once the
    /// toolchain baseline is installed.
    pub fn run<E, F>(&mut self, entry: &Path, make_engine: F) -> BuildResult
    where
        E: CompilerEngine,
        F: FnOnce(&CacheStore) -> Result<E>,
    {
        match self.execute(entry, make_engine) {
            Ok(script) => {
                self.advance(PipelineState::Done);
                BuildResult::Success(script)
            }
            Err(err) => {
                let envelope = ErrorEnvelope::from(&err);
                if let Some(stage) = err.stage() {
                    debug!("{stage} failed");
                }
                debug!("{err:?}");
                self.advance(PipelineState::Failed(envelope.kind));
                BuildResult::Failure(envelope)
            }
        }
    }

    fn execute<E, F>(&mut self, entry: &Path, make_engine: F) -> Result<String>
    where
        E: CompilerEngine,
        F: FnOnce(&CacheStore) -> Result<E>,
    {
        let cache = CacheStore::new(&self.config.cache_dir);
        cache.ensure()?;
        let entry = resolve_entry(entry)?;
        self.advance(PipelineState::CacheReady);

        if cache.needs_install() {
            info!(
                "First run: installing the toolchain into {} (this can take a minute)",
                cache.root().display()
            );
        }
        let mut installer = DependencyInstaller::from_config(&cache, self.config);
        installer.install_base(self.config.styles)?;
        self.advance(PipelineState::BaseInstalled);

        let engine = make_engine(&cache)?;
        let missing = discover_missing(&engine, &cache, &entry)?;
        self.advance(PipelineState::Discovered);

        installer.install_missing(&missing)?;
        self.advance(PipelineState::MissingInstalled);

        let script = finalize(&engine, &entry)?;
        self.advance(PipelineState::Finalized);

        if !self.config.styles {
            self.advance(PipelineState::Unstyled);
            return Ok(script);
        }

        let outcome = StyleSynthesizer::from_cache(&cache).synthesize(&script);
        self.advance(if outcome.is_generated() {
            PipelineState::Styled
        } else {
            PipelineState::Unstyled
        });
        Ok(outcome.apply(script))
    }

    fn advance(&mut self, next: PipelineState) {
        debug!("pipeline: {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/// Absolute, symlink-free path of an existing entry file
fn resolve_entry(entry: &Path) -> Result<PathBuf> {
    let not_found = || TerrariumError::EntryNotFound {
        path: std::path::absolute(entry)
            .unwrap_or_else(|_| entry.to_path_buf())
            .display()
            .to_string(),
    };

    let resolved = dunce::canonicalize(entry).map_err(|_| not_found())?;
    if !resolved.is_file() {
        return Err(not_found());
    }
    Ok(resolved)
}
