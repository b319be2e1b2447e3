//! CLI definitions using clap derive API

use clap::Parser;
use clap::builder::{Styles, styling::AnsiColor};
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::{CACHE_DIR_ENV, resolve_cache_dir};
use crate::config::{BundlerConfig, DEFAULT_PACKAGE_MANAGER};
use crate::error::Result;
use crate::output::OutputFormat;

/// Terrarium bundler - turn a React component file into a self-mounting script
///
/// Installs the packages the component imports into a shared cache, bundles it
/// into one browser script that renders it into `#root`, and writes the script to
/// stdout. Failures are reported on stdout as a JSON envelope.
#[derive(Parser, Debug)]
#[command(
    name = "terrarium-bundler",
    author,
    version,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Bundle a React component into a self-mounting browser script",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  terrarium-bundler Counter.tsx > counter.js\n    \
                  terrarium-bundler --no-styles ./components/Chart.tsx\n    \
                  TERRARIUM_CACHE_DIR=/tmp/terrarium terrarium-bundler App.jsx\n    \
                  terrarium-bundler --output tagged App.tsx | jq .ok\n    \
                  terrarium-bundler --watch --output tagged App.tsx"
)]
pub struct Cli {
    /// Component file to bundle (.tsx, .jsx, .ts or .js)
    pub entry: PathBuf,

    /// Dependency cache directory [default: ~/.terrarium]
    #[arg(long, env = CACHE_DIR_ENV, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Skip utility-style generation
    #[arg(long, env = "TERRARIUM_NO_STYLES")]
    pub no_styles: bool,

    /// Package manager executable used for installs
    #[arg(long, env = "TERRARIUM_NPM", value_name = "PROGRAM", default_value = DEFAULT_PACKAGE_MANAGER)]
    pub npm: PathBuf,

    /// Seconds a single package install may take before it is aborted
    #[arg(
        long,
        value_name = "SECS",
        default_value_t = 120,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub install_timeout: u64,

    /// Output framing on stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Raw)]
    pub output: OutputFormat,

    /// Rebuild whenever the entry file changes, printing one result per line
    #[arg(long, short = 'w')]
    pub watch: bool,

    /// Enable verbose output
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl Cli {
    /// Resolve the flags and environment into a run configuration
    pub fn bundler_config(&self) -> Result<BundlerConfig> {
        let cache_dir = resolve_cache_dir(self.cache_dir.clone())?;
        Ok(BundlerConfig::new(cache_dir)
            .with_styles(!self.no_styles)
            .with_package_manager(&self.npm)
            .with_install_timeout(Duration::from_secs(self.install_timeout)))
    }
}
