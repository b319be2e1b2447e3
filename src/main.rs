//! Terrarium bundler
//!
//! A just-in-time, dependency-resolving bundler: it takes one React component file,
//! installs whatever packages it imports into a shared cache, and prints a single
//! self-executing script that mounts the component into the host page.

use std::io::Write;
use std::ops::ControlFlow;

use clap::Parser;

mod cache;
mod cli;
mod config;
mod discovery;
mod engine;
mod error;
mod finalize;
mod harness;
mod installer;
mod output;
mod package;
mod pipeline;
mod process;
mod progress;
mod styles;
mod temp;
mod watch;

#[cfg(test)]
mod test_fixtures;

use cli::Cli;
use output::OutputFormat;
use pipeline::BuildResult;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(format!("terrarium_bundler={default_level}")),
    )
    .format_timestamp(None)
    .format_target(false)
    .target(env_logger::Target::Stderr)
    .init();
}

/// Write one rendered result to stdout; false if stdout is gone
fn emit(result: &BuildResult, format: OutputFormat, newline: bool) -> bool {
    let text = match output::render(result, format) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: {e}");
            return false;
        }
    };

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|()| if newline { stdout.write_all(b"\n") } else { Ok(()) })
        .and_then(|()| stdout.flush())
        .is_ok()
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match cli.bundler_config() {
        Ok(config) => config,
        Err(e) => {
            emit(&BuildResult::from_error(&e), cli.output, false);
            std::process::exit(1);
        }
    };

    if cli.watch {
        let watched = watch::watch_entry(&cli.entry, || {
            let result = pipeline::bundle(&config, &cli.entry);
            if emit(&result, cli.output, true) {
                ControlFlow::Continue(())
            } else {
                ControlFlow::Break(())
            }
        });
        if let Err(e) = watched {
            emit(&BuildResult::from_error(&e), cli.output, true);
            std::process::exit(1);
        }
        return;
    }

    let result = pipeline::bundle(&config, &cli.entry);
    let code = if emit(&result, cli.output, false) {
        result.exit_code()
    } else {
        1
    };
    std::process::exit(code);
}
