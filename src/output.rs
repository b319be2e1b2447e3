//! Rendering of a [`BuildResult`] onto stdout

use clap::ValueEnum;
use serde::Serialize;

use crate::error::ErrorEnvelope;
use crate::pipeline::BuildResult;

/// How results are framed on stdout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Script text on success, JSON envelope on failure
    #[default]
    Raw,
    /// A JSON frame for both outcomes
    Tagged,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Frame<'a> {
    Script { ok: bool, script: &'a str },
    Error(&'a ErrorEnvelope),
}

/// Text to write to stdout for `result`
pub fn render(result: &BuildResult, format: OutputFormat) -> serde_json::Result<String> {
    match (result, format) {
        (BuildResult::Success(script), OutputFormat::Raw) => Ok(script.clone()),
        (BuildResult::Success(script), OutputFormat::Tagged) => {
            serde_json::to_string(&Frame::Script { ok: true, script })
        }
        (BuildResult::Failure(envelope), _) => serde_json::to_string(&Frame::Error(envelope)),
    }
}
