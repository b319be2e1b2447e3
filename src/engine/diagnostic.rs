//! Compiler diagnostics parsed from esbuild's plain-text log output
//!
//! With `--color=false --log-level=error` esbuild reports errors as:
//!
//! ```text
//! ✘ [ERROR] Could not resolve "left-pad"
//!
//!     app.tsx:1:20:
//!       1 │ import pad from "left-pad";
//!         ╵                 ~~~~~~~~~~
//!
//!   You can mark the path "left-pad" as external to exclude it from the bundle.
//!
//! 1 error
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Source position a diagnostic points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_text: Option<String>,
}

/// One compiler error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub text: String,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "{}:{}:{}: {}", loc.file, loc.line, loc.column, self.text),
            None => f.write_str(&self.text),
        }
    }
}

const ERROR_TAG: &str = "[ERROR] ";
const LEGACY_ERROR_TAG: &str = ": error: ";

/// Parse every error esbuild printed to stderr
pub fn parse_diagnostics(stderr: &str) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    for line in stderr.lines() {
        if let Some(at) = line.find(ERROR_TAG) {
            diagnostics.push(Diagnostic {
                text: line[at + ERROR_TAG.len()..].trim().to_string(),
                location: None,
                notes: Vec::new(),
            });
            continue;
        }

        // esbuild < 0.14: " > app.tsx:3:8: error: Expected ..."
        if let Some(rest) = line.trim_start().strip_prefix("> ") {
            if let Some((position, text)) = rest.split_once(LEGACY_ERROR_TAG) {
                diagnostics.push(Diagnostic {
                    text: text.trim().to_string(),
                    location: parse_position(position),
                    notes: Vec::new(),
                });
                continue;
            }
        }

        let Some(current) = diagnostics.last_mut() else {
            continue;
        };
        attach_detail(current, line);
    }

    diagnostics
}

fn attach_detail(diagnostic: &mut Diagnostic, line: &str) {
    let trimmed = line.trim();
    if trimmed.is_empty() || is_summary_line(trimmed) {
        return;
    }

    if let Some(position) = trimmed.strip_suffix(':') {
        if diagnostic.location.is_none() {
            if let Some(location) = parse_position(position) {
                diagnostic.location = Some(location);
                return;
            }
        }
    }

    if let Some((gutter, code)) = trimmed.split_once('│') {
        if gutter.trim().chars().all(|c| c.is_ascii_digit()) {
            if let Some(location) = diagnostic.location.as_mut() {
                if location.line_text.is_none() {
                    location.line_text = Some(code.strip_prefix(' ').unwrap_or(code).to_string());
                }
            }
        }
        return;
    }

    // Underline markers under the code line
    if trimmed.starts_with('╵') || trimmed.starts_with('|') {
        return;
    }

    diagnostic.notes.push(trimmed.to_string());
}

fn is_summary_line(line: &str) -> bool {
    let mut parts = line.split_whitespace();
    matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(n), Some("error" | "errors" | "warning" | "warnings"), None)
            if n.chars().all(|c| c.is_ascii_digit())
    )
}

/// Parse `file:line:column`, where `file` may itself contain colons
fn parse_position(position: &str) -> Option<Location> {
    let (rest, column) = position.rsplit_once(':')?;
    let (file, line) = rest.rsplit_once(':')?;
    if file.is_empty() {
        return None;
    }
    Some(Location {
        file: file.to_string(),
        line: line.trim().parse().ok()?,
        column: column.trim().parse().ok()?,
        line_text: None,
    })
}
