//! Error classification
//!
//! Every failure leaves the bundler as an [`ErrorEnvelope`] whose `type` is one of a
//! closed set of kinds. The kind is decided by an ordered table of
//! `(predicate, kind)` rules; the first matching rule wins.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::TerrariumError;
use crate::engine::Diagnostic;
use crate::package::PackageName;

/// Substrings in compiler diagnostics that indicate malformed source
pub const SYNTAX_MARKERS: &[&str] = &[
    "Expected",
    "Unexpected",
    "Unterminated",
    "Syntax error",
    "Invalid",
    "is not valid inside a JSX element",
];

/// Substrings that indicate an import could not be satisfied
pub const RESOLVE_MARKERS: &[&str] = &["Could not resolve", "Cannot find module"];

/// Substrings emitted by package managers when a command fails
pub const PACKAGE_MANAGER_MARKERS: &[&str] = &["npm ERR!", "npm error", "ERR_PNPM"];

/// Substrings in package-manager output that indicate the registry could not be reached
pub const NETWORK_MARKERS: &[&str] = &[
    "ENOTFOUND",
    "EAI_AGAIN",
    "ECONNREFUSED",
    "ECONNRESET",
    "ETIMEDOUT",
    "ENETUNREACH",
    "EHOSTUNREACH",
    "ERR_SOCKET_TIMEOUT",
    "ESOCKETTIMEDOUT",
    "getaddrinfo",
    "socket hang up",
    "network request to",
];

/// Closed taxonomy of failure kinds reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Syntax,
    Resolve,
    Network,
    Build,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Syntax => "syntax",
            Self::Resolve => "resolve",
            Self::Network => "network",
            Self::Build => "build",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable failure payload written in place of a script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: bool,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub message: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl ErrorEnvelope {
    /// Name of the package an unresolved import refers to, if the failure names one.
    pub fn offending_package(&self) -> Option<PackageName> {
        std::iter::once(self.message.as_str())
            .chain(self.diagnostics.iter().map(|d| d.text.as_str()))
            .find_map(unresolved_specifier)
            .and_then(|spec| PackageName::from_specifier(&spec))
    }
}

impl From<&TerrariumError> for ErrorEnvelope {
    fn from(err: &TerrariumError) -> Self {
        let failure = Failure::from_error(err);
        Self {
            error: true,
            kind: classify(&failure),
            message: failure.message,
            diagnostics: failure.diagnostics.to_vec(),
        }
    }
}

/// The parts of a failure the classification rules look at
///
/// Package-manager output is kept apart from the message: the message can quote
/// user paths, so only captured output is scanned for network markers.
#[derive(Debug)]
pub struct Failure<'a> {
    pub explicit: Option<ErrorKind>,
    pub message: String,
    pub diagnostics: &'a [Diagnostic],
    pub package_manager_output: Option<&'a str>,
}

impl<'a> Failure<'a> {
    pub fn from_error(err: &'a TerrariumError) -> Self {
        Self {
            explicit: err.explicit_kind(),
            message: err.to_string(),
            diagnostics: err.diagnostics(),
            package_manager_output: err.package_manager_output(),
        }
    }

    fn output_contains(&self, markers: &[&str]) -> bool {
        self.package_manager_output
            .is_some_and(|output| contains_any(output, markers))
    }

    fn message_contains(&self, markers: &[&str]) -> bool {
        contains_any(&self.message, markers)
    }

    fn diagnostic_contains(&self, markers: &[&str]) -> bool {
        self.diagnostics
            .iter()
            .any(|d| contains_any(&d.text, markers))
    }
}

type Rule = fn(&Failure<'_>) -> bool;

/// Ordered classification rules; an explicit kind is honoured before these run.
pub const CLASSIFICATION_RULES: &[(Rule, ErrorKind)] = &[
    (
        |failure| failure.diagnostic_contains(SYNTAX_MARKERS),
        ErrorKind::Syntax,
    ),
    (
        |failure| {
            failure.message_contains(RESOLVE_MARKERS) || failure.diagnostic_contains(RESOLVE_MARKERS)
        },
        ErrorKind::Resolve,
    ),
    (
        |failure| {
            failure.output_contains(PACKAGE_MANAGER_MARKERS)
                || failure.output_contains(NETWORK_MARKERS)
        },
        ErrorKind::Network,
    ),
    (|failure| !failure.diagnostics.is_empty(), ErrorKind::Build),
];

/// Decide the envelope kind for a failure
pub fn classify(failure: &Failure<'_>) -> ErrorKind {
    if let Some(kind) = failure.explicit {
        return kind;
    }
    for (check, kind) in CLASSIFICATION_RULES {
        if check(failure) {
            return *kind;
        }
    }
    ErrorKind::Unknown
}

/// Whether `text` contains any of `markers`
pub fn contains_any(text: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| text.contains(marker))
}

/// Extract the quoted specifier from `Could not resolve "x"` style text
pub fn unresolved_specifier(text: &str) -> Option<String> {
    RESOLVE_MARKERS.iter().find_map(|marker| {
        let rest = &text[text.find(marker)? + marker.len()..];
        let rest = rest.trim_start();
        let quote = rest.chars().next().filter(|c| matches!(c, '"' | '\''))?;
        let inner = &rest[1..];
        let end = inner.find(quote)?;
        Some(inner[..end].to_string())
    })
}
