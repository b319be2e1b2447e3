//! Package names and import specifiers
//!
//! An import specifier such as `@scope/pkg@2/dist/x.js` names an npm package
//! (`@scope/pkg`). Only bare specifiers name packages; relative and absolute
//! paths point at files of the component's own project.

use std::fmt;

use serde::Serialize;

/// Name of an installable npm package, without sub-path or version qualifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PackageName(String);

impl PackageName {
    /// Resolve an import specifier to the package it belongs to.
    ///
    /// Returns `None` for specifiers that do not name a package.
    pub fn from_specifier(specifier: &str) -> Option<Self> {
        if !is_bare_specifier(specifier) {
            return None;
        }

        let segments = if specifier.starts_with('@') { 2 } else { 1 };
        let name: Vec<&str> = specifier.split('/').take(segments).collect();
        if name.iter().any(|segment| segment.is_empty() || *segment == "@") {
            return None;
        }
        let name = name.join("/");

        // The leading '@' of a scope is not a version separator
        let name = match name.char_indices().skip(1).find(|(_, c)| *c == '@') {
            Some((at, _)) => &name[..at],
            None => name.as_str(),
        };

        if name.is_empty() || name.ends_with('/') {
            return None;
        }
        Some(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path segments of the package directory under `node_modules`
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether `specifier` refers to a named external package rather than a file.
///
/// Relative (`./`, `../`) and absolute paths are not bare, and neither are
/// URL-like specifiers (`https:`, `data:`, `node:`) which no package manager can install.
pub fn is_bare_specifier(specifier: &str) -> bool {
    let Some(first) = specifier.chars().next() else {
        return false;
    };
    if matches!(first, '.' | '/' | '\\') {
        return false;
    }
    if is_windows_absolute(specifier) {
        return false;
    }
    !has_url_scheme(specifier)
}

fn is_windows_absolute(specifier: &str) -> bool {
    let bytes = specifier.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && matches!(bytes[2], b'\\' | b'/')
}

fn has_url_scheme(specifier: &str) -> bool {
    specifier
        .split_once(':')
        .is_some_and(|(scheme, _)| {
            !scheme.is_empty()
                && !scheme.contains('/')
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        })
}
