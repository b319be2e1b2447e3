//! Dependency discovery pass
//!
//! A dry compilation of the entry file whose only product is the set of packages
//! the component needs that the cache does not have yet. Imports of installed
//! packages resolve normally, so their own imports are followed too. A bare import
//! the cache cannot satisfy is marked external and the scan repeats until the
//! graph compiles; nothing is installed or written.

use std::collections::BTreeSet;
use std::path::Path;

use log::debug;

use crate::cache::CacheStore;
use crate::engine::CompilerEngine;
use crate::error::classify::unresolved_specifier;
use crate::error::{Result, TerrariumError};
use crate::package::PackageName;

/// Deduplicated, ordered set of package names missing from the cache
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissingSet(BTreeSet<PackageName>);

impl MissingSet {
    pub fn insert(&mut self, name: PackageName) -> bool {
        self.0.insert(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PackageName> {
        self.0.iter()
    }
}

impl FromIterator<PackageName> for MissingSet {
    fn from_iter<I: IntoIterator<Item = PackageName>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'s> FromIterator<&'s str> for MissingSet {
    fn from_iter<I: IntoIterator<Item = &'s str>>(iter: I) -> Self {
        iter.into_iter()
            .filter_map(PackageName::from_specifier)
            .collect()
    }
}

/// Find every package `entry` (transitively) imports that `cache` is missing.
pub fn discover_missing(
    engine: &dyn CompilerEngine,
    cache: &CacheStore,
    entry: &Path,
) -> Result<MissingSet> {
    let mut missing = MissingSet::default();
    let mut rounds = 0;

    let imports = loop {
        rounds += 1;
        let externals = external_patterns(&missing);
        match engine.scan_imports(entry, &externals) {
            Ok(imports) => break imports,
            Err(err) => {
                let unresolved = unresolved_missing(&err, cache, &missing);
                if unresolved.is_empty() {
                    return Err(err);
                }
                debug!("scan round {rounds}: externalizing {unresolved:?}");
                missing.0.extend(unresolved);
            }
        }
    };

    for import in &imports {
        // Relative and absolute imports name no package
        let Some(name) = PackageName::from_specifier(&import.specifier) else {
            continue;
        };
        if !cache.has_package(&name) && missing.insert(name) {
            debug!(
                "{} imports missing package via {} ({}{})",
                import.importer,
                import.specifier,
                import.kind,
                if import.external { ", external" } else { "" }
            );
        }
    }

    debug!(
        "discovery scanned {} imports in {rounds} rounds, {} packages missing",
        imports.len(),
        missing.len()
    );
    Ok(missing)
}

/// Engine externals covering each missing package and its sub-paths
fn external_patterns(missing: &MissingSet) -> Vec<String> {
    missing
        .iter()
        .flat_map(|name| [name.to_string(), format!("{name}/*")])
        .collect()
}

/// Packages named by unresolved bare imports in `err` that the cache lacks and
/// that are not external yet
fn unresolved_missing(
    err: &TerrariumError,
    cache: &CacheStore,
    missing: &MissingSet,
) -> BTreeSet<PackageName> {
    err.diagnostics()
        .iter()
        .filter_map(|d| unresolved_specifier(&d.text))
        .filter_map(|spec| PackageName::from_specifier(&spec))
        .filter(|name| !cache.has_package(name) && !missing.0.contains(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{CompileStage, Diagnostic, ImportRecord};
    use crate::error::{ErrorEnvelope, ErrorKind, compile};
    use crate::test_fixtures::{create_temp_dir, seed_packages};
    use std::cell::RefCell;

    const ENTRY: &str = "app.tsx";

    /// Resolves imports against a cache the way a bundling scan would: an edge out
    /// of an installed package is only seen once that package resolves.
    struct GraphEngine {
        cache: CacheStore,
        edges: Vec<(&'static str, &'static str)>,
        syntax_error: Option<&'static str>,
        rounds: RefCell<Vec<Vec<String>>>,
    }

    impl GraphEngine {
        fn new(cache: &CacheStore, edges: Vec<(&'static str, &'static str)>) -> Self {
            Self {
                cache: cache.clone(),
                edges,
                syntax_error: None,
                rounds: RefCell::new(Vec::new()),
            }
        }

        fn is_external(externals: &[String], specifier: &str) -> bool {
            externals.iter().any(|pattern| match pattern.strip_suffix("/*") {
                Some(prefix) => specifier.starts_with(&format!("{prefix}/")),
                None => pattern == specifier,
            })
        }

        /// Whether an importer is part of the graph the scan reaches
        fn reached(&self, importer: &str, externals: &[String]) -> bool {
            let Some(package) = importer.strip_prefix("node_modules/") else {
                return true;
            };
            let name = PackageName::from_specifier(package).unwrap();
            self.cache.has_package(&name) && !Self::is_external(externals, name.as_str())
        }
    }

    impl CompilerEngine for GraphEngine {
        fn scan_imports(&self, _entry: &Path, externals: &[String]) -> Result<Vec<ImportRecord>> {
            self.rounds.borrow_mut().push(externals.to_vec());

            let mut records = Vec::new();
            let mut diagnostics = Vec::new();
            for (importer, specifier) in &self.edges {
                if !self.reached(importer, externals) {
                    continue;
                }
                let external = Self::is_external(externals, specifier);
                let resolves = !crate::package::is_bare_specifier(specifier)
                    || self.cache.is_installed(specifier);
                if !external && !resolves {
                    diagnostics.push(diag(&format!("Could not resolve \"{specifier}\"")));
                }
                records.push(ImportRecord {
                    importer: (*importer).to_string(),
                    specifier: (*specifier).to_string(),
                    kind: "import-statement".to_string(),
                    external,
                });
            }

            if let Some(text) = self.syntax_error {
                diagnostics.push(diag(text));
            }
            if diagnostics.is_empty() {
                Ok(records)
            } else {
                Err(compile::failed(CompileStage::Discovery, diagnostics))
            }
        }

        fn bundle_source(&self, _source: &str, _resolve_dir: &Path) -> Result<String> {
            unreachable!("discovery never bundles")
        }
    }

    fn diag(text: &str) -> Diagnostic {
        Diagnostic {
            text: text.to_string(),
            location: None,
            notes: Vec::new(),
        }
    }

    fn names(set: &MissingSet) -> Vec<String> {
        set.iter().map(ToString::to_string).collect()
    }

    fn from_entry(specifiers: &[&'static str]) -> Vec<(&'static str, &'static str)> {
        specifiers.iter().map(|spec| (ENTRY, *spec)).collect()
    }

    #[test]
    fn test_collects_missing_package_names() {
        let temp = create_temp_dir();
        seed_packages(temp.path(), &["react"]);
        let cache = CacheStore::new(temp.path());
        let engine = GraphEngine::new(
            &cache,
            from_entry(&[
                "react/jsx-runtime",
                "./Button",
                "zod",
                "@radix-ui/react-slot/dist/index.mjs",
                "date-fns/format",
                "date-fns",
            ]),
        );

        let missing = discover_missing(&engine, &cache, &temp.path().join(ENTRY)).unwrap();
        assert_eq!(names(&missing), vec!["@radix-ui/react-slot", "date-fns", "zod"]);
    }

    #[test]
    fn test_only_missing_packages_are_external() {
        let temp = create_temp_dir();
        seed_packages(temp.path(), &["react"]);
        let cache = CacheStore::new(temp.path());
        let engine = GraphEngine::new(&cache, from_entry(&["react", "zod/mini"]));

        discover_missing(&engine, &cache, &temp.path().join(ENTRY)).unwrap();

        let rounds = engine.rounds.borrow();
        assert_eq!(rounds.len(), 2);
        assert!(rounds[0].is_empty());
        assert_eq!(rounds[1], vec!["zod".to_string(), "zod/*".to_string()]);
    }

    #[test]
    fn test_follows_imports_inside_installed_packages() {
        let temp = create_temp_dir();
        seed_packages(temp.path(), &["ui-kit"]);
        let cache = CacheStore::new(temp.path());
        let engine = GraphEngine::new(
            &cache,
            vec![
                (ENTRY, "ui-kit"),
                ("node_modules/ui-kit/index.js", "clsx"),
                ("node_modules/ui-kit/index.js", "./theme.js"),
            ],
        );

        let missing = discover_missing(&engine, &cache, &temp.path().join(ENTRY)).unwrap();
        assert_eq!(names(&missing), vec!["clsx"]);
    }

    #[test]
    fn test_repeated_runs_are_identical_and_pure() {
        let temp = create_temp_dir();
        let cache = CacheStore::new(temp.path());
        let engine = GraphEngine::new(&cache, from_entry(&["zod", "clsx", "zod/v4"]));
        let entry = temp.path().join(ENTRY);

        let first = discover_missing(&engine, &cache, &entry).unwrap();
        let second = discover_missing(&engine, &cache, &entry).unwrap();

        assert_eq!(first, second);
        assert_eq!(names(&first), vec!["clsx", "zod"]);
        assert!(!temp.path().join("node_modules").exists());
    }

    #[test]
    fn test_no_missing_when_all_installed() {
        let temp = create_temp_dir();
        seed_packages(temp.path(), &["react", "zod"]);
        let cache = CacheStore::new(temp.path());
        let engine = GraphEngine::new(&cache, from_entry(&["react", "zod"]));

        let missing = discover_missing(&engine, &cache, &temp.path().join("a.tsx")).unwrap();
        assert!(missing.is_empty());
        assert_eq!(engine.rounds.borrow().len(), 1);
    }

    #[test]
    fn test_bad_subpath_of_installed_package_fails() {
        let temp = create_temp_dir();
        seed_packages(temp.path(), &["react"]);
        let cache = CacheStore::new(temp.path());

        struct Unresolvable;
        impl CompilerEngine for Unresolvable {
            fn scan_imports(&self, _entry: &Path, _externals: &[String]) -> Result<Vec<ImportRecord>> {
                Err(compile::failed(
                    CompileStage::Discovery,
                    vec![diag("Could not resolve \"react/no-such-entry\"")],
                ))
            }
            fn bundle_source(&self, _source: &str, _resolve_dir: &Path) -> Result<String> {
                unreachable!()
            }
        }

        let err = discover_missing(&Unresolvable, &cache, &temp.path().join(ENTRY)).unwrap_err();
        let envelope = ErrorEnvelope::from(&err);
        assert_eq!(envelope.kind, ErrorKind::Resolve);
        assert_eq!(
            envelope.offending_package().map(|p| p.to_string()),
            Some("react".to_string())
        );
    }

    #[test]
    fn test_syntax_error_survives_externalizing() {
        let temp = create_temp_dir();
        let cache = CacheStore::new(temp.path());
        let mut engine = GraphEngine::new(&cache, from_entry(&["zod"]));
        engine.syntax_error = Some("Unexpected end of file");

        let err = discover_missing(&engine, &cache, &temp.path().join(ENTRY)).unwrap_err();
        assert_eq!(ErrorEnvelope::from(&err).kind, ErrorKind::Syntax);
        assert_eq!(engine.rounds.borrow().len(), 2);
    }

    #[test]
    fn test_missing_set_from_specifiers() {
        let set: MissingSet = ["lodash/fp", "lodash", "./x", "@a/b@1"].into_iter().collect();
        assert_eq!(names(&set), vec!["@a/b", "lodash"]);
    }
}
