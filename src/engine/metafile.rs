//! esbuild metafile (`--metafile`) import graph

use std::collections::BTreeMap;

use serde::Deserialize;

use super::ImportRecord;
use crate::error::Result;

#[derive(Debug, Deserialize)]
struct Metafile {
    #[serde(default)]
    inputs: BTreeMap<String, MetaInput>,
}

#[derive(Debug, Deserialize)]
struct MetaInput {
    #[serde(default)]
    imports: Vec<MetaImport>,
}

#[derive(Debug, Deserialize)]
struct MetaImport {
    path: String,
    #[serde(default)]
    kind: String,
    /// Specifier as written in source, when esbuild rewrote `path`
    #[serde(default)]
    original: Option<String>,
    #[serde(default)]
    external: bool,
}

/// Flatten every import of every input file in the metafile
pub fn parse_imports(json: &str) -> Result<Vec<ImportRecord>> {
    let metafile: Metafile = serde_json::from_str(json)?;

    let records = metafile
        .inputs
        .into_iter()
        .flat_map(|(importer, input)| {
            input.imports.into_iter().map(move |import| ImportRecord {
                importer: importer.clone(),
                specifier: import.original.unwrap_or(import.path),
                kind: import.kind,
                external: import.external,
            })
        })
        .collect();

    Ok(records)
}
