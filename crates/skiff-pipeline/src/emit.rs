//! Bundle emission: IIFE wrapping, source maps, and the conservative
//! built-in minify pass.
//!
//! Everything here is deterministic. No timestamps or absolute paths go into
//! the output, so two passes over unchanged sources are byte-identical.

use serde_json::json;
use skiff_config::Target;

use crate::state::ModuleGraph;

/// Wrap wasm-bindgen's `no-modules` glue into a self-executing bundle that
/// fetches the wasm artifact and runs the start export.
pub fn wrap_iife(target: &Target, glue_js: &str) -> String {
    let wasm_file = target.wasm_file_name();
    format!(
        "(function () {{\n\
         'use strict';\n\
         {glue_js}\n\
         wasm_bindgen({{ module_or_path: '{wasm_file}' }});\n\
         }})();\n"
    )
}

/// Minimal external source map (version 3). The bundle is generated, not
/// authored, so the map carries the module graph as its source list rather
/// than real mappings.
pub fn source_map(target: &Target, graph: Option<&ModuleGraph>) -> String {
    let mut sources: Vec<String> = Vec::new();
    if let Some(graph) = graph {
        sources.push(graph.entry.clone());
        sources.extend(graph.dependencies.iter().cloned());
    }

    let map = json!({
        "version": 3,
        "file": target.bundle_file_name(),
        "sources": sources,
        "names": [],
        "mappings": "",
    });
    map.to_string()
}

/// Reference comment appended to a bundle that has an external map.
pub fn source_map_reference(target: &Target) -> String {
    format!("//# sourceMappingURL={}\n", target.map_file_name())
}

/// Conservative size reduction: drop whole-line comments and blank lines,
/// trim trailing whitespace. Never touches content inside a line, so string
/// literals survive.
pub fn strip_bundle(bundle: &str) -> String {
    let mut out = String::with_capacity(bundle.len());
    for line in bundle.lines() {
        let trimmed = line.trim_end();
        let stripped = trimmed.trim_start();
        if stripped.is_empty() {
            continue;
        }
        if stripped.starts_with("//") && !stripped.starts_with("//#") {
            continue;
        }
        out.push_str(trimmed);
        out.push('\n');
    }
    out
}
