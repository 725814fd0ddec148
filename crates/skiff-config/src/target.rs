//! Build target descriptors.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Shape of the emitted bundle.
///
/// Only the self-executing form exists today; the enum leaves room for
/// module formats without changing the config schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Immediately-invoked bundle that loads and starts the wasm artifact.
    #[default]
    Iife,
}

/// One static-asset copy rule: files under `from` matching the pattern are
/// copied into `to` (relative to the target's output directory).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyRule {
    /// Source pattern. Either a directory prefix ("static") or an extension
    /// pattern ("*.css").
    pub from: String,
    /// Destination subdirectory inside the output directory. Empty means the
    /// output directory itself.
    #[serde(default)]
    pub to: String,
}

/// One independently bundled entry point plus its output location.
///
/// Targets are independent of each other; two targets never share an output
/// directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Unique target name, used as the bundle file stem.
    pub name: String,

    /// Path to the `Cargo.toml` describing the native artifact.
    pub manifest: PathBuf,

    /// Directory the bundle, source map, and wasm artifact are written to.
    pub out_dir: PathBuf,

    #[serde(default)]
    pub format: OutputFormat,

    /// Emit an external source map next to the bundle.
    #[serde(default = "default_sourcemaps")]
    pub sourcemaps: bool,

    /// Static-asset copy rules, possibly empty.
    #[serde(default)]
    pub copy: Vec<CopyRule>,
}

fn default_sourcemaps() -> bool {
    true
}

impl Target {
    /// Create a target with default format, source maps, and no copy rules.
    pub fn new(
        name: impl Into<String>,
        manifest: impl Into<PathBuf>,
        out_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            manifest: manifest.into(),
            out_dir: out_dir.into(),
            format: OutputFormat::default(),
            sourcemaps: true,
            copy: Vec::new(),
        }
    }

    /// Bundle file name for this target, e.g. `index.js`.
    pub fn bundle_file_name(&self) -> String {
        format!("{}.js", self.name)
    }

    /// Source map file name for this target, e.g. `index.js.map`.
    pub fn map_file_name(&self) -> String {
        format!("{}.js.map", self.name)
    }

    /// Wasm artifact file name for this target, e.g. `index_bg.wasm`.
    pub fn wasm_file_name(&self) -> String {
        format!("{}_bg.wasm", self.name)
    }

    /// The directory the manifest lives in, i.e. the crate root whose
    /// sources feed this target.
    pub fn crate_dir(&self) -> &Path {
        self.manifest.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Resolve `manifest` and `out_dir` against a working directory,
    /// returning a copy with absolute paths.
    pub fn resolved_against(&self, cwd: &Path) -> Target {
        let mut target = self.clone();
        if target.manifest.is_relative() {
            target.manifest = cwd.join(&target.manifest);
        }
        if target.out_dir.is_relative() {
            target.out_dir = cwd.join(&target.out_dir);
        }
        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_names_derive_from_target_name() {
        let target = Target::new("why-ui", "why-ui/Cargo.toml", "dist/why-ui");
        assert_eq!(target.bundle_file_name(), "why-ui.js");
        assert_eq!(target.map_file_name(), "why-ui.js.map");
        assert_eq!(target.wasm_file_name(), "why-ui_bg.wasm");
    }

    #[test]
    fn crate_dir_is_manifest_parent() {
        let target = Target::new("index", "app/Cargo.toml", "dist/js");
        assert_eq!(target.crate_dir(), Path::new("app"));
    }

    #[test]
    fn resolved_against_leaves_absolute_paths_alone() {
        let target = Target::new("index", "/abs/Cargo.toml", "dist");
        let resolved = target.resolved_against(Path::new("/work"));
        assert_eq!(resolved.manifest, PathBuf::from("/abs/Cargo.toml"));
        assert_eq!(resolved.out_dir, PathBuf::from("/work/dist"));
    }

    #[test]
    fn sourcemaps_default_on() {
        let target: Target = toml::from_str(
            r#"
            name = "index"
            manifest = "Cargo.toml"
            out_dir = "dist/js"
            "#,
        )
        .unwrap();
        assert!(target.sourcemaps);
        assert_eq!(target.format, OutputFormat::Iife);
        assert!(target.copy.is_empty());
    }
}
