//! The external toolchain seam.
//!
//! Dependency resolution, native compilation, and minification are opaque
//! collaborators. They sit behind the [`Toolchain`] trait so the orchestrator
//! can be driven end to end in tests without cargo or wasm-bindgen installed.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use skiff_config::Target;
use tokio::process::Command;

use crate::emit;
use crate::error::{BuildError, Result};
use crate::state::{ModuleGraph, WasmArtifact};

/// External build toolchain for one target.
#[async_trait]
pub trait Toolchain: Send + Sync {
    /// Resolve the entry manifest into an ordered module graph.
    async fn resolve(&self, target: &Target) -> Result<ModuleGraph>;

    /// Compile the native artifact described by the manifest. Blocks until
    /// the external toolchain exits; no timeout is imposed.
    async fn compile(&self, target: &Target, release: bool) -> Result<WasmArtifact>;

    /// Return a size-reduced, semantically equivalent bundle.
    ///
    /// The default implementation is a conservative comment and blank-line
    /// stripper; a real minifier can be swapped in behind this method.
    fn minify(&self, bundle: &str) -> String {
        emit::strip_bundle(bundle)
    }
}

/// Subset of a `Cargo.toml` the resolver needs.
#[derive(Debug, Deserialize)]
struct Manifest {
    package: ManifestPackage,
    #[serde(default)]
    dependencies: toml::Table,
}

#[derive(Debug, Deserialize)]
struct ManifestPackage {
    name: String,
}

/// Parse a manifest into a module graph. Shared by the real toolchain and
/// kept separate so it can be unit tested without process spawning.
pub(crate) fn graph_from_manifest(target: &Target, manifest_text: &str) -> Result<ModuleGraph> {
    let manifest: Manifest =
        toml::from_str(manifest_text).map_err(|e| BuildError::Stage {
            target: target.name.clone(),
            stage: crate::stage::StageKind::Resolve,
            message: format!("malformed manifest {}: {e}", target.manifest.display()),
        })?;

    Ok(ModuleGraph {
        entry: manifest.package.name,
        dependencies: manifest.dependencies.keys().cloned().collect(),
    })
}

/// Real toolchain: `cargo build --target wasm32-unknown-unknown` followed by
/// `wasm-bindgen` in `no-modules` mode, both out of process.
#[derive(Debug, Clone, Default)]
pub struct CargoWasm {
    /// Override for the cargo binary, mostly for tests.
    pub cargo: Option<PathBuf>,
    /// Override for the wasm-bindgen binary.
    pub wasm_bindgen: Option<PathBuf>,
}

impl CargoWasm {
    pub fn new() -> Self {
        Self::default()
    }

    fn cargo_bin(&self) -> PathBuf {
        self.cargo.clone().unwrap_or_else(|| PathBuf::from("cargo"))
    }

    fn bindgen_bin(&self) -> PathBuf {
        self.wasm_bindgen
            .clone()
            .unwrap_or_else(|| PathBuf::from("wasm-bindgen"))
    }

    async fn run_checked(&self, target: &Target, mut command: Command, label: &str) -> Result<()> {
        let output = command
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| BuildError::Compilation {
                target: target.name.clone(),
                command: label.to_string(),
                diagnostics: format!("failed to spawn: {e}"),
            })?;

        if !output.status.success() {
            return Err(BuildError::Compilation {
                target: target.name.clone(),
                command: label.to_string(),
                diagnostics: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Toolchain for CargoWasm {
    async fn resolve(&self, target: &Target) -> Result<ModuleGraph> {
        let text = tokio::fs::read_to_string(&target.manifest)
            .await
            .map_err(|e| BuildError::io(&target.name, &target.manifest, e))?;
        graph_from_manifest(target, &text)
    }

    async fn compile(&self, target: &Target, release: bool) -> Result<WasmArtifact> {
        let mut build = Command::new(self.cargo_bin());
        build
            .arg("build")
            .arg("--manifest-path")
            .arg(&target.manifest)
            .arg("--target")
            .arg("wasm32-unknown-unknown");
        if release {
            build.arg("--release");
        }

        tracing::info!(target = %target.name, release, "compiling wasm artifact");
        self.run_checked(target, build, "cargo build").await?;

        // Locate the wasm cargo produced. Crate names map to artifact names
        // with hyphens replaced by underscores.
        let graph = self.resolve(target).await?;
        let profile = if release { "release" } else { "debug" };
        let artifact_stem = graph.entry.replace('-', "_");
        let wasm_path = target
            .crate_dir()
            .join("target/wasm32-unknown-unknown")
            .join(profile)
            .join(format!("{artifact_stem}.wasm"));

        let bindgen_out = tempfile_dir(target)?;
        let mut bindgen = Command::new(self.bindgen_bin());
        bindgen
            .arg("--target")
            .arg("no-modules")
            .arg("--out-dir")
            .arg(&bindgen_out)
            .arg("--out-name")
            .arg(&target.name)
            .arg(&wasm_path);
        self.run_checked(target, bindgen, "wasm-bindgen").await?;

        let wasm = tokio::fs::read(bindgen_out.join(target.wasm_file_name()))
            .await
            .map_err(|e| BuildError::io(&target.name, bindgen_out.join(target.wasm_file_name()), e))?;
        let glue_path = bindgen_out.join(format!("{}.js", target.name));
        let glue_js = tokio::fs::read_to_string(&glue_path)
            .await
            .map_err(|e| BuildError::io(&target.name, &glue_path, e))?;

        Ok(WasmArtifact { wasm, glue_js })
    }
}

/// Scratch directory for wasm-bindgen output, under the crate's target dir so
/// repeated builds reuse the same location.
fn tempfile_dir(target: &Target) -> Result<PathBuf> {
    let dir = target.crate_dir().join("target/skiff-bindgen");
    std::fs::create_dir_all(&dir).map_err(|e| BuildError::io(&target.name, &dir, e))?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> Target {
        Target::new("index", "Cargo.toml", "dist/js")
    }

    #[test]
    fn graph_lists_dependencies() {
        let manifest = r#"
            [package]
            name = "why-app"
            version = "0.1.0"

            [dependencies]
            wasm-bindgen = "0.2"
            futures-signals = "0.3"
        "#;
        let graph = graph_from_manifest(&target(), manifest).unwrap();
        assert_eq!(graph.entry, "why-app");
        assert_eq!(graph.dependencies.len(), 2);
        assert!(graph.dependencies.contains(&"wasm-bindgen".to_string()));
    }

    #[test]
    fn graph_tolerates_missing_dependency_table() {
        let manifest = "[package]\nname = \"solo\"\nversion = \"0.1.0\"\n";
        let graph = graph_from_manifest(&target(), manifest).unwrap();
        assert_eq!(graph.entry, "solo");
        assert!(graph.dependencies.is_empty());
    }

    #[test]
    fn malformed_manifest_is_a_stage_error() {
        let err = graph_from_manifest(&target(), "not toml at all [").unwrap_err();
        assert!(matches!(err, BuildError::Stage { .. }));
    }
}
