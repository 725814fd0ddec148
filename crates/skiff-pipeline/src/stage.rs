//! Pipeline stage definitions.
//!
//! Stages are an explicit ordered list of typed variants, each holding its
//! own options, evaluated by a loop in the orchestrator. Whether a stage runs
//! in the active mode is decided once per build pass by [`Stage::enabled_in`];
//! a disabled stage is a strict no-op.

use serde::{Deserialize, Serialize};
use skiff_config::BuildMode;

/// Discriminant for a pipeline stage, used in logs and error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageKind {
    Resolve,
    CompileNative,
    CopyAssets,
    TransformCommonjs,
    Serve,
    LiveReload,
    Minify,
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StageKind::Resolve => "resolve",
            StageKind::CompileNative => "compile-native",
            StageKind::CopyAssets => "copy-assets",
            StageKind::TransformCommonjs => "transform-commonjs",
            StageKind::Serve => "serve",
            StageKind::LiveReload => "live-reload",
            StageKind::Minify => "minify",
        };
        write!(f, "{name}")
    }
}

/// One processing step, with its options inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// Resolve the entry manifest into an ordered module graph.
    Resolve,

    /// Drive the external wasm toolchain. `release` selects the optimized
    /// profile.
    CompileNative { release: bool },

    /// Apply the target's static-asset copy rules.
    CopyAssets,

    /// Wrap the toolchain's glue into the self-executing bundle format.
    TransformCommonjs,

    /// Request a development server over the output directory.
    Serve,

    /// Request live-reload notifications for the output directory.
    LiveReload,

    /// Shrink the bundle. Runs last, production only.
    Minify,
}

impl Stage {
    pub fn kind(&self) -> StageKind {
        match self {
            Stage::Resolve => StageKind::Resolve,
            Stage::CompileNative { .. } => StageKind::CompileNative,
            Stage::CopyAssets => StageKind::CopyAssets,
            Stage::TransformCommonjs => StageKind::TransformCommonjs,
            Stage::Serve => StageKind::Serve,
            Stage::LiveReload => StageKind::LiveReload,
            Stage::Minify => StageKind::Minify,
        }
    }

    /// The enabled predicate, evaluated once per build pass.
    ///
    /// Serve and live reload exist only in watch mode; minify only in
    /// release mode. Everything else runs in both.
    pub fn enabled_in(&self, mode: BuildMode) -> bool {
        match self {
            Stage::Serve | Stage::LiveReload => mode.is_watch(),
            Stage::Minify => mode.is_release(),
            _ => true,
        }
    }
}

/// The fixed stage order for a target: resolution precedes compilation,
/// compilation precedes asset copying, asset copying precedes the module
/// transform, and the mode-conditional stages come last.
pub fn default_stages(mode: BuildMode) -> Vec<Stage> {
    vec![
        Stage::Resolve,
        Stage::CompileNative {
            release: mode.is_release(),
        },
        Stage::CopyAssets,
        Stage::TransformCommonjs,
        Stage::Serve,
        Stage::LiveReload,
        Stage::Minify,
    ]
}
