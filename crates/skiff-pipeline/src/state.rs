//! Accumulated build state and phase tracking.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Ordered module dependency graph returned by the resolver.
///
/// The resolver is an opaque collaborator; from the pipeline's point of view
/// the graph is the ordered list of crate names feeding the entry manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleGraph {
    /// Entry crate name.
    pub entry: String,
    /// Direct dependencies, in manifest order.
    pub dependencies: Vec<String>,
}

/// Compiled native artifact: the wasm binary plus the JS glue the toolchain
/// emitted alongside it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WasmArtifact {
    pub wasm: Vec<u8>,
    pub glue_js: String,
}

/// State threaded through the stage list. Each enabled stage receives the
/// state produced by its predecessors and returns an updated copy; a disabled
/// stage leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildState {
    /// Resolved module graph, set by the resolve stage.
    pub graph: Option<ModuleGraph>,

    /// Compiled artifact, set by the compile stage.
    pub artifact: Option<WasmArtifact>,

    /// Assets copied into the output directory, relative paths.
    pub copied_assets: Vec<PathBuf>,

    /// The bundle text as it stands. The transform stage creates it, the
    /// minify stage rewrites it.
    pub bundle: Option<String>,

    /// External source map JSON, if the target asked for one.
    pub source_map: Option<String>,

    /// Set by the serve stage; the CLI starts the actual listener.
    pub dev_server_requested: bool,

    /// Set by the live-reload stage.
    pub live_reload_requested: bool,
}

/// Phase of one build pass.
///
/// `Done → Resolving` cycles in watch mode on a file-change event; `Failed`
/// is terminal for the pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "lowercase")]
pub enum BuildPhase {
    Idle,
    Resolving,
    Compiling,
    Packaging,
    Serving,
    Finalizing,
    Done,
    Failed { error: String },
}

impl BuildPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BuildPhase::Done | BuildPhase::Failed { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            BuildPhase::Failed { error } => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_is_empty() {
        let state = BuildState::default();
        assert!(state.graph.is_none());
        assert!(state.artifact.is_none());
        assert!(state.bundle.is_none());
        assert!(!state.dev_server_requested);
    }

    #[test]
    fn phase_terminality() {
        assert!(BuildPhase::Done.is_terminal());
        assert!(BuildPhase::Failed {
            error: "x".to_string()
        }
        .is_terminal());
        assert!(!BuildPhase::Compiling.is_terminal());
        assert_eq!(BuildPhase::Idle.error(), None);
    }
}
