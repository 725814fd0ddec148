//! Build mode selection.
//!
//! Exactly one mode is active per invocation. The mode is chosen by the CLI
//! (the `dev` subcommand selects watch, `build` selects release) and threaded
//! through the orchestrator as an explicit value so that stage enablement is
//! testable without touching the process environment.

use serde::{Deserialize, Serialize};

/// Execution profile for a single orchestrator invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Interactive development: dev server, live reload, no minification.
    Watch,
    /// One-shot production build: minified output, process exits when done.
    Release,
}

impl BuildMode {
    pub fn is_watch(self) -> bool {
        matches!(self, BuildMode::Watch)
    }

    pub fn is_release(self) -> bool {
        matches!(self, BuildMode::Release)
    }
}

impl std::fmt::Display for BuildMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildMode::Watch => write!(f, "watch"),
            BuildMode::Release => write!(f, "release"),
        }
    }
}
