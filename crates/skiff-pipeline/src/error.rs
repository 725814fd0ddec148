//! Build pipeline errors.
//!
//! Three categories per the orchestrator contract: configuration problems
//! (caught before any output is written), external toolchain failures
//! (carrying the toolchain's diagnostic text), and filesystem failures. A
//! stage error aborts the current target's pass; independent targets are
//! unaffected.

use std::path::PathBuf;

use skiff_config::ConfigError;
use thiserror::Error;

use crate::stage::StageKind;

pub type Result<T, E = BuildError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum BuildError {
    /// Malformed or missing target descriptor; raised before any output
    /// directory is created.
    #[error("configuration error for target '{target}': {source}")]
    Configuration {
        target: String,
        #[source]
        source: ConfigError,
    },

    /// The external toolchain exited non-zero.
    #[error("compilation failed for target '{target}' ({command})\n{diagnostics}")]
    Compilation {
        target: String,
        /// The command that failed, e.g. `cargo build`.
        command: String,
        /// Diagnostic output captured from the toolchain.
        diagnostics: String,
    },

    /// Filesystem access failure, with the target and path that caused it.
    #[error("I/O error for target '{target}' on {}: {source}", .path.display())]
    Io {
        target: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stage failed in a way specific to its kind.
    #[error("stage {stage} failed for target '{target}': {message}")]
    Stage {
        target: String,
        stage: StageKind,
        message: String,
    },
}

impl BuildError {
    pub fn configuration(target: impl Into<String>, source: ConfigError) -> Self {
        BuildError::Configuration {
            target: target.into(),
            source,
        }
    }

    pub fn io(target: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildError::Io {
            target: target.into(),
            path: path.into(),
            source,
        }
    }

    /// The target this error belongs to, for per-target reporting.
    pub fn target(&self) -> &str {
        match self {
            BuildError::Configuration { target, .. }
            | BuildError::Compilation { target, .. }
            | BuildError::Io { target, .. }
            | BuildError::Stage { target, .. } => target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compilation_error_carries_diagnostics() {
        let err = BuildError::Compilation {
            target: "index".to_string(),
            command: "cargo build".to_string(),
            diagnostics: "error[E0308]: mismatched types".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("index"));
        assert!(msg.contains("cargo build"));
        assert!(msg.contains("E0308"));
    }

    #[test]
    fn stage_error_names_target_and_stage() {
        let err = BuildError::Stage {
            target: "why-ui".to_string(),
            stage: StageKind::CopyAssets,
            message: "source pattern matched nothing".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("why-ui"));
        assert!(msg.contains("copy-assets"));
        assert_eq!(err.target(), "why-ui");
    }

    #[test]
    fn io_error_keeps_the_target_name() {
        let err = BuildError::io(
            "index",
            "dist/js",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.target(), "index");
        let msg = err.to_string();
        assert!(msg.contains("index"));
        assert!(msg.contains("dist/js"));
    }
}
