//! CLI error types.
//!
//! Domain errors convert in via `#[from]`; the binary maps any error to a
//! non-zero exit code after reporting it with enough context (target name,
//! stage kind) to locate the failure.

use thiserror::Error;

pub type Result<T, E = CliError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(#[from] skiff_config::ConfigError),

    /// Build pipeline failure for one target.
    #[error("build error: {0}")]
    Build(#[from] skiff_pipeline::BuildError),

    /// One or more targets failed in a release build. Raised after every
    /// target has been attempted.
    #[error("{failed} of {total} targets failed")]
    TargetsFailed { failed: usize, total: usize },

    /// Invalid command-line arguments or options.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Development server failure.
    #[error("server error: {0}")]
    Server(String),

    /// File watching failure.
    #[error("file watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// I/O failure outside the pipeline.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
