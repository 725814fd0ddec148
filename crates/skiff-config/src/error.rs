//! Error types for configuration loading and validation.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    // Filesystem validation errors (for CLI use)
    #[error("manifest not found for target '{target}': {}", .path.display())]
    ManifestNotFound { target: String, path: PathBuf },

    #[error("output directory is not writable: {0}")]
    OutDirNotWritable(PathBuf),

    // Config parsing/loading errors
    #[error("config file not found: {}\n\nHint: create a skiff.toml or pass --config <path>", .0.display())]
    NotFound(PathBuf),

    #[error("invalid config: {0}")]
    Invalid(String),

    // Schema validation errors (no filesystem checks)
    #[error("no targets defined\n\nHint: add at least one [targets.<name>] table")]
    NoTargets,

    #[error("invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    #[error(transparent)]
    Figment(#[from] Box<figment::Error>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Figment(Box::new(err))
    }
}
