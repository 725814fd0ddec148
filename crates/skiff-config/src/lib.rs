//! Configuration model for the skiff build orchestrator.
//!
//! A `Config` is a set of named build targets plus global settings. Targets
//! and their stage lists are constructed once at startup and are immutable
//! for the duration of a build pass; nothing is persisted between runs.

pub mod error;
pub mod loader;
pub mod mode;
pub mod target;
pub mod validation;

pub use error::{ConfigError, Result};
pub use loader::Config;
pub use mode::BuildMode;
pub use target::{CopyRule, OutputFormat, Target};
pub use validation::{ConfigValidator, FsValidator, SchemaValidator};
