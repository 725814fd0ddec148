//! skiff CLI - build orchestrator for Rust/WASM browser bundles.
//!
//! Commands:
//!
//! - `skiff build` - one-shot release build of every target
//! - `skiff dev` - watch mode with dev server and live reload
//! - `skiff check` - configuration validation
//!
//! The heavy lifting lives in `skiff-pipeline`; this crate owns argument
//! parsing, logging, terminal output, the dev server, and the file watcher.

pub mod cli;
pub mod commands;
pub mod dev;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result};
