//! Command-line interface definition.
//!
//! The subcommand chooses the build mode: `skiff build` runs a one-shot
//! release build, `skiff dev` runs the watch-mode development server. The
//! mode is threaded through the orchestrator as an explicit value; nothing
//! reads it from the environment.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// skiff - build orchestrator for Rust/WASM browser bundles
#[derive(Parser, Debug)]
#[command(
    name = "skiff",
    version,
    about = "Build orchestrator for Rust/WASM browser bundles",
    long_about = "skiff drives cargo and wasm-bindgen through a staged pipeline to \
                  produce a self-executing browser bundle per configured target, \
                  with a dev server and live reload in watch mode and minified \
                  output in release mode."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// One-shot release build of every configured target
    Build(BuildArgs),

    /// Watch mode: dev server, live reload, rebuild on change
    Dev(DevArgs),

    /// Validate the configuration without building
    Check(CheckArgs),
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Config file path (default: skiff.toml in the working directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Build only the named target instead of all targets
    #[arg(short, long)]
    pub target: Option<String>,

    /// Remove output directory contents before building
    #[arg(long)]
    pub clean: bool,

    /// Working directory for resolving relative paths
    #[arg(long)]
    pub cwd: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct DevArgs {
    /// Config file path (default: skiff.toml in the working directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Port for the development server (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Do not open the browser on startup
    #[arg(long)]
    pub no_open: bool,

    /// Working directory for resolving relative paths
    #[arg(long)]
    pub cwd: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Config file path (default: skiff.toml in the working directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Working directory for resolving relative paths
    #[arg(long)]
    pub cwd: Option<PathBuf>,
}
