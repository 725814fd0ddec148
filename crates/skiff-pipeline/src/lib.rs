//! Staged build pipeline for skiff.
//!
//! A build pass runs an ordered list of [`Stage`]s against one [`Target`]:
//! dependency resolution, native wasm compilation, static-asset copying,
//! module-format transformation, then the mode-conditional tail (dev serving
//! and live reload in watch mode, minification in release mode). Stages whose
//! predicate is false for the active [`BuildMode`] are skipped entirely; the
//! build state is passed through untouched.
//!
//! The external toolchain (cargo, wasm-bindgen, the minifier) sits behind the
//! [`Toolchain`] trait so the pipeline can be exercised without a wasm
//! toolchain installed.
//!
//! [`Target`]: skiff_config::Target
//! [`BuildMode`]: skiff_config::BuildMode

pub mod assets;
pub mod emit;
pub mod error;
pub mod orchestrator;
pub mod stage;
pub mod state;
pub mod toolchain;

pub use error::{BuildError, Result};
pub use orchestrator::{BuildOutcome, Orchestrator};
pub use stage::{default_stages, Stage, StageKind};
pub use state::{BuildPhase, BuildState, ModuleGraph, WasmArtifact};
pub use toolchain::{CargoWasm, Toolchain};
