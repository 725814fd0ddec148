//! The build orchestrator.
//!
//! One pass over one target is strictly sequential: stages run in their
//! declared order, each consuming the state its predecessors produced. A
//! stage error aborts the pass immediately. Independent targets carry no
//! shared mutable state and may run concurrently via [`Orchestrator::run_all`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use skiff_config::{validation, BuildMode, Target};
use tokio::task::JoinSet;

use crate::assets;
use crate::emit;
use crate::error::{BuildError, Result};
use crate::stage::{default_stages, Stage, StageKind};
use crate::state::{BuildPhase, BuildState};
use crate::toolchain::Toolchain;

/// Result of one successful build pass.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub target: String,
    pub bundle_path: PathBuf,
    pub map_path: Option<PathBuf>,
    pub wasm_path: Option<PathBuf>,
    pub state: BuildState,
    pub duration_ms: u64,
}

/// Drives the stage list for each configured target.
#[derive(Clone)]
pub struct Orchestrator {
    toolchain: Arc<dyn Toolchain>,
    mode: BuildMode,
    stages: Vec<Stage>,
}

impl Orchestrator {
    /// Orchestrator with the fixed default stage order for `mode`.
    pub fn new(toolchain: Arc<dyn Toolchain>, mode: BuildMode) -> Self {
        Self {
            stages: default_stages(mode),
            toolchain,
            mode,
        }
    }

    /// Replace the stage list. Order is preserved as given.
    pub fn with_stages(mut self, stages: Vec<Stage>) -> Self {
        self.stages = stages;
        self
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    /// Execute one full build pass for `target`.
    ///
    /// The entry manifest is checked before the output directory is created,
    /// so a misconfigured target leaves no trace on disk.
    pub async fn run(&self, target: &Target) -> Result<BuildOutcome> {
        let started = Instant::now();

        validation::validate_manifest(&target.name, &target.manifest)
            .map_err(|e| BuildError::configuration(&target.name, e))?;

        std::fs::create_dir_all(&target.out_dir)
            .map_err(|e| BuildError::io(&target.name, &target.out_dir, e))?;

        let mut state = BuildState::default();
        for stage in &self.stages {
            state = self.apply_stage(target, stage, state).await.map_err(|e| {
                tracing::error!(
                    target = %target.name,
                    stage = %stage.kind(),
                    error = %e,
                    "build pass aborted"
                );
                e
            })?;
        }

        let outcome = self.materialize(target, state, started)?;
        tracing::info!(
            target = %target.name,
            mode = %self.mode,
            duration_ms = outcome.duration_ms,
            "build pass complete"
        );
        Ok(outcome)
    }

    /// Apply one stage. A stage whose predicate is false for the active mode
    /// returns the state unchanged.
    pub async fn apply_stage(
        &self,
        target: &Target,
        stage: &Stage,
        mut state: BuildState,
    ) -> Result<BuildState> {
        if !stage.enabled_in(self.mode) {
            tracing::debug!(target = %target.name, stage = %stage.kind(), "stage skipped");
            return Ok(state);
        }

        tracing::debug!(
            target = %target.name,
            stage = %stage.kind(),
            phase = ?phase_for(stage.kind()),
            "stage running"
        );

        match stage {
            Stage::Resolve => {
                state.graph = Some(self.toolchain.resolve(target).await?);
            }
            Stage::CompileNative { release } => {
                state.artifact = Some(self.toolchain.compile(target, *release).await?);
            }
            Stage::CopyAssets => {
                state.copied_assets = assets::copy_assets(target)?;
            }
            Stage::TransformCommonjs => {
                let artifact = state.artifact.as_ref().ok_or_else(|| BuildError::Stage {
                    target: target.name.clone(),
                    stage: StageKind::TransformCommonjs,
                    message: "no compiled artifact to transform".to_string(),
                })?;
                state.bundle = Some(emit::wrap_iife(target, &artifact.glue_js));
                if target.sourcemaps {
                    state.source_map = Some(emit::source_map(target, state.graph.as_ref()));
                }
            }
            Stage::Serve => {
                state.dev_server_requested = true;
            }
            Stage::LiveReload => {
                state.live_reload_requested = true;
            }
            Stage::Minify => {
                let bundle = state.bundle.take().ok_or_else(|| BuildError::Stage {
                    target: target.name.clone(),
                    stage: StageKind::Minify,
                    message: "no bundle to minify".to_string(),
                })?;
                state.bundle = Some(self.toolchain.minify(&bundle));
            }
        }

        Ok(state)
    }

    /// Build every target, concurrently and independently. Failures in one
    /// target never abort another; results come back in the input order.
    pub async fn run_all(&self, targets: &[Target]) -> Vec<(Target, Result<BuildOutcome>)> {
        let mut set = JoinSet::new();
        for (index, target) in targets.iter().cloned().enumerate() {
            let orchestrator = self.clone();
            set.spawn(async move {
                let result = orchestrator.run(&target).await;
                (index, target, result)
            });
        }

        let mut results: Vec<Option<(Target, Result<BuildOutcome>)>> =
            targets.iter().map(|_| None).collect();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, target, result)) => results[index] = Some((target, result)),
                Err(e) => tracing::error!(error = %e, "build task panicked"),
            }
        }

        results.into_iter().flatten().collect()
    }

    /// Write the pass's artifacts into the output directory.
    fn materialize(
        &self,
        target: &Target,
        state: BuildState,
        started: Instant,
    ) -> Result<BuildOutcome> {
        let wasm_path = match &state.artifact {
            Some(artifact) => {
                let path = target.out_dir.join(target.wasm_file_name());
                std::fs::write(&path, &artifact.wasm)
                    .map_err(|e| BuildError::io(&target.name, &path, e))?;
                Some(path)
            }
            None => None,
        };

        let bundle_path = target.out_dir.join(target.bundle_file_name());
        let map_path = match (&state.bundle, &state.source_map) {
            (Some(bundle), Some(map)) => {
                let map_path = target.out_dir.join(target.map_file_name());
                std::fs::write(&map_path, map)
                    .map_err(|e| BuildError::io(&target.name, &map_path, e))?;

                let mut text = bundle.clone();
                text.push_str(&emit::source_map_reference(target));
                std::fs::write(&bundle_path, text)
                    .map_err(|e| BuildError::io(&target.name, &bundle_path, e))?;
                Some(map_path)
            }
            (Some(bundle), None) => {
                std::fs::write(&bundle_path, bundle)
                    .map_err(|e| BuildError::io(&target.name, &bundle_path, e))?;
                None
            }
            (None, _) => {
                return Err(BuildError::Stage {
                    target: target.name.clone(),
                    stage: StageKind::TransformCommonjs,
                    message: "pipeline produced no bundle".to_string(),
                });
            }
        };

        Ok(BuildOutcome {
            target: target.name.clone(),
            bundle_path,
            map_path,
            wasm_path,
            state,
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }
}

/// Map a stage to the phase the pass is in while that stage runs.
pub fn phase_for(kind: StageKind) -> BuildPhase {
    match kind {
        StageKind::Resolve => BuildPhase::Resolving,
        StageKind::CompileNative => BuildPhase::Compiling,
        StageKind::CopyAssets | StageKind::TransformCommonjs => BuildPhase::Packaging,
        StageKind::Serve | StageKind::LiveReload => BuildPhase::Serving,
        StageKind::Minify => BuildPhase::Finalizing,
    }
}
