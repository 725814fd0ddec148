//! `skiff dev` - watch mode with dev server and live reload.
//!
//! Runs an initial build pass over every target, then keeps a file watcher
//! and dev server alive. File changes trigger a rebuild of the affected
//! targets only; at most one rebuild pass is in flight at a time, and change
//! events arriving during a pass are coalesced into a single follow-up pass.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use skiff_config::{BuildMode, Config, ConfigValidator, FsValidator, Target};
use skiff_pipeline::{BuildPhase, CargoWasm, Orchestrator};

use crate::cli::DevArgs;
use crate::commands::utils;
use crate::dev::{DevEvent, DevServer, DevState, FileChange, FileWatcher, SharedState};
use crate::error::{CliError, Result};
use crate::ui;

pub async fn execute(args: DevArgs) -> Result<()> {
    let cwd = utils::resolve_cwd(args.cwd.as_deref())?;
    let config = Config::load(&cwd, args.config.as_deref())?;
    FsValidator.validate(&config)?;

    let port = args.port.unwrap_or(config.dev.port);
    let addr: SocketAddr = ([127, 0, 0, 1], port).into();

    let serve_root = serve_root_for(&config.targets, &cwd);
    let state: SharedState = Arc::new(DevState::new(serve_root));

    let orchestrator = Orchestrator::new(Arc::new(CargoWasm::new()), BuildMode::Watch);

    // Initial pass. Failures are reported and remembered, but watch mode
    // keeps running so a fix triggers a rebuild.
    ui::info(&format!(
        "Starting development build of {} target(s)...",
        config.targets.len()
    ));
    for target in &config.targets {
        rebuild_target(&orchestrator, target, &state).await;
    }

    let (watcher, mut changes) =
        FileWatcher::new(cwd.clone(), config.dev.ignore.clone(), config.dev.debounce_ms)?;
    tracing::debug!(root = %watcher.root().display(), "watching for file changes");

    let server = DevServer::new(addr, state.clone());
    let mut server_task = tokio::spawn(server.start());

    if config.dev.open && !args.no_open {
        utils::open_browser(&format!("http://{addr}"));
    }

    ui::info("Watching for changes. Press Ctrl+C to stop.");

    loop {
        tokio::select! {
            change = changes.recv() => {
                let Some(change) = change else {
                    tracing::warn!("file watcher channel closed");
                    break;
                };

                let batch = coalesce(change, &mut changes);
                run_batch(&orchestrator, &config.targets, &batch, &state).await;
            }
            result = &mut server_task => {
                match result {
                    Ok(Err(e)) => return Err(e),
                    Ok(Ok(())) => tracing::warn!("dev server stopped"),
                    Err(e) => return Err(CliError::Server(e.to_string())),
                }
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                ui::info("Shutting down.");
                break;
            }
        }
    }

    server_task.abort();
    Ok(())
}

/// Rebuild every target affected by one coalesced change batch: exactly one
/// pass per affected target. A failed pass is recorded in the shared state
/// and broadcast; it never tears down the watcher or the server.
async fn run_batch(
    orchestrator: &Orchestrator,
    targets: &[Target],
    batch: &[FileChange],
    state: &SharedState,
) {
    for target in affected_targets(targets, batch) {
        rebuild_target(orchestrator, target, state).await;
    }
}

/// Run one pass for one target, updating shared phase state and notifying
/// connected clients.
async fn rebuild_target(orchestrator: &Orchestrator, target: &Target, state: &SharedState) {
    let started = Instant::now();
    state.set_phase(&target.name, BuildPhase::Resolving);
    state
        .broadcast(&DevEvent::BuildStarted {
            target: target.name.clone(),
        })
        .await;

    match orchestrator.run(target).await {
        Ok(outcome) => {
            state.set_phase(&target.name, BuildPhase::Done);
            let duration_ms = started.elapsed().as_millis() as u64;
            ui::success(&format!(
                "{}: {} in {}ms",
                target.name,
                outcome.bundle_path.display(),
                duration_ms
            ));
            state
                .broadcast(&DevEvent::BuildCompleted {
                    target: target.name.clone(),
                    duration_ms,
                })
                .await;
        }
        Err(e) => {
            let error = e.to_string();
            ui::error(&format!("{}: {error}", target.name));
            state.set_phase(
                &target.name,
                BuildPhase::Failed {
                    error: error.clone(),
                },
            );
            state
                .broadcast(&DevEvent::BuildFailed {
                    target: target.name.clone(),
                    error,
                })
                .await;
        }
    }
}

/// Collect a change burst into one batch: everything already queued on the
/// watcher channel joins the pass triggered by `first`. Changes that arrive
/// mid-pass queue up and coalesce into the next pass the same way, so a
/// burst of saves yields one rebuild, not one per event.
fn coalesce(
    first: FileChange,
    changes: &mut tokio::sync::mpsc::Receiver<FileChange>,
) -> Vec<FileChange> {
    let mut batch = vec![first];
    while let Ok(change) = changes.try_recv() {
        batch.push(change);
    }
    batch
}

/// Targets affected by a batch of changes. Each change is attributed to the
/// target with the deepest crate directory containing it, so a change inside
/// a nested crate does not also rebuild a target rooted above it. A batch
/// touching no target's sources rebuilds everything, since shared files can
/// affect any target.
fn affected_targets<'a>(targets: &'a [Target], batch: &[FileChange]) -> Vec<&'a Target> {
    let mut matched: Vec<&Target> = Vec::new();
    for change in batch {
        let owner = targets
            .iter()
            .filter(|target| change.path.starts_with(target.crate_dir()))
            .max_by_key(|target| target.crate_dir().components().count());
        if let Some(owner) = owner {
            if !matched.iter().any(|t| t.name == owner.name) {
                matched.push(owner);
            }
        }
    }

    if matched.is_empty() {
        targets.iter().collect()
    } else {
        matched
    }
}

/// Deepest directory containing every target's output, so one server can
/// serve all of them.
fn serve_root_for(targets: &[Target], cwd: &Path) -> PathBuf {
    let mut iter = targets.iter().map(|t| t.out_dir.as_path());
    let Some(first) = iter.next() else {
        return cwd.to_path_buf();
    };

    let mut common = first.to_path_buf();
    for out_dir in iter {
        while !out_dir.starts_with(&common) {
            if !common.pop() {
                return cwd.to_path_buf();
            }
        }
    }
    common
}
