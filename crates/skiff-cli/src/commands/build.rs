//! `skiff build` - one-shot release build.
//!
//! Every configured target is attempted, concurrently and independently; a
//! failure in one target never aborts another. The command fails (non-zero
//! exit) if any target failed, but only after all of them have run.

use std::sync::Arc;
use std::time::Instant;

use skiff_config::{BuildMode, Config, ConfigValidator, FsValidator};
use skiff_pipeline::{CargoWasm, Orchestrator};

use crate::cli::BuildArgs;
use crate::commands::utils;
use crate::error::{CliError, Result};
use crate::ui;

pub async fn execute(args: BuildArgs) -> Result<()> {
    let started = Instant::now();

    let cwd = utils::resolve_cwd(args.cwd.as_deref())?;
    let config = Config::load(&cwd, args.config.as_deref())?;
    FsValidator.validate(&config)?;

    let targets: Vec<_> = match &args.target {
        Some(name) => {
            let target = config.target(name).cloned().ok_or_else(|| {
                CliError::InvalidArgument(format!("no target named '{name}' in configuration"))
            })?;
            vec![target]
        }
        None => config.targets.clone(),
    };

    if args.clean {
        for target in &targets {
            ui::info(&format!(
                "Cleaning output directory: {}",
                target.out_dir.display()
            ));
            utils::clean_output_dir(&target.out_dir)?;
        }
    }

    ui::info(&format!(
        "Building {} target(s) in release mode...",
        targets.len()
    ));

    let orchestrator = Orchestrator::new(Arc::new(CargoWasm::new()), BuildMode::Release);
    let results = orchestrator.run_all(&targets).await;

    let mut failed = 0;
    for (target, result) in &results {
        match result {
            Ok(outcome) => {
                let size = std::fs::metadata(&outcome.bundle_path)
                    .map(|m| m.len())
                    .unwrap_or(0);
                ui::success(&format!(
                    "{}: {} ({}) in {}ms",
                    target.name,
                    outcome.bundle_path.display(),
                    ui::format_size(size),
                    outcome.duration_ms
                ));
            }
            Err(e) => {
                failed += 1;
                ui::error(&format!("{}: {e}", target.name));
            }
        }
    }

    if failed > 0 {
        return Err(CliError::TargetsFailed {
            failed,
            total: results.len(),
        });
    }

    ui::success(&format!(
        "Build completed in {}",
        ui::format_duration(started.elapsed())
    ));
    Ok(())
}
