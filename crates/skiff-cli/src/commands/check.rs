//! `skiff check` - validate configuration without building.

use skiff_config::{Config, ConfigValidator, FsValidator};

use crate::cli::CheckArgs;
use crate::commands::utils;
use crate::error::Result;
use crate::ui;

pub fn execute(args: CheckArgs) -> Result<()> {
    let cwd = utils::resolve_cwd(args.cwd.as_deref())?;
    let config = Config::load(&cwd, args.config.as_deref())?;
    FsValidator.validate(&config)?;

    for target in &config.targets {
        ui::info(&format!(
            "{}: {} -> {}",
            target.name,
            target.manifest.display(),
            target.out_dir.display()
        ));
    }

    ui::success(&format!(
        "Configuration ok: {} target(s)",
        config.targets.len()
    ));
    Ok(())
}
