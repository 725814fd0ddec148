//! Configuration loading.
//!
//! Sources are layered with figment. Priority: environment variables
//! (`SKIFF_*`) > config file (`skiff.toml`) > defaults. The loaded config is
//! an ordered set of build targets plus global settings; it is read once at
//! startup and never mutated afterwards.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format as _, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::target::Target;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "skiff.toml";

/// Raw per-target table as it appears in the config file. The target name is
/// the table key, so it is absent here and filled in during flattening.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawTarget {
    manifest: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    sourcemaps: Option<bool>,
    #[serde(default)]
    copy: Vec<crate::target::CopyRule>,
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawConfig {
    /// `[targets.<name>]` tables. BTreeMap keeps target order deterministic.
    #[serde(default)]
    targets: BTreeMap<String, RawTarget>,

    #[serde(default)]
    dev: DevSettings,
}

/// Development server settings, shared by all targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevSettings {
    /// Port the dev server listens on.
    pub port: u16,
    /// Open the browser after the server starts.
    pub open: bool,
    /// Debounce window for file-change events, in milliseconds.
    pub debounce_ms: u64,
    /// Watch-ignore patterns (directory prefixes or `*.ext` suffixes).
    pub ignore: Vec<String>,
}

impl Default for DevSettings {
    fn default() -> Self {
        Self {
            port: 8080,
            open: true,
            debounce_ms: 150,
            ignore: vec![
                "target".to_string(),
                "dist".to_string(),
                "node_modules".to_string(),
            ],
        }
    }
}

/// Loaded, flattened configuration: an ordered list of build targets plus
/// dev-server settings.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub targets: Vec<Target>,
    pub dev: DevSettings,
}

impl Config {
    /// Load configuration from `skiff.toml` (or an explicit path) merged with
    /// `SKIFF_*` environment overrides.
    ///
    /// An explicit `config_path` that does not exist is an error; the default
    /// file is optional so that env-only configurations work.
    pub fn load(cwd: &Path, config_path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(RawConfig::default()));

        match config_path {
            Some(path) => {
                let path = if path.is_relative() { cwd.join(path) } else { path.to_path_buf() };
                if !path.exists() {
                    return Err(ConfigError::NotFound(path));
                }
                figment = figment.merge(Toml::file(path));
            }
            None => {
                let default_path = cwd.join(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    figment = figment.merge(Toml::file(default_path));
                }
            }
        }

        // SKIFF_DEV_PORT=3000, SKIFF_DEV_OPEN=false, etc.
        figment = figment.merge(Env::prefixed("SKIFF_").split("_"));

        let raw: RawConfig = figment.extract()?;
        let config = Self::flatten(raw, cwd)?;
        tracing::debug!(targets = config.targets.len(), "configuration loaded");
        Ok(config)
    }

    /// Build a config programmatically from already-constructed targets.
    pub fn from_targets(targets: Vec<Target>) -> Self {
        Self {
            targets,
            dev: DevSettings::default(),
        }
    }

    /// Look up a target by name.
    pub fn target(&self, name: &str) -> Option<&Target> {
        self.targets.iter().find(|t| t.name == name)
    }

    fn flatten(raw: RawConfig, cwd: &Path) -> Result<Self> {
        let mut targets = Vec::with_capacity(raw.targets.len());
        for (name, table) in raw.targets {
            let manifest = table.manifest.ok_or_else(|| ConfigError::InvalidValue {
                field: format!("targets.{name}.manifest"),
                message: "missing manifest path".to_string(),
            })?;
            let out_dir = table.out_dir.ok_or_else(|| ConfigError::InvalidValue {
                field: format!("targets.{name}.out_dir"),
                message: "missing output directory".to_string(),
            })?;

            let mut target = Target::new(name, manifest, out_dir);
            if let Some(sourcemaps) = table.sourcemaps {
                target.sourcemaps = sourcemaps;
            }
            target.copy = table.copy;
            targets.push(target.resolved_against(cwd));
        }

        Ok(Self {
            targets,
            dev: raw.dev,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_targets_preserves_order() {
        let config = Config::from_targets(vec![
            Target::new("index", "Cargo.toml", "dist/js"),
            Target::new("why-ui", "why-ui/Cargo.toml", "dist/why-ui"),
        ]);
        assert_eq!(config.targets[0].name, "index");
        assert_eq!(config.targets[1].name, "why-ui");
        assert!(config.target("why-ui").is_some());
        assert!(config.target("missing").is_none());
    }

    #[test]
    fn dev_settings_have_sane_defaults() {
        let dev = DevSettings::default();
        assert_eq!(dev.port, 8080);
        assert!(dev.open);
        assert!(dev.ignore.iter().any(|p| p == "target"));
    }
}
