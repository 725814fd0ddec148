//! Pluggable config validation strategies.
//!
//! Schema validation (no filesystem access) is separated from filesystem
//! validation so that library and test callers can validate in-memory
//! configurations.

use std::path::Path;

use crate::error::{ConfigError, Result};
use crate::loader::Config;

/// Trait for pluggable config validation strategies.
pub trait ConfigValidator {
    fn validate(&self, config: &Config) -> Result<()>;
}

/// Schema-only validation: target set shape, unique names, copy rules.
pub struct SchemaValidator;

impl ConfigValidator for SchemaValidator {
    fn validate(&self, config: &Config) -> Result<()> {
        if config.targets.is_empty() {
            return Err(ConfigError::NoTargets);
        }

        for (i, target) in config.targets.iter().enumerate() {
            if target.name.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "targets".to_string(),
                    message: "target names cannot be empty".to_string(),
                });
            }

            if config.targets[..i].iter().any(|t| t.name == target.name) {
                return Err(ConfigError::InvalidValue {
                    field: format!("targets.{}", target.name),
                    message: "duplicate target name".to_string(),
                });
            }

            // Two targets writing into the same directory would interleave
            // their artifacts.
            if config.targets[..i].iter().any(|t| t.out_dir == target.out_dir) {
                return Err(ConfigError::InvalidValue {
                    field: format!("targets.{}.out_dir", target.name),
                    message: format!(
                        "output directory {} is shared with another target",
                        target.out_dir.display()
                    ),
                });
            }

            for rule in &target.copy {
                if rule.from.trim().is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: format!("targets.{}.copy", target.name),
                        message: "copy rule 'from' pattern cannot be empty".to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Filesystem validator: entry manifests must exist on disk.
pub struct FsValidator;

impl ConfigValidator for FsValidator {
    fn validate(&self, config: &Config) -> Result<()> {
        SchemaValidator.validate(config)?;

        for target in &config.targets {
            validate_manifest(&target.name, &target.manifest)?;
        }

        Ok(())
    }
}

/// Check that a target's entry manifest exists and is a file.
pub fn validate_manifest(target: &str, manifest: &Path) -> Result<()> {
    if !manifest.is_file() {
        return Err(ConfigError::ManifestNotFound {
            target: target.to_string(),
            path: manifest.to_path_buf(),
        });
    }
    Ok(())
}
