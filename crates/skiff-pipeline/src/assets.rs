//! Static-asset copying.
//!
//! A copy rule is either a directory prefix ("static") copied recursively, or
//! an extension pattern ("*.css") matched anywhere under the crate root. Both
//! are resolved relative to the target's crate directory and land under the
//! rule's destination inside the output directory.

use std::path::{Path, PathBuf};

use skiff_config::{CopyRule, Target};
use walkdir::WalkDir;

use crate::error::{BuildError, Result};
use crate::stage::StageKind;

/// Apply all copy rules for a target. Returns the destination paths written,
/// relative to the output directory, in sorted order.
pub fn copy_assets(target: &Target) -> Result<Vec<PathBuf>> {
    let mut copied = Vec::new();

    for rule in &target.copy {
        copied.extend(apply_rule(target, rule)?);
    }

    copied.sort();
    Ok(copied)
}

fn apply_rule(target: &Target, rule: &CopyRule) -> Result<Vec<PathBuf>> {
    let crate_dir = target.crate_dir();
    let dest_root = if rule.to.is_empty() {
        target.out_dir.clone()
    } else {
        target.out_dir.join(&rule.to)
    };

    if let Some(ext_pattern) = rule.from.strip_prefix("*.") {
        copy_by_extension(target, crate_dir, ext_pattern, &dest_root)
    } else {
        let source_dir = crate_dir.join(&rule.from);
        if !source_dir.is_dir() {
            return Err(BuildError::Stage {
                target: target.name.clone(),
                stage: StageKind::CopyAssets,
                message: format!("copy source is not a directory: {}", source_dir.display()),
            });
        }
        copy_tree(target, &source_dir, &dest_root)
    }
}

fn copy_by_extension(
    target: &Target,
    crate_dir: &Path,
    extension: &str,
    dest_root: &Path,
) -> Result<Vec<PathBuf>> {
    let mut copied = Vec::new();

    for entry in WalkDir::new(crate_dir).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        // Never re-copy something already in the output directory.
        if path.starts_with(&target.out_dir) {
            continue;
        }

        let file_name = match path.file_name() {
            Some(name) => name,
            None => continue,
        };
        let dest = dest_root.join(file_name);
        copy_one(target, path, &dest)?;
        copied.push(relative_dest(&target.out_dir, &dest));
    }

    Ok(copied)
}

fn copy_tree(target: &Target, source_dir: &Path, dest_root: &Path) -> Result<Vec<PathBuf>> {
    let mut copied = Vec::new();

    for entry in WalkDir::new(source_dir) {
        let entry = entry.map_err(|e| BuildError::Stage {
            target: target.name.clone(),
            stage: StageKind::CopyAssets,
            message: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let rel = entry
            .path()
            .strip_prefix(source_dir)
            .expect("walkdir yields paths under its root");
        let dest = dest_root.join(rel);
        copy_one(target, entry.path(), &dest)?;
        copied.push(relative_dest(&target.out_dir, &dest));
    }

    Ok(copied)
}

fn copy_one(target: &Target, source: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| BuildError::io(&target.name, parent, e))?;
    }
    std::fs::copy(source, dest).map_err(|e| BuildError::io(&target.name, source, e))?;
    tracing::debug!(target = %target.name, from = %source.display(), to = %dest.display(), "copied asset");
    Ok(())
}

fn relative_dest(out_dir: &Path, dest: &Path) -> PathBuf {
    dest.strip_prefix(out_dir).unwrap_or(dest).to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, Target) {
        let temp = TempDir::new().unwrap();
        let crate_dir = temp.path().join("app");
        fs::create_dir_all(crate_dir.join("static/img")).unwrap();
        fs::write(crate_dir.join("Cargo.toml"), "[package]\nname = \"app\"\n").unwrap();
        fs::write(crate_dir.join("static/index.html"), "<html></html>").unwrap();
        fs::write(crate_dir.join("static/img/logo.svg"), "<svg/>").unwrap();
        fs::write(crate_dir.join("style.css"), "body {}").unwrap();

        let target = Target::new(
            "index",
            crate_dir.join("Cargo.toml"),
            temp.path().join("dist"),
        );
        (temp, target)
    }

    #[test]
    fn empty_rule_list_copies_nothing() {
        let (_temp, target) = fixture();
        let copied = copy_assets(&target).unwrap();
        assert!(copied.is_empty());
    }

    #[test]
    fn directory_rule_preserves_structure() {
        let (_temp, mut target) = fixture();
        target.copy.push(CopyRule {
            from: "static".to_string(),
            to: String::new(),
        });

        let copied = copy_assets(&target).unwrap();
        assert_eq!(copied, vec![PathBuf::from("img/logo.svg"), PathBuf::from("index.html")]);
        assert!(target.out_dir.join("index.html").is_file());
        assert!(target.out_dir.join("img/logo.svg").is_file());
    }

    #[test]
    fn extension_rule_collects_matches_into_destination() {
        let (_temp, mut target) = fixture();
        target.copy.push(CopyRule {
            from: "*.css".to_string(),
            to: "css".to_string(),
        });

        let copied = copy_assets(&target).unwrap();
        assert_eq!(copied, vec![PathBuf::from("css/style.css")]);
        assert!(target.out_dir.join("css/style.css").is_file());
    }

    #[test]
    fn missing_source_directory_is_a_stage_error() {
        let (_temp, mut target) = fixture();
        target.copy.push(CopyRule {
            from: "no-such-dir".to_string(),
            to: String::new(),
        });

        let err = copy_assets(&target).unwrap_err();
        assert!(matches!(
            err,
            BuildError::Stage {
                stage: StageKind::CopyAssets,
                ..
            }
        ));
    }
}
