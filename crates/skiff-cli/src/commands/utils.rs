//! Shared helpers for command implementations.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CliError, Result};

/// Resolve the working directory: an explicit `--cwd` wins, otherwise the
/// process working directory.
pub fn resolve_cwd(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => std::env::current_dir().map_err(CliError::Io),
    }
}

/// Remove the contents of an output directory, keeping the directory itself.
/// Creates it if missing.
pub fn clean_output_dir(out_dir: &Path) -> Result<()> {
    if out_dir.exists() {
        if !out_dir.is_dir() {
            return Err(CliError::InvalidArgument(format!(
                "output path exists but is not a directory: {}",
                out_dir.display()
            )));
        }
        for entry in fs::read_dir(out_dir)? {
            let path = entry?.path();
            if path.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
        }
    } else {
        fs::create_dir_all(out_dir)?;
    }
    Ok(())
}

/// Open a URL in the default browser. Failure is reported, never fatal.
pub fn open_browser(url: &str) {
    use std::process::Command;

    let result = if cfg!(target_os = "macos") {
        Command::new("open").arg(url).spawn()
    } else if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", "start", url]).spawn()
    } else {
        Command::new("xdg-open").arg(url).spawn()
    };

    match result {
        Ok(_) => crate::ui::info(&format!("Opened browser at {url}")),
        Err(e) => crate::ui::warning(&format!("Failed to open browser: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn clean_creates_missing_directory() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("dist");
        clean_output_dir(&out).unwrap();
        assert!(out.is_dir());
    }

    #[test]
    fn clean_empties_existing_directory() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("dist");
        fs::create_dir_all(out.join("sub")).unwrap();
        fs::write(out.join("old.js"), "x").unwrap();

        clean_output_dir(&out).unwrap();
        assert!(out.is_dir());
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn clean_rejects_a_file_path() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("dist");
        fs::write(&file, "not a dir").unwrap();
        assert!(clean_output_dir(&file).is_err());
    }
}
