//! Filesystem watcher for watch mode.
//!
//! Watches the project root recursively, filters out build output and other
//! ignored paths, and debounces bursts so one save does not trigger a stack
//! of rebuilds. A change event is the sole rebuild trigger.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
}

/// One debounced file-change event.
#[derive(Debug, Clone)]
pub struct FileChange {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

/// Recursive watcher with ignore patterns and per-path debouncing.
pub struct FileWatcher {
    // Held only to keep the notify watcher alive.
    _watcher: RecommendedWatcher,
    root: PathBuf,
}

impl FileWatcher {
    /// Watch `root` recursively. Events for ignored paths are dropped; a
    /// repeated event for the same path inside the debounce window is
    /// dropped too.
    pub fn new(
        root: PathBuf,
        ignore_patterns: Vec<String>,
        debounce_ms: u64,
    ) -> Result<(Self, mpsc::Receiver<FileChange>)> {
        let (tx, rx) = mpsc::channel(128);

        let debounce = Duration::from_millis(debounce_ms);
        let watch_root = root.clone();
        let mut last_seen: Option<(PathBuf, Instant)> = None;

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(_) => return,
            };

            let kind = match event.kind {
                EventKind::Create(_) => ChangeKind::Created,
                EventKind::Modify(_) => ChangeKind::Modified,
                EventKind::Remove(_) => ChangeKind::Removed,
                _ => return,
            };

            for path in event.paths {
                if should_ignore(&path, &watch_root, &ignore_patterns) {
                    continue;
                }

                let now = Instant::now();
                if let Some((seen_path, seen_at)) = &last_seen {
                    if *seen_path == path && now.duration_since(*seen_at) < debounce {
                        continue;
                    }
                }
                last_seen = Some((path.clone(), now));

                let _ = tx.blocking_send(FileChange { path, kind });
            }
        })?;

        watcher.watch(&root, RecursiveMode::Recursive)?;

        Ok((
            Self {
                _watcher: watcher,
                root,
            },
            rx,
        ))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Decide whether a changed path is relevant. Paths outside the root, under
/// an ignored directory, matching an ignored extension, or hidden are all
/// dropped.
fn should_ignore(path: &Path, root: &Path, ignore_patterns: &[String]) -> bool {
    let rel = match path.strip_prefix(root) {
        Ok(rel) => rel,
        Err(_) => return true,
    };

    let rel_str = rel.to_string_lossy();

    for pattern in ignore_patterns {
        if let Some(ext) = pattern.strip_prefix("*.") {
            if rel_str.ends_with(&format!(".{ext}")) {
                return true;
            }
        } else if rel_str.starts_with(pattern.as_str())
            || rel_str.contains(&format!("/{pattern}"))
        {
            return true;
        }
    }

    // Hidden files and directories (.git and friends).
    rel.components().any(|component| {
        component
            .as_os_str()
            .to_str()
            .is_some_and(|name| name.starts_with('.') && name != "." && name != "..")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> Vec<String> {
        vec!["target".to_string(), "dist".to_string(), "*.log".to_string()]
    }

    #[test]
    fn ignores_build_output_directories() {
        let root = PathBuf::from("/project");
        assert!(should_ignore(
            &root.join("target/wasm32-unknown-unknown/debug/app.wasm"),
            &root,
            &patterns()
        ));
        assert!(should_ignore(&root.join("dist/js/index.js"), &root, &patterns()));
        assert!(!should_ignore(&root.join("src/lib.rs"), &root, &patterns()));
    }

    #[test]
    fn ignores_extension_patterns() {
        let root = PathBuf::from("/project");
        assert!(should_ignore(&root.join("build.log"), &root, &patterns()));
        assert!(!should_ignore(&root.join("Cargo.toml"), &root, &patterns()));
    }

    #[test]
    fn ignores_hidden_paths() {
        let root = PathBuf::from("/project");
        assert!(should_ignore(&root.join(".git/HEAD"), &root, &[]));
        assert!(should_ignore(&root.join("src/.cache/x"), &root, &[]));
    }

    #[test]
    fn ignores_paths_outside_the_root() {
        let root = PathBuf::from("/project");
        assert!(should_ignore(Path::new("/elsewhere/file.rs"), &root, &[]));
    }

    #[test]
    fn nested_ignored_directory_matches() {
        let root = PathBuf::from("/project");
        assert!(should_ignore(
            &root.join("why-ui/target/debug/ui.wasm"),
            &root,
            &patterns()
        ));
    }
}
