//! Watch-mode support: shared state, dev server, file watcher.

pub mod server;
pub mod state;
pub mod watcher;

pub use server::DevServer;
pub use state::{DevState, SharedState};
pub use watcher::{ChangeKind, FileChange, FileWatcher};

use serde::{Deserialize, Serialize};

/// Events pushed to connected live-reload clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum DevEvent {
    BuildStarted { target: String },
    BuildCompleted { target: String, duration_ms: u64 },
    BuildFailed { target: String, error: String },
    ClientConnected { id: usize },
}
