//! Shared state for the development server.
//!
//! Tracks per-target build phases and connected live-reload clients behind
//! parking_lot locks. The dev server reads phases to decide between serving
//! files and showing the failure page; the rebuild loop writes them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use skiff_pipeline::BuildPhase;
use tokio::sync::mpsc;

use crate::dev::DevEvent;

/// Shared handle passed between the server, watcher, and rebuild loop.
pub type SharedState = Arc<DevState>;

pub struct DevState {
    /// Phase of the most recent pass, per target name.
    phases: RwLock<HashMap<String, BuildPhase>>,

    /// Connected SSE clients, keyed by id.
    clients: RwLock<HashMap<usize, mpsc::Sender<String>>>,

    next_client_id: RwLock<usize>,

    /// Directory the dev server serves files from.
    serve_root: PathBuf,
}

impl DevState {
    pub fn new(serve_root: PathBuf) -> Self {
        Self {
            phases: RwLock::new(HashMap::new()),
            clients: RwLock::new(HashMap::new()),
            next_client_id: RwLock::new(0),
            serve_root,
        }
    }

    pub fn serve_root(&self) -> &Path {
        &self.serve_root
    }

    pub fn set_phase(&self, target: &str, phase: BuildPhase) {
        self.phases.write().insert(target.to_string(), phase);
    }

    pub fn phase(&self, target: &str) -> Option<BuildPhase> {
        self.phases.read().get(target).cloned()
    }

    /// First failed target, if any pass is currently in the failed phase.
    pub fn first_failure(&self) -> Option<(String, String)> {
        self.phases
            .read()
            .iter()
            .find_map(|(target, phase)| {
                phase
                    .error()
                    .map(|error| (target.clone(), error.to_string()))
            })
    }

    /// True while any target's pass is between start and terminal phase.
    pub fn build_in_flight(&self) -> bool {
        self.phases
            .read()
            .values()
            .any(|phase| !matches!(phase, BuildPhase::Idle) && !phase.is_terminal())
    }

    /// Register a new SSE client, returning its id and event receiver.
    pub fn register_client(&self) -> (usize, mpsc::Receiver<String>) {
        let id = {
            let mut next = self.next_client_id.write();
            let id = *next;
            *next += 1;
            id
        };

        let (tx, rx) = mpsc::channel(64);
        self.clients.write().insert(id, tx);
        (id, rx)
    }

    pub fn unregister_client(&self, id: usize) {
        self.clients.write().remove(&id);
    }

    pub fn client_count(&self) -> usize {
        self.clients.read().len()
    }

    /// Push an event to every connected client, pruning the ones whose
    /// channel has gone away.
    pub async fn broadcast(&self, event: &DevEvent) {
        let json = match serde_json::to_string(event) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize dev event");
                return;
            }
        };

        let clients: Vec<(usize, mpsc::Sender<String>)> = self
            .clients
            .read()
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect();

        for (id, tx) in clients {
            if tx.send(json.clone()).await.is_err() {
                self.unregister_client(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> DevState {
        DevState::new(PathBuf::from("dist"))
    }

    #[test]
    fn phases_track_per_target() {
        let state = state();
        state.set_phase("index", BuildPhase::Compiling);
        state.set_phase("why-ui", BuildPhase::Done);

        assert_eq!(state.phase("index"), Some(BuildPhase::Compiling));
        assert_eq!(state.phase("why-ui"), Some(BuildPhase::Done));
        assert_eq!(state.phase("missing"), None);
        assert!(state.build_in_flight());

        state.set_phase("index", BuildPhase::Done);
        assert!(!state.build_in_flight());
    }

    #[test]
    fn first_failure_surfaces_the_error() {
        let state = state();
        state.set_phase("index", BuildPhase::Done);
        assert!(state.first_failure().is_none());

        state.set_phase(
            "why-ui",
            BuildPhase::Failed {
                error: "cargo exited with status 101".to_string(),
            },
        );
        let (target, error) = state.first_failure().unwrap();
        assert_eq!(target, "why-ui");
        assert!(error.contains("101"));
    }

    #[tokio::test]
    async fn clients_register_and_prune() {
        let state = Arc::new(state());
        let (id1, _rx1) = state.register_client();
        let (id2, rx2) = state.register_client();
        assert_ne!(id1, id2);
        assert_eq!(state.client_count(), 2);

        // Dropping the receiver makes the next broadcast prune the client.
        drop(rx2);
        state
            .broadcast(&DevEvent::BuildStarted {
                target: "index".to_string(),
            })
            .await;
        assert_eq!(state.client_count(), 1);
    }
}
