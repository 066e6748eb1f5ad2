//! Shared state for the dev host.
//!
//! The update callback records every dispatched snapshot into a
//! [`SnapshotLog`]; the HTTP handlers read it through [`HostState`].

use parking_lot::RwLock;
use serde::Serialize;
use ssr_dev::{ArtifactSnapshot, DevServer, HotEvent, OutputFileSystem, ReadyHandle, Slot};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Latest snapshot handed to the update callback, plus a dispatch counter.
#[derive(Debug, Default)]
pub struct SnapshotLog {
    latest: RwLock<Option<ArtifactSnapshot>>,
    updates: AtomicU64,
}

impl SnapshotLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `snapshot` as the latest and return how many have been recorded.
    pub fn record(&self, snapshot: ArtifactSnapshot) -> u64 {
        *self.latest.write() = Some(snapshot);
        self.updates.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn updates(&self) -> u64 {
        self.updates.load(Ordering::Relaxed)
    }

    pub fn latest(&self) -> Option<ArtifactSnapshot> {
        self.latest.read().clone()
    }
}

/// Body of the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostStatus {
    pub ready: bool,
    pub updates: u64,
    /// Slot name -> whether the host has seen a value for it
    pub slots: BTreeMap<&'static str, bool>,
}

/// State shared by every route of the dev host.
#[derive(Debug)]
pub struct HostState {
    ready: ReadyHandle,
    snapshots: Arc<SnapshotLog>,
    client_fs: Arc<dyn OutputFileSystem>,
    output_dir: PathBuf,
    hot_events: broadcast::Sender<HotEvent>,
    heartbeat: Duration,
}

/// Shared state handle for axum.
pub type SharedState = Arc<HostState>;

impl HostState {
    pub fn new(
        ready: ReadyHandle,
        snapshots: Arc<SnapshotLog>,
        client_fs: Arc<dyn OutputFileSystem>,
        output_dir: impl Into<PathBuf>,
        hot_events: broadcast::Sender<HotEvent>,
        heartbeat: Duration,
    ) -> Self {
        Self {
            ready,
            snapshots,
            client_fs,
            output_dir: output_dir.into(),
            hot_events,
            heartbeat,
        }
    }

    /// Wire the host to a running coordinator.
    pub fn from_dev_server(
        dev: &DevServer,
        snapshots: Arc<SnapshotLog>,
        output_dir: impl Into<PathBuf>,
        heartbeat: Duration,
    ) -> Self {
        Self::new(
            dev.ready(),
            snapshots,
            dev.client_fs(),
            output_dir,
            dev.hot_sender(),
            heartbeat,
        )
    }

    pub fn client_fs(&self) -> &Arc<dyn OutputFileSystem> {
        &self.client_fs
    }

    /// Directory client assets are keyed under in [`Self::client_fs`].
    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HotEvent> {
        self.hot_events.subscribe()
    }

    pub fn heartbeat(&self) -> Duration {
        self.heartbeat
    }

    pub fn status(&self) -> HostStatus {
        // Snapshots only exist once all slots are populated; the template is
        // read before anything else starts.
        let seen = self.snapshots.latest().is_some();
        let slots = Slot::ALL
            .into_iter()
            .map(|slot| (slot.name(), !slot.gates_readiness() || seen))
            .collect();

        HostStatus {
            ready: self.ready.is_ready(),
            updates: self.snapshots.updates(),
            slots,
        }
    }
}
