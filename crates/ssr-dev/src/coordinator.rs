//! Readiness coordinator.
//!
//! The coordinator owns the [`ArtifactStore`] and is the only place where
//! slot writes are applied. It tracks a two-state lifecycle:
//!
//! ```text
//! Pending ──(client manifest + server bundle + error bundle present)──> Ready
//! ```
//!
//! The transition fires the [`ReadySignal`] once. From then on every write
//! produces a fresh [`ArtifactSnapshot`] for the update handler. There is no
//! way back to `Pending`: slots are only ever replaced, never cleared.

use crate::error::{Error, Result};
use crate::store::{ArtifactSnapshot, ArtifactStore, Slot, SlotUpdate};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;

/// Coordinator lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// At least one readiness-gating slot is still absent
    Pending,
    /// All gating slots have been present at least once
    Ready,
}

/// What a single write asks the caller to deliver.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    /// This write completed readiness
    pub became_ready: bool,
    /// Snapshot for the update handler, `None` while pending
    pub snapshot: Option<ArtifactSnapshot>,
}

impl Dispatch {
    fn none() -> Self {
        Self {
            became_ready: false,
            snapshot: None,
        }
    }
}

/// Synchronous readiness state machine.
#[derive(Debug)]
pub struct Coordinator {
    store: ArtifactStore,
    phase: Phase,
    dispatches: u64,
}

impl Coordinator {
    /// Start pending, with the template read at startup.
    pub fn new(template: impl Into<Arc<str>>) -> Self {
        Self {
            store: ArtifactStore::new(template),
            phase: Phase::Pending,
            dispatches: 0,
        }
    }

    /// Apply one slot write and decide what to dispatch.
    pub fn apply(&mut self, update: SlotUpdate) -> Dispatch {
        let slot = update.slot();
        self.store.apply(update);

        let Some(snapshot) = self.store.snapshot() else {
            tracing::debug!(
                %slot,
                missing = ?self.missing(),
                "Slot updated, still waiting for build artifacts"
            );
            return Dispatch::none();
        };

        let became_ready = self.mark_ready();
        self.dispatches += 1;
        Dispatch {
            became_ready,
            snapshot: Some(snapshot),
        }
    }

    /// Idempotent Pending -> Ready transition; true only the first time.
    fn mark_ready(&mut self) -> bool {
        match self.phase {
            Phase::Pending => {
                self.phase = Phase::Ready;
                true
            }
            Phase::Ready => false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of snapshots handed out so far.
    pub fn dispatch_count(&self) -> u64 {
        self.dispatches
    }

    /// Readiness-gating slots that have never been written.
    pub fn missing(&self) -> Vec<Slot> {
        Slot::ALL
            .into_iter()
            .filter(|slot| slot.gates_readiness() && !self.store.is_present(*slot))
            .collect()
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }
}

/// Sending half of the one-shot completion signal.
#[derive(Debug)]
pub struct ReadySignal {
    tx: watch::Sender<bool>,
}

impl ReadySignal {
    /// Fire the signal. Returns `false` if it had already fired.
    pub fn fire(&self) -> bool {
        !self.tx.send_replace(true)
    }
}

/// Awaitable view of the completion signal.
///
/// Cheap to clone; every clone observes the same signal.
#[derive(Debug, Clone)]
pub struct ReadyHandle {
    rx: watch::Receiver<bool>,
}

impl ReadyHandle {
    /// Non-blocking readiness check.
    pub fn is_ready(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until every build artifact is available.
    ///
    /// Resolves immediately if the coordinator is already ready.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Aborted`] if the coordinator stops before readiness.
    pub async fn wait(&self) -> Result<()> {
        let mut rx = self.rx.clone();
        rx.wait_for(|ready| *ready)
            .await
            .map(|_| ())
            .map_err(|_| Error::Aborted)
    }
}

/// Create a linked completion signal and handle.
pub fn ready_channel() -> (ReadySignal, ReadyHandle) {
    let (tx, rx) = watch::channel(false);
    (ReadySignal { tx }, ReadyHandle { rx })
}

/// Receives a fresh snapshot on every ready evaluation.
pub trait UpdateHandler: Send + 'static {
    fn on_update(&mut self, snapshot: ArtifactSnapshot);
}

impl<F> UpdateHandler for F
where
    F: FnMut(ArtifactSnapshot) + Send + 'static,
{
    fn on_update(&mut self, snapshot: ArtifactSnapshot) {
        (*self)(snapshot)
    }
}

/// Drive the coordinator until every source has finished.
///
/// Slot updates are applied in arrival order. The first source that fails
/// aborts the remaining sources and its error is returned; dropping the
/// [`ReadySignal`] at that point wakes pending [`ReadyHandle::wait`] calls
/// with [`Error::Aborted`].
///
/// # Errors
///
/// Returns the first fatal error raised by a source, or
/// [`Error::TaskFailed`] if a source task panicked.
pub async fn run_coordinator<H: UpdateHandler>(
    mut coordinator: Coordinator,
    mut updates: mpsc::Receiver<SlotUpdate>,
    signal: ReadySignal,
    mut handler: H,
    mut sources: JoinSet<Result<()>>,
) -> Result<()> {
    loop {
        tokio::select! {
            biased;

            update = updates.recv() => {
                let Some(update) = update else {
                    break;
                };
                let dispatch = coordinator.apply(update);
                if dispatch.became_ready && signal.fire() {
                    tracing::info!("All build artifacts available, dev server ready");
                }
                if let Some(snapshot) = dispatch.snapshot {
                    handler.on_update(snapshot);
                }
            }

            Some(joined) = sources.join_next() => {
                if let Err(err) = source_outcome(joined) {
                    sources.abort_all();
                    return Err(err);
                }
            }
        }
    }

    // Every writer is gone; surface anything the sources returned after
    // releasing their writer.
    while let Some(joined) = sources.join_next().await {
        source_outcome(joined)?;
    }

    tracing::debug!(
        dispatches = coordinator.dispatch_count(),
        "Coordinator stopped"
    );
    Ok(())
}

fn source_outcome(joined: std::result::Result<Result<()>, tokio::task::JoinError>) -> Result<()> {
    match joined {
        Ok(outcome) => outcome,
        Err(err) => Err(Error::TaskFailed(err.to_string())),
    }
}
