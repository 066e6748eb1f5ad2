//! Artifact store holding the latest value of each slot.
//!
//! The store is owned by the [`Coordinator`](crate::coordinator::Coordinator).
//! Watch sources never touch it directly: each one holds a [`SlotWriter`]
//! that can only produce updates for its own slot.

use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Parsed JSON document produced by a build pipeline.
///
/// Shared behind an `Arc` so snapshots are cheap to hand out.
pub type Document = Arc<serde_json::Value>;

/// One named unit of coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// HTML page template, read from disk
    Template,
    /// Client asset manifest from the client pipeline
    ClientManifest,
    /// Server render bundle
    ServerBundle,
    /// Error page render bundle
    ErrorBundle,
}

impl Slot {
    /// All slots, in startup order.
    pub const ALL: [Slot; 4] = [
        Slot::Template,
        Slot::ClientManifest,
        Slot::ServerBundle,
        Slot::ErrorBundle,
    ];

    /// Name used in logs and in the host-facing snapshot.
    pub const fn name(self) -> &'static str {
        match self {
            Slot::Template => "template",
            Slot::ClientManifest => "clientManifest",
            Slot::ServerBundle => "serverBundle",
            Slot::ErrorBundle => "errorBundle",
        }
    }

    /// Whether this slot must be present before the coordinator is ready.
    ///
    /// The template is read eagerly at setup, so it never gates readiness.
    pub const fn gates_readiness(self) -> bool {
        !matches!(self, Slot::Template)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A new value for exactly one slot.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotUpdate {
    Template(Arc<str>),
    ClientManifest(Document),
    ServerBundle(Document),
    ErrorBundle(Document),
}

impl SlotUpdate {
    /// Slot targeted by this update.
    pub fn slot(&self) -> Slot {
        match self {
            SlotUpdate::Template(_) => Slot::Template,
            SlotUpdate::ClientManifest(_) => Slot::ClientManifest,
            SlotUpdate::ServerBundle(_) => Slot::ServerBundle,
            SlotUpdate::ErrorBundle(_) => Slot::ErrorBundle,
        }
    }
}

/// Server and error bundles, grouped for the renderer factory.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderBundles {
    pub server_bundle: Document,
    pub error_bundle: Document,
}

/// Template and client manifest, grouped as renderer options.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderContext {
    pub template: Arc<str>,
    pub client_manifest: Document,
}

/// Immutable view of all four slots handed to the update callback.
///
/// A fresh snapshot is built for every dispatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactSnapshot {
    pub bundles: RenderBundles,
    pub context: RenderContext,
}

/// Latest known value of each slot.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    template: Arc<str>,
    client_manifest: Option<Document>,
    server_bundle: Option<Document>,
    error_bundle: Option<Document>,
}

impl ArtifactStore {
    /// Create a store with the eagerly-read template and every other slot absent.
    pub fn new(template: impl Into<Arc<str>>) -> Self {
        Self {
            template: template.into(),
            client_manifest: None,
            server_bundle: None,
            error_bundle: None,
        }
    }

    /// Replace the value of the slot named by `update`.
    pub fn apply(&mut self, update: SlotUpdate) {
        match update {
            SlotUpdate::Template(value) => self.template = value,
            SlotUpdate::ClientManifest(value) => self.client_manifest = Some(value),
            SlotUpdate::ServerBundle(value) => self.server_bundle = Some(value),
            SlotUpdate::ErrorBundle(value) => self.error_bundle = Some(value),
        }
    }

    pub fn template(&self) -> &Arc<str> {
        &self.template
    }

    /// Current document for a pipeline slot. Always `None` for the template.
    pub fn document(&self, slot: Slot) -> Option<&Document> {
        match slot {
            Slot::Template => None,
            Slot::ClientManifest => self.client_manifest.as_ref(),
            Slot::ServerBundle => self.server_bundle.as_ref(),
            Slot::ErrorBundle => self.error_bundle.as_ref(),
        }
    }

    pub fn is_present(&self, slot: Slot) -> bool {
        match slot {
            Slot::Template => true,
            other => self.document(other).is_some(),
        }
    }

    /// Readiness predicate: every readiness-gating slot is present.
    pub fn is_fully_populated(&self) -> bool {
        Slot::ALL
            .iter()
            .filter(|slot| slot.gates_readiness())
            .all(|slot| self.is_present(*slot))
    }

    /// Build a snapshot, or `None` while any gating slot is absent.
    pub fn snapshot(&self) -> Option<ArtifactSnapshot> {
        let (Some(server_bundle), Some(error_bundle), Some(client_manifest)) = (
            self.server_bundle.as_ref(),
            self.error_bundle.as_ref(),
            self.client_manifest.as_ref(),
        ) else {
            return None;
        };

        Some(ArtifactSnapshot {
            bundles: RenderBundles {
                server_bundle: Arc::clone(server_bundle),
                error_bundle: Arc::clone(error_bundle),
            },
            context: RenderContext {
                template: Arc::clone(&self.template),
                client_manifest: Arc::clone(client_manifest),
            },
        })
    }
}

/// Capability to write exactly one slot.
///
/// Writes are funneled through a channel into the coordinator task, which
/// serializes them.
#[derive(Debug)]
pub struct SlotWriter<V> {
    slot: Slot,
    wrap: fn(V) -> SlotUpdate,
    tx: mpsc::Sender<SlotUpdate>,
    _value: PhantomData<fn(V)>,
}

impl<V> SlotWriter<V> {
    fn new(slot: Slot, wrap: fn(V) -> SlotUpdate, tx: mpsc::Sender<SlotUpdate>) -> Self {
        Self {
            slot,
            wrap,
            tx,
            _value: PhantomData,
        }
    }

    pub fn slot(&self) -> Slot {
        self.slot
    }

    /// Send a new value for this slot.
    ///
    /// Returns `false` once the coordinator has stopped listening.
    pub async fn write(&self, value: V) -> bool {
        self.tx.send((self.wrap)(value)).await.is_ok()
    }
}

/// One writer per slot, all feeding the same coordinator channel.
#[derive(Debug)]
pub struct SlotWriters {
    pub template: SlotWriter<Arc<str>>,
    pub client_manifest: SlotWriter<Document>,
    pub server_bundle: SlotWriter<Document>,
    pub error_bundle: SlotWriter<Document>,
}

impl SlotWriters {
    pub fn new(tx: mpsc::Sender<SlotUpdate>) -> Self {
        Self {
            template: SlotWriter::new(Slot::Template, SlotUpdate::Template, tx.clone()),
            client_manifest: SlotWriter::new(
                Slot::ClientManifest,
                SlotUpdate::ClientManifest,
                tx.clone(),
            ),
            server_bundle: SlotWriter::new(Slot::ServerBundle, SlotUpdate::ServerBundle, tx.clone()),
            error_bundle: SlotWriter::new(Slot::ErrorBundle, SlotUpdate::ErrorBundle, tx),
        }
    }
}
