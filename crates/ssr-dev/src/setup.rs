//! Dev server setup: wires compilers, watch sources and the coordinator.

use crate::compiler::Compiler;
use crate::coordinator::{ready_channel, run_coordinator, Coordinator, ReadyHandle, UpdateHandler};
use crate::error::{Error, Result};
use crate::fs::{ArtifactReader, OutputFileSystem};
use crate::hot::{hot_channel, HotEvent};
use crate::sources::{read_template, BundleSource, ClientSource, TemplateSource};
use crate::store::SlotWriters;
use crate::watcher::FileChange;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::{JoinHandle, JoinSet};

/// Buffer between the sources and the coordinator.
const UPDATE_CHANNEL_CAPACITY: usize = 32;

/// Default debounce for template change notifications.
pub const DEFAULT_TEMPLATE_DEBOUNCE_MS: u64 = 100;

/// File names of the three artifacts inside the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArtifactNames {
    pub client_manifest: String,
    pub server_bundle: String,
    pub error_bundle: String,
}

impl Default for ArtifactNames {
    fn default() -> Self {
        Self {
            client_manifest: "vue-ssr-client-manifest.json".to_string(),
            server_bundle: "vue-ssr-server-bundle.json".to_string(),
            error_bundle: "vue-ssr-error-bundle.json".to_string(),
        }
    }
}

/// How template changes are observed.
#[derive(Debug)]
pub enum TemplateWatch {
    /// Debounced `notify` watcher on the template file
    Notify { debounce_ms: u64 },
    /// Externally driven change notifications
    Channel(mpsc::Receiver<FileChange>),
}

impl Default for TemplateWatch {
    fn default() -> Self {
        TemplateWatch::Notify {
            debounce_ms: DEFAULT_TEMPLATE_DEBOUNCE_MS,
        }
    }
}

/// Everything [`setup_dev_server`] needs.
#[derive(Debug)]
pub struct DevServerOptions {
    /// HTML page template
    pub template_path: PathBuf,
    /// Client pipeline, already configured for hot reload
    pub client: Arc<dyn Compiler>,
    /// Server render bundle pipeline
    pub server: Arc<dyn Compiler>,
    /// Error page bundle pipeline
    pub error: Arc<dyn Compiler>,
    /// Artifact file names
    pub artifacts: ArtifactNames,
    /// Directory, inside each compiler's output fs, holding the artifacts
    pub output_dir: PathBuf,
    pub template_watch: TemplateWatch,
}

impl DevServerOptions {
    pub fn new(
        template_path: impl Into<PathBuf>,
        client: Arc<dyn Compiler>,
        server: Arc<dyn Compiler>,
        error: Arc<dyn Compiler>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            template_path: template_path.into(),
            client,
            server,
            error,
            artifacts: ArtifactNames::default(),
            output_dir: output_dir.into(),
            template_watch: TemplateWatch::default(),
        }
    }

    pub fn with_artifacts(mut self, artifacts: ArtifactNames) -> Self {
        self.artifacts = artifacts;
        self
    }

    pub fn with_template_watch(mut self, template_watch: TemplateWatch) -> Self {
        self.template_watch = template_watch;
        self
    }
}

/// Handle to a running dev server coordinator.
#[derive(Debug)]
pub struct DevServer {
    ready: ReadyHandle,
    task: JoinHandle<Result<()>>,
    hot_events: broadcast::Sender<HotEvent>,
    client_fs: Arc<dyn OutputFileSystem>,
}

impl DevServer {
    /// Completion signal: resolves once every build artifact is available.
    pub fn ready(&self) -> ReadyHandle {
        self.ready.clone()
    }

    /// Subscribe to client build events for the hot-update endpoint.
    pub fn hot_events(&self) -> broadcast::Receiver<HotEvent> {
        self.hot_events.subscribe()
    }

    /// The hot event channel itself, for hosts that subscribe per connection.
    pub fn hot_sender(&self) -> broadcast::Sender<HotEvent> {
        self.hot_events.clone()
    }

    /// File system the client pipeline writes its assets to.
    pub fn client_fs(&self) -> Arc<dyn OutputFileSystem> {
        Arc::clone(&self.client_fs)
    }

    /// Wait for the coordinator to stop.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error raised after startup.
    pub async fn join(self) -> Result<()> {
        self.task
            .await
            .map_err(|err| Error::TaskFailed(err.to_string()))?
    }
}

/// Start watching the template and all three pipelines.
///
/// `on_update` receives a fresh [`ArtifactSnapshot`](crate::ArtifactSnapshot)
/// every time a write leaves the client manifest, server bundle and error
/// bundle all present.
///
/// # Errors
///
/// Fails if the template cannot be read, a compiler cannot start watching,
/// or the template watcher cannot be established.
pub async fn setup_dev_server<H: UpdateHandler>(
    options: DevServerOptions,
    on_update: H,
) -> Result<DevServer> {
    let DevServerOptions {
        template_path,
        client,
        server,
        error,
        artifacts,
        output_dir,
        template_watch,
    } = options;

    let template = read_template(&template_path).await?;
    tracing::debug!("Read template {}", template_path.display());

    let client_cycles = client.watch().await?;
    let server_cycles = server.watch().await?;
    let error_cycles = error.watch().await?;
    tracing::info!(
        "Watching {}, {} and {} pipelines",
        client.name(),
        server.name(),
        error.name()
    );

    let (update_tx, update_rx) = mpsc::channel(UPDATE_CHANNEL_CAPACITY);
    let writers = SlotWriters::new(update_tx);

    let template_source = match template_watch {
        TemplateWatch::Notify { debounce_ms } => {
            TemplateSource::watch(template_path, debounce_ms, writers.template)?
        }
        TemplateWatch::Channel(changes) => {
            TemplateSource::from_changes(template_path, changes, writers.template)
        }
    };

    let hot_events = hot_channel();
    let client_fs = client.output_fs();

    let client_source = ClientSource::new(
        client.name(),
        client_cycles,
        ArtifactReader::new(Arc::clone(&client_fs), output_dir.clone()),
        artifacts.client_manifest,
        writers.client_manifest,
    )
    .with_hot_events(hot_events.clone());

    let server_source = BundleSource::new(
        server.name(),
        server_cycles,
        ArtifactReader::new(server.output_fs(), output_dir.clone()),
        artifacts.server_bundle,
        writers.server_bundle,
    );

    let error_source = BundleSource::new(
        error.name(),
        error_cycles,
        ArtifactReader::new(error.output_fs(), output_dir),
        artifacts.error_bundle,
        writers.error_bundle,
    );

    let mut sources = JoinSet::new();
    sources.spawn(template_source.run());
    sources.spawn(client_source.run());
    sources.spawn(server_source.run());
    sources.spawn(error_source.run());

    let (signal, ready) = ready_channel();
    let task = tokio::spawn(run_coordinator(
        Coordinator::new(template),
        update_rx,
        signal,
        on_update,
        sources,
    ));

    Ok(DevServer {
        ready,
        task,
        hot_events,
        client_fs,
    })
}
