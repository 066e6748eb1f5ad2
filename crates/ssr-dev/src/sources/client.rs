//! Client build pipeline source.

use super::log_diagnostics;
use crate::compiler::CycleStream;
use crate::error::Result;
use crate::fs::ArtifactReader;
use crate::hot::HotEvent;
use crate::store::{Document, SlotWriter};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Reads the client manifest after every successful client build.
#[derive(Debug)]
pub struct ClientSource {
    pipeline: String,
    cycles: CycleStream,
    reader: ArtifactReader,
    manifest_name: String,
    writer: SlotWriter<Document>,
    hot_events: Option<broadcast::Sender<HotEvent>>,
}

impl ClientSource {
    pub fn new(
        pipeline: impl Into<String>,
        cycles: CycleStream,
        reader: ArtifactReader,
        manifest_name: impl Into<String>,
        writer: SlotWriter<Document>,
    ) -> Self {
        Self {
            pipeline: pipeline.into(),
            cycles,
            reader,
            manifest_name: manifest_name.into(),
            writer,
            hot_events: None,
        }
    }

    /// Publish a [`HotEvent`] for every cycle, failed ones included.
    pub fn with_hot_events(mut self, events: broadcast::Sender<HotEvent>) -> Self {
        self.hot_events = Some(events);
        self
    }

    /// Run until the compiler stops watching or the coordinator closes.
    ///
    /// # Errors
    ///
    /// A tooling failure reported by the compiler is fatal.
    pub async fn run(mut self) -> Result<()> {
        while let Some(cycle) = self.cycles.recv().await {
            let stats = cycle?;
            log_diagnostics(&self.pipeline, &stats);

            if let Some(events) = &self.hot_events {
                // No subscribers yet is fine
                let _ = events.send(HotEvent::built(&self.pipeline, &stats));
            }

            if stats.has_errors() {
                continue;
            }

            let Some(manifest) = self.reader.read_json(&self.manifest_name).await else {
                tracing::warn!(
                    pipeline = %self.pipeline,
                    "Client manifest {} not available after build",
                    self.manifest_name
                );
                continue;
            };

            tracing::debug!(pipeline = %self.pipeline, "Client manifest updated in {}ms", stats.duration_ms);
            if !self.writer.write(Arc::new(manifest)).await {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::CompileStats;
    use crate::error::{CompilerError, Error};
    use crate::fs::MemoryFileSystem;
    use crate::store::{Slot, SlotUpdate, SlotWriters};
    use serde_json::json;
    use tokio::sync::mpsc;

    fn setup() -> (
        ClientSource,
        mpsc::Sender<crate::compiler::CycleResult>,
        Arc<MemoryFileSystem>,
        mpsc::Receiver<SlotUpdate>,
    ) {
        let fs = Arc::new(MemoryFileSystem::new());
        let (cycle_tx, cycles) = mpsc::channel(8);
        let (update_tx, updates) = mpsc::channel(8);
        let writers = SlotWriters::new(update_tx);
        let source = ClientSource::new(
            "client",
            cycles,
            ArtifactReader::new(fs.clone(), "dist"),
            "vue-ssr-client-manifest.json",
            writers.client_manifest,
        );
        (source, cycle_tx, fs, updates)
    }

    #[tokio::test]
    async fn test_successful_cycle_emits_manifest() {
        let (source, cycle_tx, fs, mut updates) = setup();
        fs.insert("dist/vue-ssr-client-manifest.json", r#"{"all":["app.js"]}"#);
        cycle_tx.send(Ok(CompileStats::clean(10))).await.unwrap();
        drop(cycle_tx);

        source.run().await.unwrap();

        let update = updates.recv().await.unwrap();
        assert_eq!(update.slot(), Slot::ClientManifest);
        assert_eq!(
            update,
            SlotUpdate::ClientManifest(Arc::new(json!({"all": ["app.js"]})))
        );
    }

    #[tokio::test]
    async fn test_cycle_with_errors_is_discarded() {
        let (source, cycle_tx, fs, mut updates) = setup();
        fs.insert("dist/vue-ssr-client-manifest.json", r#"{"all":[]}"#);
        cycle_tx
            .send(Ok(CompileStats::failed(vec!["Syntax error".into()])))
            .await
            .unwrap();
        drop(cycle_tx);

        source.run().await.unwrap();
        assert!(updates.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_malformed_manifest_leaves_slot_unchanged() {
        let (source, cycle_tx, fs, mut updates) = setup();
        fs.insert("dist/vue-ssr-client-manifest.json", "{ truncated");
        cycle_tx.send(Ok(CompileStats::clean(3))).await.unwrap();
        drop(cycle_tx);

        source.run().await.unwrap();
        assert!(updates.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_hot_events_cover_failed_cycles() {
        let (source, cycle_tx, _fs, _updates) = setup();
        let events = crate::hot::hot_channel();
        let mut subscriber = events.subscribe();
        let source = source.with_hot_events(events);

        cycle_tx
            .send(Ok(CompileStats::failed(vec!["Syntax error".into()])))
            .await
            .unwrap();
        drop(cycle_tx);
        source.run().await.unwrap();

        match subscriber.recv().await.unwrap() {
            HotEvent::Built { name, errors, .. } => {
                assert_eq!(name, "client");
                assert_eq!(errors, vec!["Syntax error".to_string()]);
            }
        }
    }

    #[tokio::test]
    async fn test_tooling_failure_is_fatal() {
        let (source, cycle_tx, _fs, _updates) = setup();
        cycle_tx
            .send(Err(CompilerError::Other("watcher crashed".into())))
            .await
            .unwrap();

        let err = source.run().await.unwrap_err();
        assert!(matches!(err, Error::Compiler(_)));
    }
}
