//! Server and error bundle sources.

use super::log_diagnostics;
use crate::compiler::CycleStream;
use crate::error::Result;
use crate::fs::ArtifactReader;
use crate::store::{Document, SlotWriter};
use std::sync::Arc;

/// Reads a render bundle after every successful build of its pipeline.
///
/// Used for both the server render bundle and the error page bundle; the
/// writer decides which slot it feeds.
#[derive(Debug)]
pub struct BundleSource {
    pipeline: String,
    cycles: CycleStream,
    reader: ArtifactReader,
    bundle_name: String,
    writer: SlotWriter<Document>,
}

impl BundleSource {
    pub fn new(
        pipeline: impl Into<String>,
        cycles: CycleStream,
        reader: ArtifactReader,
        bundle_name: impl Into<String>,
        writer: SlotWriter<Document>,
    ) -> Self {
        Self {
            pipeline: pipeline.into(),
            cycles,
            reader,
            bundle_name: bundle_name.into(),
            writer,
        }
    }

    /// Run until the compiler stops watching or the coordinator closes.
    ///
    /// # Errors
    ///
    /// A watch failure reported by the compiler is fatal.
    pub async fn run(mut self) -> Result<()> {
        while let Some(cycle) = self.cycles.recv().await {
            let stats = cycle?;
            log_diagnostics(&self.pipeline, &stats);

            if stats.has_errors() {
                continue;
            }

            let Some(bundle) = self.reader.read_json(&self.bundle_name).await else {
                tracing::warn!(
                    pipeline = %self.pipeline,
                    "Bundle {} not available after build",
                    self.bundle_name
                );
                continue;
            };

            tracing::debug!(
                pipeline = %self.pipeline,
                slot = %self.writer.slot(),
                "Bundle updated in {}ms",
                stats.duration_ms
            );
            if !self.writer.write(Arc::new(bundle)).await {
                break;
            }
        }
        Ok(())
    }
}
