//! Page template source.

use crate::error::{Error, Result};
use crate::store::SlotWriter;
use crate::watcher::{FileChange, FileWatcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Read the template as text. Any failure is fatal to the caller.
pub async fn read_template(path: &Path) -> Result<Arc<str>> {
    tokio::fs::read_to_string(path)
        .await
        .map(Arc::from)
        .map_err(|source| Error::TemplateRead {
            path: path.to_path_buf(),
            source,
        })
}

/// Re-reads the template whenever it changes on disk.
#[derive(Debug)]
pub struct TemplateSource {
    path: PathBuf,
    changes: mpsc::Receiver<FileChange>,
    writer: SlotWriter<Arc<str>>,
    _watcher: Option<FileWatcher>,
}

impl TemplateSource {
    /// Watch `path` with a debounced file watcher.
    ///
    /// # Errors
    ///
    /// Returns an error if the watch cannot be established.
    pub fn watch(path: PathBuf, debounce_ms: u64, writer: SlotWriter<Arc<str>>) -> Result<Self> {
        let (watcher, changes) = FileWatcher::file(&path, debounce_ms)?;
        Ok(Self {
            path,
            changes,
            writer,
            _watcher: Some(watcher),
        })
    }

    /// Use an existing stream of change notifications for `path`.
    pub fn from_changes(
        path: PathBuf,
        changes: mpsc::Receiver<FileChange>,
        writer: SlotWriter<Arc<str>>,
    ) -> Self {
        Self {
            path,
            changes,
            writer,
            _watcher: None,
        }
    }

    /// Run until the change stream or the coordinator closes.
    ///
    /// # Errors
    ///
    /// A template that cannot be re-read after a change is fatal.
    pub async fn run(mut self) -> Result<()> {
        while let Some(change) = self.changes.recv().await {
            if let FileChange::Removed(path) = &change {
                tracing::debug!("Ignoring removal of {}", path.display());
                continue;
            }

            let template = read_template(&self.path).await?;
            tracing::info!("{} template updated.", self.path.display());

            if !self.writer.write(template).await {
                break;
            }
        }
        Ok(())
    }
}
