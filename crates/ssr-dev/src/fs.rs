//! Output file systems and the artifact reader.
//!
//! Build pipelines write their output either to disk or into a
//! [`MemoryFileSystem`]. Both implement [`OutputFileSystem`], so an
//! [`ArtifactReader`] reads named artifacts the same way regardless of where
//! they live.

use async_trait::async_trait;
use parking_lot::RwLock;
use path_clean::PathClean;
use rustc_hash::FxHashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File system a build pipeline writes its output to.
#[async_trait]
pub trait OutputFileSystem: Send + Sync + std::fmt::Debug {
    /// Read a file as raw bytes
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Read a file as UTF-8 text
    async fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write (or overwrite) a file
    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Check if a file exists
    fn exists(&self, path: &Path) -> bool;
}

/// Real file system backed by `tokio::fs`.
#[derive(Debug, Clone, Default)]
pub struct DiskFileSystem;

#[async_trait]
impl OutputFileSystem for DiskFileSystem {
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, contents).await
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// In-memory file system used as a compiler output target.
///
/// Paths are cleaned before storage so `dist/./a.json` and `dist/a.json`
/// name the same file.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: RwLock<FxHashMap<PathBuf, Vec<u8>>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file synchronously.
    pub fn insert(&self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) {
        self.files
            .write()
            .insert(path.as_ref().clean(), contents.into());
    }

    /// Read a file synchronously.
    pub fn read_sync(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files
            .read()
            .get(&path.clean())
            .cloned()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} not found in memory fs", path.display()),
                )
            })
    }

    pub fn remove(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.write().remove(&path.clean())
    }

    /// Paths of every stored file, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<_> = self.files.read().keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }
}

#[async_trait]
impl OutputFileSystem for MemoryFileSystem {
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.read_sync(path)
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let bytes = self.read_sync(path)?;
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        self.insert(path, contents);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.read().contains_key(&path.clean())
    }
}

/// Reads named artifacts from a pipeline's output directory.
///
/// Every failure (missing file, I/O error, invalid UTF-8, invalid JSON) maps
/// to `None`: callers treat it as "not ready yet".
#[derive(Debug, Clone)]
pub struct ArtifactReader {
    fs: Arc<dyn OutputFileSystem>,
    base_dir: PathBuf,
}

impl ArtifactReader {
    pub fn new(fs: Arc<dyn OutputFileSystem>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve `name` against the output directory.
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.base_dir.join(name).clean()
    }

    /// Read an artifact as text.
    pub async fn read(&self, name: &str) -> Option<String> {
        let path = self.path_of(name);
        match self.fs.read_to_string(&path).await {
            Ok(content) => Some(content),
            Err(e) => {
                tracing::debug!("Artifact {} not readable: {}", path.display(), e);
                None
            }
        }
    }

    /// Read an artifact and parse it as JSON.
    pub async fn read_json(&self, name: &str) -> Option<serde_json::Value> {
        let content = self.read(name).await?;
        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Artifact {} is not valid JSON: {}", name, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_memory_fs_roundtrip_normalizes_paths() {
        let fs = MemoryFileSystem::new();
        fs.write(Path::new("dist/./manifest.json"), b"{}")
            .await
            .unwrap();

        assert!(fs.exists(Path::new("dist/manifest.json")));
        assert_eq!(
            fs.read_to_string(Path::new("dist/sub/../manifest.json"))
                .await
                .unwrap(),
            "{}"
        );
        assert_eq!(fs.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_fs_missing_file_is_not_found() {
        let fs = MemoryFileSystem::new();
        let err = fs.read_to_string(Path::new("nope.json")).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_reader_reads_from_memory() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.insert("/app/dist/vue-ssr-server-bundle.json", r#"{"entry":"main.js"}"#);

        let reader = ArtifactReader::new(fs, "/app/dist");
        assert_eq!(
            reader.read_json("vue-ssr-server-bundle.json").await,
            Some(json!({"entry": "main.js"}))
        );
    }

    #[tokio::test]
    async fn test_reader_reads_from_disk() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("manifest.json"), r#"{"all":["app.js"]}"#).unwrap();

        let reader = ArtifactReader::new(Arc::new(DiskFileSystem), temp.path());
        assert_eq!(
            reader.read_json("manifest.json").await,
            Some(json!({"all": ["app.js"]}))
        );
        assert!(reader.read("missing.json").await.is_none());
    }

    #[tokio::test]
    async fn test_reader_maps_failures_to_absent() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.insert("dist/broken.json", "{ not json");
        fs.insert("dist/binary.json", vec![0xff, 0xfe]);

        let reader = ArtifactReader::new(fs, "dist");
        assert!(reader.read_json("missing.json").await.is_none());
        assert!(reader.read_json("broken.json").await.is_none());
        assert!(reader.read("binary.json").await.is_none());
        assert_eq!(reader.read("broken.json").await.as_deref(), Some("{ not json"));
    }

    #[tokio::test]
    async fn test_disk_fs_write_creates_parents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/dir/file.txt");

        DiskFileSystem.write(&path, b"hello").await.unwrap();
        assert!(DiskFileSystem.exists(&path));
        assert_eq!(DiskFileSystem.read_to_string(&path).await.unwrap(), "hello");
    }
}
