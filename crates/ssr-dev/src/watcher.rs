//! File system watcher with debouncing.
//!
//! Raw notify events are coalesced per path and released once the tree has
//! been quiet for the debounce window, so the last change of a burst is
//! always delivered.
//!
//! Two flavours are used by the dev server:
//! - [`FileWatcher::file`] follows a single file (the page template). It
//!   watches the parent directory so editors that save by replacing the file
//!   are still noticed.
//! - [`FileWatcher::tree`] follows source trees for a build command,
//!   ignoring node_modules, build output and hidden files.

use crate::error::WatchError;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self as std_mpsc, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// File change event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    /// File was modified
    Modified(PathBuf),
    /// File was created
    Created(PathBuf),
    /// File was removed
    Removed(PathBuf),
}

impl FileChange {
    /// Get the path affected by this change.
    pub fn path(&self) -> &Path {
        match self {
            FileChange::Modified(p) | FileChange::Created(p) | FileChange::Removed(p) => p,
        }
    }
}

type PathFilter = Box<dyn Fn(&Path) -> bool + Send + 'static>;

/// Debounced file watcher sending [`FileChange`]s through a channel.
///
/// Dropping the watcher stops notifications and closes the channel.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    roots: Vec<PathBuf>,
}

impl std::fmt::Debug for FileWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWatcher")
            .field("roots", &self.roots)
            .finish_non_exhaustive()
    }
}

impl FileWatcher {
    /// Watch a single file for changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the file's directory doesn't exist or the watcher
    /// cannot be created.
    pub fn file(
        path: &Path,
        debounce_ms: u64,
    ) -> Result<(Self, mpsc::Receiver<FileChange>), WatchError> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let file_name = path
            .file_name()
            .ok_or_else(|| WatchError::MissingPath(path.to_path_buf()))?;

        let dir = resolve(parent)?;
        let target = dir.join(file_name);

        Self::spawn(
            vec![dir],
            RecursiveMode::NonRecursive,
            debounce_ms,
            Box::new(move |changed: &Path| changed == target.as_path()),
        )
    }

    /// Watch one or more directory trees recursively.
    ///
    /// # Arguments
    ///
    /// * `roots` - Directories to watch
    /// * `ignore_patterns` - Patterns to ignore (`node_modules`, `*.log`, ...)
    /// * `debounce_ms` - Debounce delay in milliseconds
    ///
    /// # Errors
    ///
    /// Returns an error if a root doesn't exist or the watcher cannot be created.
    pub fn tree(
        roots: &[PathBuf],
        ignore_patterns: Vec<String>,
        debounce_ms: u64,
    ) -> Result<(Self, mpsc::Receiver<FileChange>), WatchError> {
        let roots = roots
            .iter()
            .map(|root| resolve(root))
            .collect::<Result<Vec<_>, _>>()?;

        let filter_roots = roots.clone();
        Self::spawn(
            roots,
            RecursiveMode::Recursive,
            debounce_ms,
            Box::new(move |changed: &Path| {
                filter_roots
                    .iter()
                    .any(|root| !Self::should_ignore(changed, root, &ignore_patterns))
            }),
        )
    }

    fn spawn(
        roots: Vec<PathBuf>,
        mode: RecursiveMode,
        debounce_ms: u64,
        accept: PathFilter,
    ) -> Result<(Self, mpsc::Receiver<FileChange>), WatchError> {
        let (tx, rx) = mpsc::channel(100);
        let (raw_tx, raw_rx) = std_mpsc::channel::<FileChange>();

        let window = Duration::from_millis(debounce_ms);
        thread::Builder::new()
            .name("ssr-dev-watch".to_string())
            .spawn(move || debounce(raw_rx, tx, window))
            .map_err(WatchError::Thread)?;

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let Ok(event) = res else {
                return;
            };

            for path in &event.paths {
                if !accept(path) {
                    continue;
                }

                let change = match event.kind {
                    notify::EventKind::Create(_) => FileChange::Created(path.clone()),
                    notify::EventKind::Modify(_) => FileChange::Modified(path.clone()),
                    notify::EventKind::Remove(_) => FileChange::Removed(path.clone()),
                    _ => continue,
                };

                // Debounce thread gone means the owning source stopped
                let _ = raw_tx.send(change);
            }
        })?;

        for root in &roots {
            watcher.watch(root, mode)?;
        }

        Ok((
            Self {
                _watcher: watcher,
                roots,
            },
            rx,
        ))
    }

    /// Check if a path under `root` should be ignored.
    fn should_ignore(path: &Path, root: &Path, ignore_patterns: &[String]) -> bool {
        let rel_path = match path.strip_prefix(root) {
            Ok(p) => p,
            Err(_) => return true,
        };

        let path_str = rel_path.to_string_lossy();

        for pattern in ignore_patterns {
            if let Some(ext) = pattern.strip_prefix('*') {
                if path_str.ends_with(ext) {
                    return true;
                }
            } else if matches_components(rel_path, Path::new(pattern)) {
                return true;
            }
        }

        // Ignore hidden files and directories
        rel_path.components().any(|component| {
            component
                .as_os_str()
                .to_str()
                .is_some_and(|name| name.starts_with('.') && name != "." && name != "..")
        })
    }

    /// Directories being watched (absolute).
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

/// Trailing-edge debounce.
///
/// Changes are held until no new change has arrived for `window`, then the
/// latest change per path is forwarded in arrival order. Returns once the
/// notify watcher or the receiver is dropped.
fn debounce(
    raw: std_mpsc::Receiver<FileChange>,
    tx: mpsc::Sender<FileChange>,
    window: Duration,
) {
    let mut pending: Vec<FileChange> = Vec::new();
    let mut deadline: Option<Instant> = None;

    loop {
        let next = match deadline {
            Some(at) => raw.recv_timeout(at.saturating_duration_since(Instant::now())),
            None => raw.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match next {
            Ok(change) => {
                pending.retain(|queued| queued.path() != change.path());
                pending.push(change);
                deadline = Some(Instant::now() + window);
            }
            Err(RecvTimeoutError::Timeout) => {
                deadline = None;
                for change in pending.drain(..) {
                    if tx.blocking_send(change).is_err() {
                        return;
                    }
                }
            }
            Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}

/// Whether `pattern` occurs in `path` as a run of whole components.
///
/// `dist` matches `dist/app.js` and `pkg/dist/app.js`, never
/// `distribution/app.js` or `dist-utils.js`.
fn matches_components(path: &Path, pattern: &Path) -> bool {
    let wanted: Vec<_> = pattern.components().collect();
    if wanted.is_empty() {
        return false;
    }
    let parts: Vec<_> = path.components().collect();
    parts.windows(wanted.len()).any(|window| window == wanted.as_slice())
}

/// Resolve a path to its canonical absolute form so it matches notify's events.
fn resolve(path: &Path) -> Result<PathBuf, WatchError> {
    if !path.exists() {
        return Err(WatchError::MissingPath(path.to_path_buf()));
    }
    path.canonicalize().map_err(|source| WatchError::Resolve {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_should_ignore_node_modules() {
        let root = PathBuf::from("/project");
        let patterns = vec!["node_modules".to_string()];

        let path = PathBuf::from("/project/node_modules/vue/index.js");
        assert!(FileWatcher::should_ignore(&path, &root, &patterns));

        let path = PathBuf::from("/project/src/app.js");
        assert!(!FileWatcher::should_ignore(&path, &root, &patterns));
    }

    #[test]
    fn test_should_ignore_extension_and_hidden() {
        let root = PathBuf::from("/project");
        let patterns = vec!["*.log".to_string()];

        assert!(FileWatcher::should_ignore(
            Path::new("/project/npm-debug.log"),
            &root,
            &patterns
        ));
        assert!(FileWatcher::should_ignore(
            Path::new("/project/.git/HEAD"),
            &root,
            &patterns
        ));
        assert!(FileWatcher::should_ignore(
            Path::new("/elsewhere/src/app.js"),
            &root,
            &patterns
        ));
    }

    #[test]
    fn test_ignore_matches_whole_components() {
        let root = PathBuf::from("/project");
        let patterns = vec!["dist".to_string(), "build/cache".to_string()];

        let ignored = |p: &str| FileWatcher::should_ignore(Path::new(p), &root, &patterns);

        assert!(ignored("/project/dist/app.js"));
        assert!(ignored("/project/packages/web/dist/app.js"));
        assert!(ignored("/project/build/cache/chunk.js"));
        assert!(!ignored("/project/distribution/app.js"));
        assert!(!ignored("/project/dist-utils.js"));
        assert!(!ignored("/project/src/dist.js"));
        assert!(!ignored("/project/build/app.js"));
    }

    #[test]
    fn test_debounce_delivers_last_change_of_burst() {
        let (raw_tx, raw_rx) = std_mpsc::channel();
        let (tx, mut rx) = mpsc::channel(16);
        let window = Duration::from_millis(100);
        let worker = thread::spawn(move || debounce(raw_rx, tx, window));

        let template = PathBuf::from("/project/index.template.html");
        let other = PathBuf::from("/project/src/app.js");

        raw_tx.send(FileChange::Modified(template.clone())).unwrap();
        thread::sleep(Duration::from_millis(40));
        raw_tx.send(FileChange::Created(other.clone())).unwrap();
        raw_tx.send(FileChange::Modified(template.clone())).unwrap();

        // Still inside the window of the second edit
        thread::sleep(Duration::from_millis(40));
        assert!(rx.try_recv().is_err());

        thread::sleep(Duration::from_millis(200));
        assert_eq!(rx.try_recv().unwrap(), FileChange::Created(other));
        assert_eq!(rx.try_recv().unwrap(), FileChange::Modified(template.clone()));
        assert!(rx.try_recv().is_err());

        // A later edit starts a new burst
        raw_tx.send(FileChange::Removed(template.clone())).unwrap();
        thread::sleep(Duration::from_millis(250));
        assert_eq!(rx.try_recv().unwrap(), FileChange::Removed(template));

        drop(raw_tx);
        worker.join().unwrap();
    }

    #[test]
    fn test_debounce_stops_when_receiver_dropped() {
        let (raw_tx, raw_rx) = std_mpsc::channel();
        let (tx, rx) = mpsc::channel(16);
        let worker = thread::spawn(move || debounce(raw_rx, tx, Duration::from_millis(10)));

        drop(rx);
        raw_tx
            .send(FileChange::Modified(PathBuf::from("/project/a.js")))
            .unwrap();
        worker.join().unwrap();
    }

    #[test]
    fn test_missing_root_is_rejected() {
        let err = FileWatcher::tree(&[PathBuf::from("/definitely/not/here")], vec![], 50)
            .unwrap_err();
        assert!(matches!(err, WatchError::MissingPath(_)));
    }

    #[test]
    fn test_file_watcher_on_missing_directory() {
        let err = FileWatcher::file(Path::new("/definitely/not/here/index.html"), 50).unwrap_err();
        assert!(matches!(err, WatchError::MissingPath(_)));
    }

    #[test]
    fn test_file_watcher_watches_parent_dir() {
        let temp = TempDir::new().unwrap();
        let template = temp.path().join("index.template.html");
        std::fs::write(&template, "<html></html>").unwrap();

        let (watcher, _rx) = FileWatcher::file(&template, 50).unwrap();
        assert_eq!(watcher.roots(), &[temp.path().canonicalize().unwrap()]);
    }

    #[test]
    fn test_file_change_path() {
        let path = PathBuf::from("/project/src/index.template.html");

        assert_eq!(FileChange::Modified(path.clone()).path(), path.as_path());
        assert_eq!(FileChange::Created(path.clone()).path(), path.as_path());
        assert_eq!(FileChange::Removed(path.clone()).path(), path.as_path());
    }
}
