//! Error types for the readiness coordinator and its watch sources.
//!
//! Only setup-time and tooling failures are represented here. Compile
//! diagnostics reported by a build cycle are not errors: they are logged and
//! the cycle is discarded (see [`crate::sources`]).

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`Error`] as the default error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level error type for the dev server coordinator.
#[derive(Debug, Error)]
pub enum Error {
    /// The page template could not be read (startup or after a change)
    #[error("Failed to read template {}: {source}", .path.display())]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file watcher could not be established
    #[error("File watcher error: {0}")]
    Watch(#[from] WatchError),

    /// A build pipeline failed to start watching or failed mid-watch
    #[error("Compiler error: {0}")]
    Compiler(#[from] CompilerError),

    /// The coordinator stopped before every artifact became available
    #[error("Dev server stopped before all build artifacts were ready")]
    Aborted,

    /// A background task panicked or was cancelled
    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

/// Errors raised while establishing or running a file watcher.
#[derive(Debug, Error)]
pub enum WatchError {
    /// A path that should be watched does not exist
    #[error("Watch path not found: {}", .0.display())]
    MissingPath(PathBuf),

    /// Underlying notify failure
    #[error(transparent)]
    Notify(#[from] notify::Error),

    /// The debounce thread could not be started
    #[error("Failed to start watch thread: {0}")]
    Thread(#[source] std::io::Error),

    /// Path could not be resolved to an absolute location
    #[error("Failed to resolve watch path {}: {source}", .path.display())]
    Resolve {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Tooling-level failures of a build pipeline.
///
/// These differ from compile diagnostics: a `CompilerError` means the
/// pipeline itself is broken, and it aborts the dev server.
#[derive(Debug, Error)]
pub enum CompilerError {
    /// The build command could not be started
    #[error("Failed to spawn build command for '{pipeline}': {source}")]
    Spawn {
        pipeline: String,
        #[source]
        source: std::io::Error,
    },

    /// The pipeline's watcher could not be established
    #[error("Failed to watch sources for '{pipeline}': {source}")]
    Watch {
        pipeline: String,
        #[source]
        source: WatchError,
    },

    /// Reading the build output failed
    #[error("I/O error in '{pipeline}': {source}")]
    Io {
        pipeline: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic failure with a custom message
    #[error("{0}")]
    Other(String),
}
