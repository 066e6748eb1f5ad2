//! Readiness coordinator for server-rendering dev builds.
//!
//! A server-rendered app in development is built by three watching
//! pipelines (client, server render bundle, error page bundle) plus an HTML
//! template on disk. None of them can be used on its own: the renderer needs
//! all of them at once. This crate waits until every artifact exists, tells
//! the host once, and then hands it a fresh [`ArtifactSnapshot`] after every
//! rebuild.
//!
//! ```no_run
//! use ssr_dev::{setup_dev_server, CommandCompiler, CommandSpec, DevServerOptions, PipelineConfig};
//! use std::sync::Arc;
//!
//! # async fn example() -> ssr_dev::Result<()> {
//! let build = |name: &str| {
//!     let spec = CommandSpec::new("npm", vec!["run".into(), format!("build:{name}")]);
//!     CommandCompiler::new(spec, PipelineConfig::new(name, format!("src/entry-{name}.js"), "dist"))
//! };
//!
//! let options = DevServerOptions::new(
//!     "src/index.template.html",
//!     Arc::new(build("client")),
//!     Arc::new(build("server")),
//!     Arc::new(build("error")),
//!     "dist",
//! );
//!
//! let server = setup_dev_server(options, |snapshot: ssr_dev::ArtifactSnapshot| {
//!     println!("renderer updated: {}", snapshot.context.template.len());
//! })
//! .await?;
//!
//! server.ready().wait().await?;
//! server.join().await
//! # }
//! ```

pub mod compiler;
pub mod coordinator;
pub mod error;
pub mod fs;
pub mod hot;
pub mod setup;
pub mod sources;
pub mod store;
pub mod watcher;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use compiler::{
    CommandCompiler, CommandSpec, CompileStats, Compiler, CycleResult, CycleStream,
    PipelineConfig, Plugin, HOT_CLIENT_ENTRY,
};
pub use coordinator::{
    ready_channel, run_coordinator, Coordinator, Dispatch, Phase, ReadyHandle, ReadySignal,
    UpdateHandler,
};
pub use error::{CompilerError, Error, Result, WatchError};
pub use fs::{ArtifactReader, DiskFileSystem, MemoryFileSystem, OutputFileSystem};
pub use hot::{hot_channel, HotEvent};
pub use setup::{
    setup_dev_server, ArtifactNames, DevServer, DevServerOptions, TemplateWatch,
    DEFAULT_TEMPLATE_DEBOUNCE_MS,
};
pub use store::{
    ArtifactSnapshot, ArtifactStore, Document, RenderBundles, RenderContext, Slot, SlotUpdate,
    SlotWriter, SlotWriters,
};
pub use watcher::{FileChange, FileWatcher};
