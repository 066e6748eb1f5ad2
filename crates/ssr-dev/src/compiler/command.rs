//! Compiler backed by an external build command.
//!
//! Each cycle runs the configured command once with the pipeline described in
//! its environment (`SSR_DEV_*`). A non-zero exit status is a compile error.
//!
//! Every pipeline writes into its own staging directory,
//! `<cwd>/.ssr-dev/<pipeline>`, passed as `SSR_DEV_OUTPUT_DIR`. On success the
//! staged files are loaded into an in-memory file system under the logical
//! `output_dir`, which is what the dev server reads from. Pipelines sharing an
//! `output_dir` therefore never see each other's files.

use super::{CompileStats, Compiler, CycleStream, PipelineConfig};
use crate::error::CompilerError;
use crate::fs::{MemoryFileSystem, OutputFileSystem};
use crate::watcher::FileWatcher;
use async_trait::async_trait;
use path_clean::PathClean;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Instant;
use tokio::process::Command;
use tokio::sync::mpsc;
use walkdir::WalkDir;

/// How to invoke a build command and what to watch for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandSpec {
    /// Program to run
    pub program: String,

    #[serde(default)]
    pub args: Vec<String>,

    /// Working directory (defaults to the current directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,

    /// Directories whose changes trigger a rebuild (defaults to `cwd`)
    #[serde(default)]
    pub watch: Vec<PathBuf>,

    /// Ignore patterns applied to watched paths
    #[serde(default)]
    pub ignore: Vec<String>,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            cwd: None,
            watch: Vec::new(),
            ignore: Vec::new(),
            debounce_ms: default_debounce_ms(),
        }
    }

    /// Set the working directory.
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    fn working_dir(&self) -> PathBuf {
        self.cwd.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

fn default_debounce_ms() -> u64 {
    100
}

/// Directory under the working directory holding per-pipeline build output.
pub const STAGING_DIR: &str = ".ssr-dev";

/// [`Compiler`] running an external command per cycle.
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    spec: CommandSpec,
    pipeline: PipelineConfig,
    output: Arc<MemoryFileSystem>,
}

impl CommandCompiler {
    pub fn new(spec: CommandSpec, pipeline: PipelineConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                spec,
                pipeline,
                output: Arc::new(MemoryFileSystem::new()),
            }),
        }
    }

    pub fn pipeline(&self) -> &PipelineConfig {
        &self.inner.pipeline
    }

    pub fn spec(&self) -> &CommandSpec {
        &self.inner.spec
    }

    /// In-memory output, keyed under the pipeline's `output_dir`.
    pub fn memory_fs(&self) -> Arc<MemoryFileSystem> {
        Arc::clone(&self.inner.output)
    }
}

impl Inner {
    fn name(&self) -> &str {
        &self.pipeline.name
    }

    /// Where the build command writes this pipeline's output.
    fn staging_dir(&self) -> PathBuf {
        self.spec
            .working_dir()
            .join(STAGING_DIR)
            .join(&self.pipeline.name)
    }

    fn watch_roots(&self) -> Vec<PathBuf> {
        let cwd = self.spec.working_dir();
        if self.spec.watch.is_empty() {
            return vec![cwd];
        }
        self.spec
            .watch
            .iter()
            .map(|root| {
                if root.is_absolute() {
                    root.clone()
                } else {
                    cwd.join(root)
                }
            })
            .collect()
    }

    /// Ignore patterns, plus the staging directory so writes don't retrigger builds.
    fn ignore_patterns(&self) -> Vec<String> {
        let mut patterns = self.spec.ignore.clone();
        if !patterns.iter().any(|pattern| pattern == STAGING_DIR) {
            patterns.push(STAGING_DIR.to_string());
        }
        patterns
    }

    /// Empty the staging directory so each cycle starts from a clean slate.
    async fn reset_staging(&self) -> Result<PathBuf, CompilerError> {
        let dir = self.staging_dir();
        let io_error = |source: io::Error| CompilerError::Io {
            pipeline: self.name().to_string(),
            source,
        };

        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(io_error(e)),
        }
        tokio::fs::create_dir_all(&dir).await.map_err(io_error)?;
        Ok(dir)
    }

    async fn compile(&self) -> Result<CompileStats, CompilerError> {
        let start = Instant::now();
        tracing::debug!(
            pipeline = self.name(),
            "Running {} {}",
            self.spec.program,
            self.spec.args.join(" ")
        );

        let staging = self.reset_staging().await?;
        let output = Command::new(&self.spec.program)
            .args(&self.spec.args)
            .current_dir(self.spec.working_dir())
            .envs(self.pipeline.env(&staging))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| CompilerError::Spawn {
                pipeline: self.name().to_string(),
                source,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        let warnings = collect_warnings(&stderr);

        let errors = if output.status.success() {
            let loaded = self.load_output().await?;
            tracing::debug!(pipeline = self.name(), "Loaded {} output files", loaded);
            Vec::new()
        } else {
            vec![failure_message(&stderr, output.status)]
        };

        Ok(CompileStats {
            errors,
            warnings,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Replace the in-memory output with the staged files.
    ///
    /// Files an earlier cycle produced but this one did not are removed.
    async fn load_output(&self) -> Result<usize, CompilerError> {
        let staging = self.staging_dir();
        let files = tokio::task::spawn_blocking(move || read_tree(&staging))
            .await
            .map_err(|e| CompilerError::Other(format!("Task join error: {}", e)))?
            .map_err(|source| CompilerError::Io {
                pipeline: self.name().to_string(),
                source,
            })?;

        let loaded: Vec<(PathBuf, Vec<u8>)> = files
            .into_iter()
            .map(|(relative, contents)| (self.pipeline.output_dir.join(relative), contents))
            .collect();

        let fresh: FxHashSet<PathBuf> = loaded.iter().map(|(path, _)| path.clean()).collect();
        for stale in self.output.paths() {
            if !fresh.contains(&stale) {
                self.output.remove(&stale);
            }
        }

        let count = loaded.len();
        for (path, contents) in loaded {
            self.output.insert(path, contents);
        }
        Ok(count)
    }
}

#[async_trait]
impl Compiler for CommandCompiler {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn run(&self) -> Result<CompileStats, CompilerError> {
        self.inner.compile().await
    }

    async fn watch(&self) -> Result<CycleStream, CompilerError> {
        let (watcher, mut changes) = FileWatcher::tree(
            &self.inner.watch_roots(),
            self.inner.ignore_patterns(),
            self.inner.spec.debounce_ms,
        )
        .map_err(|source| CompilerError::Watch {
            pipeline: self.name().to_string(),
            source,
        })?;

        let (tx, rx) = mpsc::channel(16);
        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            let _watcher = watcher;

            if tx.send(inner.compile().await).await.is_err() {
                return;
            }

            while let Some(change) = changes.recv().await {
                tracing::debug!(
                    pipeline = inner.name(),
                    "Rebuilding after change to {}",
                    change.path().display()
                );

                // One rebuild covers every change queued so far
                while changes.try_recv().is_ok() {}

                if tx.send(inner.compile().await).await.is_err() {
                    break;
                }
            }
        });

        Ok(rx)
    }

    fn output_fs(&self) -> Arc<dyn OutputFileSystem> {
        self.inner.output.clone()
    }
}

/// Read every file under `dir` as (relative path, contents).
fn read_tree(dir: &Path) -> io::Result<Vec<(PathBuf, Vec<u8>)>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(dir)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
            .to_path_buf();
        files.push((relative, std::fs::read(entry.path())?));
    }
    Ok(files)
}

/// Stderr lines that start with "warning", in any case.
fn collect_warnings(stderr: &str) -> Vec<String> {
    stderr
        .lines()
        .map(str::trim)
        .filter(|line| line.to_ascii_lowercase().starts_with("warning"))
        .map(str::to_string)
        .collect()
}

fn failure_message(stderr: &str, status: ExitStatus) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("Build command exited with {}", status)
    } else {
        stderr.to_string()
    }
}
