//! Scripted compiler for driving watch sources deterministically in tests.

use crate::compiler::{CompileStats, Compiler, CycleResult, CycleStream};
use crate::error::CompilerError;
use crate::fs::{MemoryFileSystem, OutputFileSystem};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Compiler whose watch cycles are pushed by a [`CompilerScript`].
#[derive(Debug)]
pub struct ScriptedCompiler {
    name: String,
    fs: Arc<MemoryFileSystem>,
    cycles: Mutex<Option<CycleStream>>,
    watch_error: Option<String>,
}

impl ScriptedCompiler {
    /// Create a compiler and the script that feeds it.
    ///
    /// Output files land in `output_dir` of the compiler's memory fs.
    pub fn new(name: &str, output_dir: impl Into<PathBuf>) -> (Arc<Self>, CompilerScript) {
        let fs = Arc::new(MemoryFileSystem::new());
        let (tx, rx) = mpsc::channel(16);
        let compiler = Arc::new(Self {
            name: name.to_string(),
            fs: Arc::clone(&fs),
            cycles: Mutex::new(Some(rx)),
            watch_error: None,
        });
        let script = CompilerScript {
            tx,
            fs,
            output_dir: output_dir.into(),
        };
        (compiler, script)
    }

    /// A compiler that cannot start watching.
    pub fn failing_watch(name: &str, message: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            fs: Arc::new(MemoryFileSystem::new()),
            cycles: Mutex::new(None),
            watch_error: Some(message.to_string()),
        })
    }

    pub fn memory_fs(&self) -> Arc<MemoryFileSystem> {
        Arc::clone(&self.fs)
    }
}

#[async_trait]
impl Compiler for ScriptedCompiler {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self) -> Result<CompileStats, CompilerError> {
        Ok(CompileStats::clean(0))
    }

    async fn watch(&self) -> Result<CycleStream, CompilerError> {
        if let Some(message) = &self.watch_error {
            return Err(CompilerError::Other(message.clone()));
        }
        self.cycles
            .lock()
            .take()
            .ok_or_else(|| CompilerError::Other(format!("{} is already watching", self.name)))
    }

    fn output_fs(&self) -> Arc<dyn OutputFileSystem> {
        self.fs.clone()
    }
}

/// Pushes build cycles into a [`ScriptedCompiler`].
#[derive(Debug, Clone)]
pub struct CompilerScript {
    tx: mpsc::Sender<CycleResult>,
    fs: Arc<MemoryFileSystem>,
    output_dir: PathBuf,
}

impl CompilerScript {
    /// Emit `file` and report a clean cycle.
    pub async fn succeed(&self, file: &str, contents: &str) {
        self.fs.insert(self.output_dir.join(file), contents);
        self.send(Ok(CompileStats::clean(1))).await;
    }

    /// Report a clean cycle without emitting anything.
    pub async fn succeed_without_output(&self) {
        self.send(Ok(CompileStats::clean(1))).await;
    }

    /// Report a cycle with compile errors.
    pub async fn fail(&self, errors: &[&str]) {
        let errors = errors.iter().map(|e| e.to_string()).collect();
        self.send(Ok(CompileStats::failed(errors))).await;
    }

    /// Emit `file` anyway, then report compile errors.
    pub async fn fail_with_output(&self, file: &str, contents: &str, errors: &[&str]) {
        self.fs.insert(self.output_dir.join(file), contents);
        self.fail(errors).await;
    }

    /// Report a clean cycle that carries warnings.
    pub async fn warn(&self, file: &str, contents: &str, warnings: &[&str]) {
        self.fs.insert(self.output_dir.join(file), contents);
        let stats = CompileStats {
            warnings: warnings.iter().map(|w| w.to_string()).collect(),
            ..CompileStats::clean(1)
        };
        self.send(Ok(stats)).await;
    }

    /// Report that the pipeline itself broke.
    pub async fn tooling_failure(&self, message: &str) {
        self.send(Err(CompilerError::Other(message.to_string()))).await;
    }

    async fn send(&self, cycle: CycleResult) {
        // The source may already be gone in teardown paths
        let _ = self.tx.send(cycle).await;
    }
}
