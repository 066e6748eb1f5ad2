//! Build pipeline abstraction.
//!
//! A [`Compiler`] is a black box that turns sources into output files. The
//! dev server only needs three things from it: a one-shot build, a watch mode
//! that reports every cycle, and access to the file system it writes to.

mod command;
mod config;

pub use command::{CommandCompiler, CommandSpec};
pub use config::{PipelineConfig, Plugin, HOT_CLIENT_ENTRY};

use crate::error::CompilerError;
use crate::fs::OutputFileSystem;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Diagnostics reported by one compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileStats {
    /// Compile errors; a non-empty list means the output must be discarded
    pub errors: Vec<String>,
    /// Warnings, which never block the output
    pub warnings: Vec<String>,
    /// Wall-clock duration of the cycle
    pub duration_ms: u64,
}

impl CompileStats {
    /// Successful cycle with no diagnostics.
    pub fn clean(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            ..Self::default()
        }
    }

    /// Failed cycle with the given errors.
    pub fn failed(errors: Vec<String>) -> Self {
        Self {
            errors,
            ..Self::default()
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Outcome of one watch cycle: diagnostics, or a tooling failure.
pub type CycleResult = Result<CompileStats, CompilerError>;

/// Stream of watch cycles; closes when the compiler stops watching.
pub type CycleStream = mpsc::Receiver<CycleResult>;

/// Black-box build pipeline.
#[async_trait]
pub trait Compiler: Send + Sync + std::fmt::Debug {
    /// Pipeline name used in logs ("client", "server", "error")
    fn name(&self) -> &str;

    /// Compile once and report diagnostics
    async fn run(&self) -> Result<CompileStats, CompilerError>;

    /// Start watching and report every completed cycle.
    ///
    /// An `Err` here means watching could not start at all.
    async fn watch(&self) -> Result<CycleStream, CompilerError>;

    /// File system the compiler writes its output to
    fn output_fs(&self) -> Arc<dyn OutputFileSystem>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_constructors() {
        assert!(!CompileStats::clean(12).has_errors());
        assert_eq!(CompileStats::clean(12).duration_ms, 12);
        assert!(CompileStats::failed(vec!["Module not found".into()]).has_errors());
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let value = serde_json::to_value(CompileStats::clean(5)).unwrap();
        assert_eq!(value["durationMs"], 5);
        assert!(value["errors"].as_array().unwrap().is_empty());
    }
}
