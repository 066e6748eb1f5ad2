//! Watch sources: independent producers of slot values.
//!
//! Each source runs as its own task and owns the [`SlotWriter`] for exactly
//! one slot:
//!
//! - [`TemplateSource`] re-reads the page template on file changes
//! - [`ClientSource`] reads the client manifest after each client build
//! - [`BundleSource`] reads the server or error bundle after each build
//!
//! Compile errors never stop a source: the cycle is logged and discarded,
//! and the slot keeps its last good value.
//!
//! [`SlotWriter`]: crate::store::SlotWriter

mod bundle;
mod client;
mod template;

pub use bundle::BundleSource;
pub use client::ClientSource;
pub use template::{read_template, TemplateSource};

use crate::compiler::CompileStats;

/// Log every diagnostic of a cycle, tagged with its pipeline.
pub(crate) fn log_diagnostics(pipeline: &str, stats: &CompileStats) {
    for error in &stats.errors {
        tracing::error!(pipeline, "{}", error);
    }
    for warning in &stats.warnings {
        tracing::warn!(pipeline, "{}", warning);
    }
}
