//! Configuration for the ssr-dev host with multi-source loading.
//!
//! Merges settings from CLI args, environment variables, and the config file.
//! Priority: CLI > Environment (`SSR_DEV_*`) > File (`ssr-dev.config.json`) > Defaults

mod conversions;
mod defaults;
mod loading;
mod tests;
mod types;
mod validation;

use serde::{Deserialize, Serialize};
use ssr_dev::ArtifactNames;
use std::path::PathBuf;

pub use conversions::Compilers;
pub use defaults::*;
pub use loading::CliOverrides;
pub use types::*;

/// ssr-dev configuration - loaded from ssr-dev.config.json, env and CLI args.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsrDevConfig {
    /// HTML page template
    #[serde(default = "default_template")]
    pub template: PathBuf,

    /// Directory the pipelines write to; artifacts are read from here
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Artifact file names inside the output directory
    #[serde(default)]
    pub artifacts: ArtifactNames,

    /// Client (browser) build pipeline
    #[serde(default = "default_client_pipeline")]
    pub client: PipelineSection,

    /// Server render bundle pipeline
    #[serde(default = "default_server_pipeline")]
    pub server: PipelineSection,

    /// Error page bundle pipeline
    #[serde(default = "default_error_pipeline")]
    pub error: PipelineSection,

    /// Address to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Route of the hot-update event stream
    #[serde(default = "default_hmr_path")]
    pub hmr_path: String,

    /// Keep-alive interval of the hot-update stream
    #[serde(default = "default_heartbeat_ms")]
    pub heartbeat_ms: u64,

    /// Debounce delay for file changes
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Patterns ignored by the source watchers
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,

    /// Working directory; defaults to the current directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
}

impl SsrDevConfig {
    /// Default config file name, looked up in the current directory.
    pub const FILE_NAME: &'static str = "ssr-dev.config.json";
}
