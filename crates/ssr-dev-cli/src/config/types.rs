use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Which of the three build pipelines a section configures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineKind {
    Client,
    Server,
    Error,
}

impl PipelineKind {
    pub const ALL: [PipelineKind; 3] = [PipelineKind::Client, PipelineKind::Server, PipelineKind::Error];

    pub fn as_str(self) -> &'static str {
        match self {
            PipelineKind::Client => "client",
            PipelineKind::Server => "server",
            PipelineKind::Error => "error",
        }
    }
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One build pipeline: the command that builds it and what it watches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSection {
    /// Build command, program first (e.g. `["npx", "webpack", "--config", "..."]`)
    #[serde(default)]
    pub command: Vec<String>,

    /// Entry points, passed to the command through `SSR_DEV_ENTRY`
    #[serde(default)]
    pub entry: Vec<String>,

    /// Source roots that trigger a rebuild
    #[serde(default = "crate::config::defaults::default_watch")]
    pub watch: Vec<PathBuf>,

    /// URL prefix the output is served under
    #[serde(default = "crate::config::defaults::default_public_path")]
    pub public_path: String,
}
