//! Pipeline configuration handed to a build command.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Entry prepended to the client pipeline to connect it to the hot-update endpoint.
pub const HOT_CLIENT_ENTRY: &str = "ssr-dev/hot-client";

/// Plugins the dev server may ask a pipeline to enable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Plugin {
    /// Hot module replacement runtime
    HotModuleReplacement,
    /// Skip emitting output when a cycle has errors
    NoEmitOnErrors,
    /// Any tool-specific plugin, passed through by name
    Other(String),
}

impl Plugin {
    pub fn name(&self) -> &str {
        match self {
            Plugin::HotModuleReplacement => "hot-module-replacement",
            Plugin::NoEmitOnErrors => "no-emit-on-errors",
            Plugin::Other(name) => name,
        }
    }
}

/// What a build pipeline compiles and where it writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Pipeline name ("client", "server", "error")
    pub name: String,

    /// Entry points
    pub entry: Vec<String>,

    /// Output directory
    pub output_dir: PathBuf,

    /// URL prefix the output is served under
    #[serde(default = "default_public_path")]
    pub public_path: String,

    /// Output filename pattern
    #[serde(default = "default_output_filename")]
    pub output_filename: String,

    #[serde(default)]
    pub plugins: Vec<Plugin>,
}

impl PipelineConfig {
    pub fn new(name: impl Into<String>, entry: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            entry: vec![entry.into()],
            output_dir: output_dir.into(),
            public_path: default_public_path(),
            output_filename: default_output_filename(),
            plugins: Vec::new(),
        }
    }

    /// Reconfigure a client pipeline for hot reloading.
    ///
    /// Prepends the hot client entry, switches to fixed (non-hashed) output
    /// names and enables hot replacement and no-emit-on-errors. Applying it
    /// twice has no further effect.
    pub fn into_hot_reload(mut self, hot_path: &str) -> Self {
        if !self
            .entry
            .first()
            .is_some_and(|entry| entry.starts_with(HOT_CLIENT_ENTRY))
        {
            self.entry
                .insert(0, format!("{}?path={}", HOT_CLIENT_ENTRY, hot_path));
        }

        self.output_filename = "[name].js".to_string();

        for plugin in [Plugin::HotModuleReplacement, Plugin::NoEmitOnErrors] {
            if !self.plugins.contains(&plugin) {
                self.plugins.push(plugin);
            }
        }

        self
    }

    pub fn is_hot(&self) -> bool {
        self.plugins.contains(&Plugin::HotModuleReplacement)
    }

    /// Environment variables describing this pipeline to a build command
    /// that writes its output to `disk_dir`.
    pub fn env(&self, disk_dir: &Path) -> Vec<(&'static str, String)> {
        vec![
            ("SSR_DEV_PIPELINE", self.name.clone()),
            ("SSR_DEV_ENTRY", self.entry.join("\n")),
            ("SSR_DEV_OUTPUT_DIR", disk_dir.to_string_lossy().into_owned()),
            ("SSR_DEV_OUTPUT_FILENAME", self.output_filename.clone()),
            ("SSR_DEV_PUBLIC_PATH", self.public_path.clone()),
            (
                "SSR_DEV_PLUGINS",
                self.plugins
                    .iter()
                    .map(Plugin::name)
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            ("SSR_DEV_HOT", (if self.is_hot() { "1" } else { "0" }).to_string()),
        ]
    }
}

fn default_public_path() -> String {
    "/dist/".to_string()
}

fn default_output_filename() -> String {
    "[name].[chunkhash].js".to_string()
}
