use crate::config::{PipelineKind, SsrDevConfig};
use crate::error::ConfigError;
use std::path::{Path, PathBuf};

impl SsrDevConfig {
    /// Structural checks that need no file system access.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for kind in PipelineKind::ALL {
            let section = self.section(kind);

            if section.command.first().is_none_or(|program| program.trim().is_empty()) {
                return Err(ConfigError::MissingField {
                    field: format!("{kind}.command"),
                    hint: format!(
                        "Set the command that builds the {kind} bundle, e.g. [\"npx\", \"webpack\", \"--config\", \"build/webpack.{kind}.config.js\"]"
                    ),
                });
            }

            if section.entry.is_empty() {
                return Err(ConfigError::MissingField {
                    field: format!("{kind}.entry"),
                    hint: format!("Add at least one entry point for the {kind} pipeline"),
                });
            }

            if !is_url_prefix(&section.public_path) {
                return Err(ConfigError::InvalidValue {
                    field: format!("{kind}.publicPath"),
                    value: section.public_path.clone(),
                    hint: "Public paths must start and end with '/', e.g. \"/dist/\"".to_string(),
                });
            }
        }

        if !self.hmr_path.starts_with('/') || self.hmr_path.len() < 2 {
            return Err(ConfigError::InvalidValue {
                field: "hmrPath".to_string(),
                value: self.hmr_path.clone(),
                hint: "Use an absolute route such as \"/__ssr_dev_hmr\"".to_string(),
            });
        }

        // Exact routes win over the catch-all of a root publicPath
        if self.client.public_path != "/"
            && self.hmr_path.starts_with(&self.client.public_path)
        {
            return Err(ConfigError::InvalidValue {
                field: "hmrPath".to_string(),
                value: self.hmr_path.clone(),
                hint: format!(
                    "The hot-update route must not live under the client publicPath ({})",
                    self.client.public_path
                ),
            });
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "port".to_string(),
                value: "0".to_string(),
                hint: "Choose a port between 1 and 65535".to_string(),
            });
        }

        if self.heartbeat_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "heartbeatMs".to_string(),
                value: "0".to_string(),
                hint: "The heartbeat interval must be at least 1ms".to_string(),
            });
        }

        if self.host.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "host".to_string(),
                hint: "Use \"127.0.0.1\" to listen locally".to_string(),
            });
        }

        Ok(())
    }

    /// Check that the template and every watch root exist under `cwd`.
    pub fn verify_paths(&self, cwd: &Path) -> Result<(), ConfigError> {
        let template = resolve(cwd, &self.template);
        if !template.is_file() {
            return Err(ConfigError::PathNotFound {
                field: "template".to_string(),
                path: template,
            });
        }

        for kind in PipelineKind::ALL {
            for root in &self.section(kind).watch {
                let root = resolve(cwd, root);
                if !root.exists() {
                    return Err(ConfigError::PathNotFound {
                        field: format!("{kind}.watch"),
                        path: root,
                    });
                }
            }
        }

        Ok(())
    }
}

pub(crate) fn resolve(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

fn is_url_prefix(path: &str) -> bool {
    path.starts_with('/') && path.ends_with('/')
}
