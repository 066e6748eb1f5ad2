use crate::cli::ServeArgs;
use crate::config::*;
use crate::error::{ConfigError, Result};
use figment::{
    providers::{Env, Format as _, Json, Serialized},
    Figment,
};
use std::path::{Path, PathBuf};

/// Settings given on the command line, applied last.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    pub host: Option<String>,
}

impl From<&ServeArgs> for CliOverrides {
    fn from(args: &ServeArgs) -> Self {
        Self {
            port: args.port,
            host: args.host.clone(),
        }
    }
}

impl SsrDevConfig {
    /// Load configuration from multiple sources.
    /// Priority: CLI args > environment variables > config file > defaults
    pub fn load(config_path: Option<&Path>, overrides: &CliOverrides) -> Result<Self> {
        Self::figment(config_path, overrides)?
            .extract()
            .map_err(|e| ConfigError::Invalid(e.to_string()).into())
    }

    pub(crate) fn figment(config_path: Option<&Path>, overrides: &CliOverrides) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default_config()));

        if let Some(path) = Self::config_file(config_path)? {
            tracing::debug!("Loading configuration from {}", path.display());
            figment = figment.merge(Json::file(path));
        }

        // SSR_DEV_PORT, SSR_DEV_OUTPUT_DIR, SSR_DEV_CLIENT__PUBLIC_PATH, ...
        figment = figment.merge(
            Env::prefixed("SSR_DEV_")
                .split("__")
                .lowercase(false)
                .map(|key| camel_case_key(key.as_str()).into()),
        );

        if let Some(port) = overrides.port {
            figment = figment.merge(("port", port));
        }
        if let Some(host) = &overrides.host {
            figment = figment.merge(("host", host));
        }

        Ok(figment)
    }

    /// An explicit path must exist; the default file is optional.
    fn config_file(config_path: Option<&Path>) -> Result<Option<PathBuf>> {
        match config_path {
            Some(path) if path.is_file() => Ok(Some(path.to_path_buf())),
            Some(path) => Err(ConfigError::NotFound(path.to_path_buf()).into()),
            None => {
                let default_path = Path::new(Self::FILE_NAME);
                Ok(default_path.is_file().then(|| default_path.to_path_buf()))
            }
        }
    }

    /// Get default configuration values.
    pub fn default_config() -> Self {
        Self {
            template: default_template(),
            output_dir: default_output_dir(),
            artifacts: Default::default(),
            client: default_client_pipeline(),
            server: default_server_pipeline(),
            error: default_error_pipeline(),
            host: default_host(),
            port: default_port(),
            hmr_path: default_hmr_path(),
            heartbeat_ms: default_heartbeat_ms(),
            debounce_ms: default_debounce_ms(),
            ignore: default_ignore(),
            cwd: None,
        }
    }

    /// Directory every relative path is resolved against.
    pub fn working_dir(&self) -> Result<PathBuf> {
        let cwd = std::env::current_dir()?;
        Ok(match &self.cwd {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => cwd.join(dir),
            None => cwd,
        })
    }

    pub fn section(&self, kind: PipelineKind) -> &PipelineSection {
        match kind {
            PipelineKind::Client => &self.client,
            PipelineKind::Server => &self.server,
            PipelineKind::Error => &self.error,
        }
    }
}

/// `client.public_path` -> `client.publicPath`
pub(crate) fn camel_case_key(key: &str) -> String {
    key.to_ascii_lowercase()
        .split('.')
        .map(|segment| {
            let mut parts = segment.split('_').filter(|part| !part.is_empty());
            let mut out = parts.next().unwrap_or_default().to_string();
            for part in parts {
                let mut chars = part.chars();
                if let Some(first) = chars.next() {
                    out.push(first.to_ascii_uppercase());
                    out.push_str(chars.as_str());
                }
            }
            out
        })
        .collect::<Vec<_>>()
        .join(".")
}
