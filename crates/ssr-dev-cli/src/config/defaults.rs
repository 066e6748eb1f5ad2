use crate::config::PipelineSection;
use std::path::PathBuf;

pub fn default_template() -> PathBuf {
    PathBuf::from("src/index.template.html")
}

pub fn default_output_dir() -> PathBuf {
    PathBuf::from("dist")
}

pub fn default_host() -> String {
    "127.0.0.1".to_string()
}

pub fn default_port() -> u16 {
    8080
}

pub fn default_hmr_path() -> String {
    "/__ssr_dev_hmr".to_string()
}

pub fn default_heartbeat_ms() -> u64 {
    5000
}

pub fn default_debounce_ms() -> u64 {
    100
}

pub fn default_ignore() -> Vec<String> {
    ["node_modules", ".git", "dist", "*.log"]
        .into_iter()
        .map(String::from)
        .collect()
}

pub fn default_watch() -> Vec<PathBuf> {
    vec![PathBuf::from("src")]
}

pub fn default_public_path() -> String {
    "/dist/".to_string()
}

fn pipeline(entry: &str) -> PipelineSection {
    PipelineSection {
        command: Vec::new(),
        entry: vec![entry.to_string()],
        watch: default_watch(),
        public_path: default_public_path(),
    }
}

pub fn default_client_pipeline() -> PipelineSection {
    pipeline("src/entry-client.js")
}

pub fn default_server_pipeline() -> PipelineSection {
    pipeline("src/entry-server.js")
}

pub fn default_error_pipeline() -> PipelineSection {
    pipeline("src/entry-error.js")
}
