//! Miette diagnostic conversion for CLI errors.

use crate::error::CliError;
use miette::Report;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        CliError::DevServer(e) => dev_server_error_to_miette(e),
        _ => miette::miette!("{}", err),
    }
}

/// Convert a coordinator error to a miette Report with a hint where one helps.
pub fn dev_server_error_to_miette(err: ssr_dev::Error) -> Report {
    match err {
        ssr_dev::Error::TemplateRead { path, source } => miette::miette!(
            "Failed to read template {}: {}\n\nHint: Check the 'template' path in ssr-dev.config.json",
            path.display(),
            source
        ),
        ssr_dev::Error::Compiler(e) => miette::miette!(
            "Build pipeline failed: {}\n\nHint: Run the pipeline's command by hand to see its full output",
            e
        ),
        ssr_dev::Error::Aborted => miette::miette!(
            "{}\n\nHint: A build pipeline or the template watcher stopped early",
            err
        ),
        other => miette::miette!("{}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_template_error_carries_hint() {
        let err = CliError::DevServer(ssr_dev::Error::TemplateRead {
            path: PathBuf::from("index.html"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
        let report = cli_error_to_miette(err);
        let msg = format!("{}", report);
        assert!(msg.contains("index.html"));
        assert!(msg.contains("Hint:"));
    }

    #[test]
    fn test_generic_error_passes_through() {
        let report = cli_error_to_miette(CliError::Server("port in use".into()));
        assert_eq!(format!("{}", report), "Server error: port in use");
    }
}
