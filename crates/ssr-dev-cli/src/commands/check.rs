//! Check command implementation.
//!
//! Validates configuration and paths without running any build.

use crate::cli::CheckArgs;
use crate::config::{CliOverrides, PipelineKind, SsrDevConfig};
use crate::error::Result;
use crate::ui;
use std::path::Path;

/// Execute the check command.
///
/// # Validation Steps
///
/// 1. Load ssr-dev.config.json, environment and defaults
/// 2. Check pipeline commands, entries and routes
/// 3. Check the template and every watch root exist
///
/// # Errors
///
/// Returns errors for invalid configuration or missing files.
pub async fn execute(args: CheckArgs) -> Result<()> {
    ui::info("Checking configuration...");

    if args.config.is_none() && !Path::new(SsrDevConfig::FILE_NAME).is_file() {
        ui::warning(&format!("No {} found, using defaults", SsrDevConfig::FILE_NAME));
    }

    let config = SsrDevConfig::load(args.config.as_deref(), &CliOverrides::default())?;
    config.validate()?;
    ui::success("Configuration is valid");

    let cwd = config.working_dir()?;
    config.verify_paths(&cwd)?;
    ui::success(&format!("Template found: {}", config.template.display()));

    for kind in PipelineKind::ALL {
        let section = config.section(kind);
        ui::success(&format!(
            "  {}: {} (watching {})",
            kind,
            section.command.join(" "),
            section
                .watch
                .iter()
                .map(|root| root.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    ui::success("All checks passed!");
    Ok(())
}
