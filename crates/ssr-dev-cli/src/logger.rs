//! Logging setup for the ssr-dev CLI.
//!
//! Structured logging through `tracing`. Library and CLI events share one
//! subscriber, so pipeline diagnostics, template reloads and host events all
//! show up in the same stream.
//!
//! - `--verbose` enables debug output for the ssr-dev crates
//! - `--quiet` only shows errors
//! - otherwise `RUST_LOG` is honored, falling back to info level

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERBOSE_FILTER: &str = "ssr_dev=debug,ssr_dev_cli=debug";
const QUIET_FILTER: &str = "ssr_dev=error,ssr_dev_cli=error";
const DEFAULT_FILTER: &str = "ssr_dev=info,ssr_dev_cli=info";

/// Initialize the tracing subscriber with the specified options.
///
/// Call once, before any logging occurs.
///
/// # Arguments
///
/// * `verbose` - Enable debug-level logging (overrides `quiet`)
/// * `quiet` - Only show error-level logs
/// * `no_color` - Disable colored output
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && should_use_colors())
        .compact();

    tracing_subscriber::registry()
        .with(build_filter(verbose, quiet))
        .with(fmt_layer)
        .init();
}

fn build_filter(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Check if colored output should be enabled.
///
/// `NO_COLOR` disables colors, `FORCE_COLOR` forces them even without a TTY.
pub fn should_use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }

    console::Term::stderr().features().colors_supported()
}
