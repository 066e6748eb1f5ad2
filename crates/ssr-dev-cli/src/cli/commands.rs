use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Available ssr-dev subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the dev host
    ///
    /// Starts all three build pipelines in watch mode, serves client assets
    /// from memory and pushes build events to connected browsers.
    Serve(ServeArgs),

    /// Validate configuration
    ///
    /// Checks ssr-dev.config.json, the template path, pipeline commands and
    /// watch roots without running any build.
    Check(CheckArgs),
}

/// Arguments for the serve command
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Path to ssr-dev.config.json
    ///
    /// If not provided, ssr-dev.config.json in the current directory is used
    /// when present.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Host address to bind
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,
}

/// Arguments for the check command
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Path to ssr-dev.config.json
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}
