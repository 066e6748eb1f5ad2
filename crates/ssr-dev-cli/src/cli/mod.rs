//! Command-line interface definition for ssr-dev.
//!
//! - `ssr-dev serve` - run the three watching pipelines and the dev host
//! - `ssr-dev check` - validate configuration without building

mod commands;
mod tests;

use clap::Parser;

pub use commands::{CheckArgs, Command, ServeArgs};

/// ssr-dev - development host for server-rendered apps
#[derive(Parser, Debug)]
#[command(
    name = "ssr-dev",
    version,
    about = "Development host for server-rendered apps",
    long_about = "ssr-dev runs the client, server and error-page build pipelines in watch mode,\n\
                  waits until every render artifact exists, and keeps the renderer inputs\n\
                  fresh as files change. Browsers get build events over Server-Sent Events."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
