//! ssr-dev CLI - development host for server-rendered apps.
//!
//! Wraps the `ssr-dev` coordinator in a command-line tool: configuration
//! loading, logging, an HTTP host for client assets and hot updates, and
//! readable error reports.
//!
//! # Architecture
//!
//! - [`cli`] - Argument parsing with clap
//! - [`config`] - `ssr-dev.config.json`, `SSR_DEV_*` and CLI flag layering
//! - [`commands`] - `serve` and `check`
//! - [`host`] - axum routes for assets, hot-update events and status
//! - [`error`] - Error types with actionable hints
//! - [`logger`] - Structured logging with tracing
//! - [`ui`] - Terminal status messages
//!
//! # Example
//!
//! ```rust
//! use ssr_dev_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     // CLI command implementations...
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod host;
pub mod logger;
pub mod ui;

pub use error::{CliError, ConfigError, Result};
