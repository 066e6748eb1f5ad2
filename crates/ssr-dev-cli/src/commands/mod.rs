//! Command implementations for the ssr-dev CLI.
//!
//! - [`serve`] - Run the pipelines and the dev host
//! - [`check`] - Configuration validation
//!
//! Each command provides an `execute` function that takes the parsed
//! command arguments and returns a Result.

pub mod check;
pub mod serve;

pub use check::execute as check_execute;
pub use serve::execute as serve_execute;
