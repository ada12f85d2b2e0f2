//! Command line interface for kodegen_release_mirror.
//!
//! Parses inputs, runs the mirror and reports the outcome both on the terminal
//! and to the GitHub Actions runner.

mod args;
pub mod commands;
mod output;
mod retry_config;

pub use args::{Args, RuntimeConfig};
pub use commands::execute_command;
pub use output::OutputManager;
pub use retry_config::RetryConfig;

use crate::EnvConfig;
use crate::error::Result;

/// Main CLI entry point
pub async fn run(env: EnvConfig) -> Result<i32> {
    let args = Args::parse_args();
    execute_command(args, &env).await
}
