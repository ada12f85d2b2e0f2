//! Command execution.
//!
//! Runs the mirror and turns its outcome into terminal output and an exit
//! code. Failures propagate to `main`, which reports them to the runner.

mod mirror;

use crate::EnvConfig;
use crate::cli::{Args, RuntimeConfig};
use crate::error::{CliError, Result};

use mirror::execute_mirror;

/// Execute the mirror based on parsed arguments
pub async fn execute_command(args: Args, env: &EnvConfig) -> Result<i32> {
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;

    let config = RuntimeConfig::from(&args);
    execute_mirror(&args, env, &config).await
}
