//! Kodegen Release Mirror - copy a published GitHub release into another repository.

use kodegen_release_mirror::cli::OutputManager;
use kodegen_release_mirror::{EnvConfig, actions, cli};
use std::process;

#[tokio::main]
async fn main() {
    let env = EnvConfig::from_process();

    // RUNNER_DEBUG is set when a workflow is re-run with debug logging enabled
    let default_filter = if env.get("RUNNER_DEBUG").as_deref() == Some("1") {
        "debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli::run(env).await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            // Never quiet for fatal errors
            let output = OutputManager::new(false);
            output.error(&format!("Fatal error: {e}"));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                let _ = output.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    let _ = output.indent(&suggestion);
                }
            }

            actions::set_failed(&e.to_string());
            process::exit(1);
        }
    }
}
