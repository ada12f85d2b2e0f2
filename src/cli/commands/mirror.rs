//! Mirror command implementation.

use crate::actions::{self, StepOutputs};
use crate::cli::{Args, RuntimeConfig};
use crate::config::{EnvConfig, MirrorConfig};
use crate::error::{MirrorError, Result};
use crate::github::{GitHubClient, GitHubClientConfig};
use crate::mirror::{AssetOutcome, MirrorOutcome, mirror_release};
use std::sync::Arc;

/// Execute the mirror: resolve inputs, copy the release, write the `time` output
pub(super) async fn execute_mirror(
    args: &Args,
    env: &EnvConfig,
    config: &RuntimeConfig,
) -> Result<i32> {
    let mirror_config = MirrorConfig::resolve(args, env)?;

    config.section("Release mirror");
    config.println(&format!(
        "🏷  {} → {}",
        mirror_config.source_release(),
        mirror_config.destination_release()
    ));

    log::debug!("Event name: {:?}", mirror_config.event.name);
    if let Some(payload) = actions::load_event_payload(&mirror_config.event) {
        log::debug!(
            "The event payload: {}",
            serde_json::to_string_pretty(&payload)?
        );
    }

    let mut client_config = GitHubClientConfig::new(mirror_config.token.clone());
    client_config.api_url = mirror_config.api_url.clone();
    client_config.retry = mirror_config.retry.clone();
    let client = GitHubClient::new(client_config)?;

    let report = match mirror_release(Arc::new(client), &mirror_config).await? {
        MirrorOutcome::Skipped { tag, reason } => {
            config.warning_println(&format!(
                "Release {} is a {}; nothing to mirror",
                tag, reason
            ));
            return Ok(0);
        }
        MirrorOutcome::Mirrored(report) => report,
    };

    if report.created {
        config.success_println(&format!(
            "Created release {} in {}",
            report.tag, mirror_config.destination
        ));
    } else {
        config.println(&format!(
            "Using existing release {} in {}",
            report.tag, mirror_config.destination
        ));
    }

    for asset in &report.assets {
        match &asset.outcome {
            AssetOutcome::Copied { uploaded } => {
                config.indent(&format!("✓ Copied: {} ({} bytes)", uploaded.name, uploaded.size));
            }
            AssetOutcome::AlreadyPresent => {
                config.indent(&format!("✓ Skipping {} (already uploaded)", asset.source.name));
            }
            failed => {
                let reason = failed.failure().unwrap_or_default();
                config.error_println(&format!("{}: {}", asset.source.name, reason));
                actions::set_failed(&reason);
            }
        }
    }

    StepOutputs::new(mirror_config.output_file.clone()).set("time", &report.completion_time())?;

    let failed = report.failed();
    if failed > 0 {
        return Err(MirrorError::AssetTransfer { failed });
    }

    config.success_println(&format!(
        "Mirrored {} ({} copied, {} already present)",
        report.tag,
        report.copied(),
        report.already_present()
    ));
    Ok(0)
}
